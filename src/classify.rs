//! k-nearest-neighbor gesture classification.
//!
//! A linear scan over every stored example per query. At the intended data
//! sizes (hundreds of examples) this beats maintaining an index, and the
//! call happens at most once per frame interval.

use crate::store::GestureDataset;

/// A classification result: the winning label and its share of the k votes.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Fraction of the k nearest neighbors that carry the winning label.
    /// Always a multiple of 1/k.
    pub confidence: f32,
}

/// Euclidean distance between two feature vectors.
///
/// Comparison truncates to the shorter operand so vectors recorded before
/// fixed-shape assembly still produce a distance instead of an error. For
/// equal-length inputs this is the ordinary Euclidean metric: symmetric,
/// non-negative and zero on identical vectors.
pub fn distance(a: &[f32], b: &[f32]) -> f32 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum();
    sum.sqrt() as f32
}

/// Classifies a feature vector against the dataset by majority vote among
/// the `k` nearest examples.
///
/// Returns `None` iff the dataset holds no examples (or `k` is zero). Ties
/// between labels with equal votes go to the label encountered first in
/// ascending distance order. Confidence is `votes / k` even when the
/// dataset holds fewer than `k` examples, so sparse datasets read as
/// low-confidence rather than certain.
pub fn classify(query: &[f32], dataset: &GestureDataset, k: usize) -> Option<Prediction> {
    if k == 0 {
        return None;
    }

    let mut distances: Vec<(&str, f32)> = Vec::with_capacity(dataset.total_examples());
    for (label, examples) in dataset.iter() {
        for example in examples {
            distances.push((label.as_str(), distance(query, example)));
        }
    }

    if distances.is_empty() {
        return None;
    }

    distances.sort_by(|a, b| a.1.total_cmp(&b.1));

    // Tally in first-encountered order so ties resolve toward the nearer label
    let mut votes: Vec<(&str, usize)> = Vec::new();
    for &(label, _) in distances.iter().take(k) {
        match votes.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => votes.push((label, 1)),
        }
    }

    let mut best_label = "";
    let mut max_votes = 0;
    for &(label, count) in &votes {
        if count > max_votes {
            max_votes = count;
            best_label = label;
        }
    }

    Some(Prediction {
        label: best_label.to_string(),
        confidence: max_votes as f32 / k as f32,
    })
}
