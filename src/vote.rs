//! Time-windowed majority-vote smoothing.
//!
//! Per-frame predictions are noisy; a label only becomes output once it
//! dominates the votes collected over the trailing window. The buffer is
//! the sole owner of its entries, and both `accept` and `tally` take the
//! current instant as a parameter, so tests drive it with fabricated time.

use crate::classify::Prediction;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One accepted classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEntry {
    pub label: String,
    pub at: Instant,
}

/// Result of polling the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Tally {
    /// No votes inside the window. Downstream must clear the displayed
    /// gesture rather than holding the last label.
    Empty,
    /// The label with the most votes in the window.
    Majority {
        label: String,
        votes: usize,
        total: usize,
        /// `votes / total`, the label's share of the surviving window.
        confidence: f32,
    },
}

/// Sliding window of accepted predictions.
pub struct VoteBuffer {
    window: Duration,
    threshold: f32,
    entries: VecDeque<VoteEntry>,
}

impl VoteBuffer {
    /// Creates a buffer with the given window and confidence threshold.
    pub fn new(window: Duration, threshold: f32) -> Self {
        Self {
            window,
            threshold,
            entries: VecDeque::new(),
        }
    }

    /// Records a vote for the prediction's label if its confidence exceeds
    /// the threshold. Returns whether the vote was accepted.
    pub fn accept(&mut self, prediction: &Prediction, now: Instant) -> bool {
        if prediction.confidence <= self.threshold {
            return false;
        }
        self.entries.push_back(VoteEntry {
            label: prediction.label.clone(),
            at: now,
        });
        true
    }

    /// Prunes votes older than the window, then reports the majority label.
    ///
    /// A vote whose timestamp is at or before `now - window` no longer
    /// supports any label. Ties between equal counts go to the label seen
    /// first among the surviving votes.
    pub fn tally(&mut self, now: Instant) -> Tally {
        if let Some(cutoff) = now.checked_sub(self.window) {
            while let Some(front) = self.entries.front() {
                if front.at <= cutoff {
                    self.entries.pop_front();
                } else {
                    break;
                }
            }
        }

        let total = self.entries.len();
        if total == 0 {
            return Tally::Empty;
        }

        let mut counts: Vec<(&str, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.iter_mut().find(|(label, _)| *label == entry.label) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.label.as_str(), 1)),
            }
        }

        let mut best_label = "";
        let mut max_votes = 0;
        for &(label, count) in &counts {
            if count > max_votes {
                max_votes = count;
                best_label = label;
            }
        }

        Tally::Majority {
            label: best_label.to_string(),
            votes: max_votes,
            total,
            confidence: max_votes as f32 / total as f32,
        }
    }

    /// Number of votes currently held (including ones an upcoming tally
    /// would prune).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no votes are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all votes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    fn buffer() -> VoteBuffer {
        VoteBuffer::new(WINDOW, 0.6)
    }

    fn prediction(label: &str, confidence: f32) -> Prediction {
        Prediction {
            label: label.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_accept_rejects_at_or_below_threshold() {
        let mut buffer = buffer();
        let now = Instant::now();

        assert!(!buffer.accept(&prediction("wave", 0.5), now));
        assert!(!buffer.accept(&prediction("wave", 0.6), now));
        assert!(buffer.accept(&prediction("wave", 0.61), now));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_tally_empty_buffer() {
        let mut buffer = buffer();
        assert_eq!(buffer.tally(Instant::now()), Tally::Empty);
    }

    #[test]
    fn test_tally_single_label() {
        let mut buffer = buffer();
        let base = Instant::now();

        buffer.accept(&prediction("hello", 1.0), base);
        buffer.accept(&prediction("hello", 1.0), base + Duration::from_millis(100));

        match buffer.tally(base + Duration::from_millis(200)) {
            Tally::Majority {
                label,
                votes,
                total,
                confidence,
            } => {
                assert_eq!(label, "hello");
                assert_eq!(votes, 2);
                assert_eq!(total, 2);
                assert_eq!(confidence, 1.0);
            }
            Tally::Empty => panic!("Expected majority"),
        }
    }

    #[test]
    fn test_tally_majority_share() {
        // 8 "hello" and 4 "bye" inside the window
        let mut buffer = buffer();
        let base = Instant::now();

        for i in 0..8 {
            buffer.accept(&prediction("hello", 1.0), base + Duration::from_millis(i * 10));
        }
        for i in 0..4 {
            buffer.accept(&prediction("bye", 1.0), base + Duration::from_millis(500 + i * 10));
        }

        match buffer.tally(base + Duration::from_millis(600)) {
            Tally::Majority {
                label,
                votes,
                total,
                confidence,
            } => {
                assert_eq!(label, "hello");
                assert_eq!(votes, 8);
                assert_eq!(total, 12);
                assert!((confidence - 0.667).abs() < 1e-3);
            }
            Tally::Empty => panic!("Expected majority"),
        }
    }

    #[test]
    fn test_tally_prunes_votes_older_than_window() {
        let mut buffer = buffer();
        let base = Instant::now();

        buffer.accept(&prediction("old", 1.0), base);
        buffer.accept(&prediction("new", 1.0), base + Duration::from_millis(900));

        // At base + 1100ms, the vote at base is 1100ms old and must not count
        match buffer.tally(base + Duration::from_millis(1100)) {
            Tally::Majority { label, total, .. } => {
                assert_eq!(label, "new");
                assert_eq!(total, 1);
            }
            Tally::Empty => panic!("Expected majority"),
        }
    }

    #[test]
    fn test_vote_exactly_window_old_is_pruned() {
        let mut buffer = buffer();
        let base = Instant::now();

        buffer.accept(&prediction("edge", 1.0), base);

        // at == now - window: excluded
        assert_eq!(buffer.tally(base + WINDOW), Tally::Empty);
    }

    #[test]
    fn test_vote_just_inside_window_survives() {
        let mut buffer = buffer();
        let base = Instant::now();

        buffer.accept(&prediction("edge", 1.0), base + Duration::from_millis(1));

        match buffer.tally(base + WINDOW) {
            Tally::Majority { label, .. } => assert_eq!(label, "edge"),
            Tally::Empty => panic!("Expected majority"),
        }
    }

    #[test]
    fn test_all_votes_expiring_reports_empty_not_stale() {
        let mut buffer = buffer();
        let base = Instant::now();

        for i in 0..5 {
            buffer.accept(&prediction("hello", 1.0), base + Duration::from_millis(i * 10));
        }

        // First tally sees the votes
        assert!(matches!(
            buffer.tally(base + Duration::from_millis(100)),
            Tally::Majority { .. }
        ));

        // Two seconds later every vote has aged out
        assert_eq!(buffer.tally(base + Duration::from_secs(2)), Tally::Empty);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_tie_goes_to_first_seen_label() {
        let mut buffer = buffer();
        let base = Instant::now();

        buffer.accept(&prediction("first", 1.0), base);
        buffer.accept(&prediction("second", 1.0), base + Duration::from_millis(10));
        buffer.accept(&prediction("second", 1.0), base + Duration::from_millis(20));
        buffer.accept(&prediction("first", 1.0), base + Duration::from_millis(30));

        match buffer.tally(base + Duration::from_millis(40)) {
            Tally::Majority { label, votes, .. } => {
                assert_eq!(label, "first");
                assert_eq!(votes, 2);
            }
            Tally::Empty => panic!("Expected majority"),
        }
    }

    #[test]
    fn test_clear_drops_votes() {
        let mut buffer = buffer();
        let now = Instant::now();

        buffer.accept(&prediction("hello", 1.0), now);
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.tally(now), Tally::Empty);
    }
}
