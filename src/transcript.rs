//! Transcript ledger for spoken emissions.
//!
//! Every accepted utterance is appended here so the session can be reviewed,
//! edited, and exported as text. Entries carry stable ids so deletes and
//! reorders refer to a specific emission rather than a position.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::grammar::GrammarCorrector;

/// One spoken emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Stable id, "{unix-millis}-{sequence}".
    pub id: String,
    /// The text as spoken (post-translation).
    pub text: String,
}

/// Ordered, editable record of everything spoken this session.
#[derive(Debug, Default)]
pub struct TranscriptLedger {
    entries: Vec<TranscriptEntry>,
    next_seq: u64,
}

impl TranscriptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Text of the most recent entry, if any.
    pub fn last_text(&self) -> Option<&str> {
        self.entries.last().map(|e| e.text.as_str())
    }

    /// Append an emission.
    ///
    /// Blank text and text identical to the most recent entry are dropped so
    /// a held gesture does not flood the transcript. Returns the new entry
    /// when one was added.
    pub fn append(&mut self, text: &str) -> Option<&TranscriptEntry> {
        if text.trim().is_empty() {
            return None;
        }
        if self.last_text() == Some(text) {
            return None;
        }

        let id = self.make_id();
        self.entries.push(TranscriptEntry {
            id,
            text: text.to_string(),
        });
        self.entries.last()
    }

    /// Remove the entry with `id`. Returns false if no such entry exists.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Move the entry with `id` directly before the entry with `before_id`.
    ///
    /// Does nothing when either id is missing or they are the same entry.
    /// Returns whether a move happened.
    pub fn move_before(&mut self, id: &str, before_id: &str) -> bool {
        if id == before_id {
            return false;
        }
        let Some(from) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if !self.entries.iter().any(|e| e.id == before_id) {
            return false;
        }

        let entry = self.entries.remove(from);
        // Recompute after removal; the target may have shifted left.
        let to = self
            .entries
            .iter()
            .position(|e| e.id == before_id)
            .unwrap_or(self.entries.len());
        self.entries.insert(to, entry);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Join all entries into a single line of text.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the transcript, running it through a grammar corrector.
    ///
    /// Correction is best-effort: when the corrector fails the raw render is
    /// returned instead so an export never comes back empty-handed.
    pub async fn export_with(&self, corrector: &dyn GrammarCorrector, lang: &str) -> String {
        let raw = self.render();
        if raw.is_empty() {
            return raw;
        }
        match corrector.correct(&raw, lang).await {
            Ok(corrected) => corrected,
            Err(e) => {
                eprintln!("Grammar correction failed, exporting raw text: {e}");
                raw
            }
        }
    }

    fn make_id(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let seq = self.next_seq;
        self.next_seq += 1;
        format!("{millis}-{seq}")
    }
}

/// Dated filename for a transcript export, e.g. "transcript-2026-08-23.txt".
pub fn export_filename(at: SystemTime) -> String {
    let stamp = humantime::format_rfc3339(at).to_string();
    // RFC 3339 is ASCII; the first ten characters are the date.
    format!("transcript-{}.txt", &stamp[..10])
}
