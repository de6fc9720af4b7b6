//! Speech debouncing state machine.
//!
//! Gates when a stabilized label becomes a spoken utterance. Two states:
//! Idle and Speaking. The Speaking flag lives behind an `Arc` so the task
//! that plays the utterance can release it on completion or error without
//! holding a reference to the debouncer itself.

use crate::clock::{Clock, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Current state of the speech gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakState {
    /// No utterance in flight.
    Idle,
    /// An utterance is playing; new labels are dropped.
    Speaking,
}

/// Outcome of offering a label to the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferResult {
    /// Speak this label now. The debouncer has recorded it and entered
    /// Speaking; the caller must finish the matching [`UtteranceGuard`].
    Accepted,
    /// Dropped: an utterance is already in flight. Labels are not queued.
    Busy,
    /// Dropped: identical text was spoken within the refractory period.
    Refractory,
    /// Dropped: blank label.
    Empty,
}

/// Handle that returns the debouncer to Idle.
///
/// Passed into the utterance task; `finish` must be called on both the
/// completion and the error path.
#[derive(Debug, Clone)]
pub struct UtteranceGuard {
    speaking: Arc<AtomicBool>,
}

impl UtteranceGuard {
    /// Marks the utterance as done, returning the debouncer to Idle.
    pub fn finish(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }
}

/// Debounced speech gate, generic over the clock for deterministic tests.
pub struct SpeechDebouncer<C: Clock = SystemClock> {
    refractory: Duration,
    speaking: Arc<AtomicBool>,
    last_spoken_text: String,
    last_spoken_at: Option<Instant>,
    clock: C,
}

impl<C: Clock> SpeechDebouncer<C> {
    /// Creates a debouncer with the given refractory period and clock.
    pub fn with_clock(refractory: Duration, clock: C) -> Self {
        Self {
            refractory,
            speaking: Arc::new(AtomicBool::new(false)),
            last_spoken_text: String::new(),
            last_spoken_at: None,
            clock,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SpeakState {
        if self.speaking.load(Ordering::SeqCst) {
            SpeakState::Speaking
        } else {
            SpeakState::Idle
        }
    }

    /// Offers a stabilized label to the gate.
    ///
    /// On acceptance the debouncer records the label and enters Speaking
    /// immediately, before any translation or synthesis begins, so a second
    /// offer arriving mid-utterance is dropped rather than queued.
    pub fn offer(&mut self, label: &str) -> OfferResult {
        if label.is_empty() {
            return OfferResult::Empty;
        }

        match self.state() {
            SpeakState::Speaking => OfferResult::Busy,
            SpeakState::Idle => {
                let now = self.clock.now();
                let repeat = self.last_spoken_text == label
                    && self
                        .last_spoken_at
                        .is_some_and(|at| now.duration_since(at) < self.refractory);
                if repeat {
                    return OfferResult::Refractory;
                }

                self.last_spoken_text = label.to_string();
                self.last_spoken_at = Some(now);
                self.speaking.store(true, Ordering::SeqCst);
                OfferResult::Accepted
            }
        }
    }

    /// Guard for the utterance started by the most recent acceptance.
    pub fn utterance_guard(&self) -> UtteranceGuard {
        UtteranceGuard {
            speaking: self.speaking.clone(),
        }
    }

    /// Forgets the last spoken text.
    ///
    /// Driven by an empty vote window: after a gap with no gesture, the
    /// same label may be spoken again without waiting out the refractory
    /// period.
    pub fn clear_last(&mut self) {
        self.last_spoken_text.clear();
        self.last_spoken_at = None;
    }

    /// Returns to Idle and forgets the last spoken text.
    pub fn reset(&mut self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.clear_last();
    }

    /// The text most recently accepted for speech.
    pub fn last_spoken_text(&self) -> &str {
        &self.last_spoken_text
    }
}

impl SpeechDebouncer<SystemClock> {
    /// Creates a debouncer with the given refractory period using the
    /// system clock.
    pub fn new(refractory: Duration) -> Self {
        Self::with_clock(refractory, SystemClock)
    }
}
