//! Speech synthesis boundary.

use crate::defaults;
use crate::error::{Result, SignshError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One installed synthesizer voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47 language tag, e.g. "en-US".
    pub lang: String,
}

impl Voice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

/// A fully specified speech request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 language tag the text is in.
    pub lang: String,
    /// Preferred voice; the synthesizer falls back to its default if absent.
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    /// Creates an utterance with the default rate, pitch and volume.
    pub fn new(text: &str, lang: &str) -> Self {
        Self {
            text: text.to_string(),
            lang: lang.to_string(),
            voice: None,
            rate: defaults::SPEECH_RATE,
            pitch: defaults::SPEECH_PITCH,
            volume: defaults::SPEECH_VOLUME,
        }
    }

    /// Sets the preferred voice.
    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Sets the speaking rate.
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

/// Trait for text-to-speech engines.
///
/// This trait allows swapping implementations (platform engine vs mock).
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Lists installed voices. May be empty shortly after startup while the
    /// engine enumerates its catalog.
    async fn voices(&self) -> Vec<Voice>;

    /// Cancels any in-flight utterance.
    async fn cancel(&self);

    /// Speaks the utterance, returning once it finishes or fails.
    async fn speak(&self, utterance: Utterance) -> Result<()>;

    /// Name of the engine for log messages.
    fn name(&self) -> &str;
}

/// Picks a voice for the language code.
///
/// Preference order: exact tag match, then any voice in the same language
/// family (prefix before the '-'), then the first voice. `None` only when
/// the catalog is empty.
pub fn select_voice(voices: &[Voice], lang_code: &str) -> Option<Voice> {
    if let Some(exact) = voices.iter().find(|v| v.lang == lang_code) {
        return Some(exact.clone());
    }

    let family = lang_code.split('-').next().unwrap_or(lang_code);
    if let Some(family_match) = voices.iter().find(|v| v.lang.starts_with(family)) {
        return Some(family_match.clone());
    }

    voices.first().cloned()
}

/// Fetches the catalog and selects a voice, waiting briefly and retrying
/// once if the catalog has not populated yet.
pub async fn resolve_voice<S: SpeechSynthesizer + ?Sized>(
    synth: &S,
    lang_code: &str,
) -> Option<Voice> {
    let mut voices = synth.voices().await;
    if voices.is_empty() {
        tokio::time::sleep(defaults::VOICE_CATALOG_WAIT).await;
        voices = synth.voices().await;
    }
    select_voice(&voices, lang_code)
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Mock speech synthesizer for testing.
///
/// Records spoken utterances and cancel calls. Clones share state so a
/// test can keep a handle while the pipeline owns the synthesizer.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    voices: Arc<Mutex<Vec<Voice>>>,
    spoken: Arc<Mutex<Vec<Utterance>>>,
    cancels: Arc<AtomicUsize>,
    catalog_delayed: Arc<AtomicBool>,
    latency: Option<Duration>,
    should_fail: bool,
    error_message: String,
}

impl MockSynthesizer {
    /// Creates a mock with a single English voice.
    pub fn new() -> Self {
        Self {
            voices: Arc::new(Mutex::new(vec![Voice::new("Mock English", "en-US")])),
            spoken: Arc::new(Mutex::new(Vec::new())),
            cancels: Arc::new(AtomicUsize::new(0)),
            catalog_delayed: Arc::new(AtomicBool::new(false)),
            latency: None,
            should_fail: false,
            error_message: "mock synthesis error".to_string(),
        }
    }

    /// Configures the installed voices.
    pub fn with_voices(self, voices: Vec<Voice>) -> Self {
        *lock_or_recover(&self.voices) = voices;
        self
    }

    /// Configures the first `voices()` call to return an empty catalog,
    /// simulating an engine that is still enumerating.
    pub fn with_delayed_catalog(self) -> Self {
        self.catalog_delayed.store(true, Ordering::SeqCst);
        self
    }

    /// Configures each utterance to take the given time to play.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Configures the mock to fail on speak.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configures the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Utterances spoken so far.
    pub fn spoken(&self) -> Vec<Utterance> {
        lock_or_recover(&self.spoken).clone()
    }

    /// Texts spoken so far, in order.
    pub fn spoken_texts(&self) -> Vec<String> {
        lock_or_recover(&self.spoken)
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }

    /// Number of cancel calls.
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn voices(&self) -> Vec<Voice> {
        if self.catalog_delayed.swap(false, Ordering::SeqCst) {
            return Vec::new();
        }
        lock_or_recover(&self.voices).clone()
    }

    async fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    async fn speak(&self, utterance: Utterance) -> Result<()> {
        if self.should_fail {
            return Err(SignshError::Speech {
                message: self.error_message.clone(),
            });
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        lock_or_recover(&self.spoken).push(utterance);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
