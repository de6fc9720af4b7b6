//! Pipeline orchestrator that drives a gesture session.
//!
//! The orchestrator owns the session lifecycle: it starts the detector,
//! runs one cooperative loop that samples frames, classifies them, smooths
//! votes and emits speech, and winds everything down at the end. Both time
//! gates (frame sampling and vote tallying) read the injected [`Clock`] at
//! loop entry, so tests can drive the loop with simulated time.
//!
//! Only the utterance itself runs as a spawned task; translation and the
//! transcript append happen inline. The loop never waits for an utterance
//! to finish, except once at session end so the last words are not cut off.

use crate::classify::classify;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::features;
use crate::landmarks::{Detection, LandmarkDetector};
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::reporter::{ErrorReporter, LogReporter};
use crate::speech::debounce::{OfferResult, SpeechDebouncer};
use crate::speech::languages;
use crate::speech::synth::{SpeechSynthesizer, Utterance, resolve_voice};
use crate::speech::translate::Translator;
use crate::store::GestureDataset;
use crate::transcript::TranscriptLedger;
use crate::vote::{Tally, VoteBuffer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long the loop sleeps when neither gate is due.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Consecutive detector failures tolerated before the loop gives up.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Configuration for the gesture pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Minimum time between classified frames.
    pub frame_interval: Duration,
    /// Width of the vote window, and the cadence it is tallied at.
    pub window: Duration,
    /// Per-frame confidence a prediction must exceed to earn a vote.
    pub confidence_threshold: f32,
    /// Neighbors consulted by the classifier.
    pub k_neighbors: usize,
    /// Time the same text is suppressed after being spoken.
    pub refractory: Duration,
    /// Speaking rate handed to the synthesizer.
    pub speech_rate: f32,
    /// Target language code ("en" leaves labels untranslated). Shared so
    /// the language can be switched while the session runs.
    pub target_language: Arc<RwLock<String>>,
    /// Observers receive pipeline events here; emission never blocks.
    pub event_tx: Option<crossbeam_channel::Sender<PipelineEvent>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(defaults::FRAME_INTERVAL_MS),
            window: Duration::from_millis(defaults::WINDOW_DURATION_MS),
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            k_neighbors: defaults::K_NEIGHBORS,
            refractory: Duration::from_millis(defaults::SPEAK_REFRACTORY_MS),
            speech_rate: defaults::SPEECH_RATE,
            target_language: Arc::new(RwLock::new(defaults::DEFAULT_LANGUAGE.to_string())),
            event_tx: None,
        }
    }
}

impl PipelineOptions {
    /// Builds options from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            frame_interval: config.pipeline.frame_interval(),
            window: config.pipeline.window(),
            confidence_threshold: config.pipeline.confidence_threshold,
            k_neighbors: config.pipeline.k_neighbors,
            refractory: config.speech.refractory(),
            speech_rate: config.speech.rate,
            target_language: Arc::new(RwLock::new(config.speech.target_language.clone())),
            event_tx: None,
        }
    }
}

/// Gesture pipeline, configured but not yet started.
pub struct Pipeline {
    options: PipelineOptions,
    error_reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Creates a pipeline with the given options, reporting errors to
    /// stderr and reading the system clock.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            error_reporter: Arc::new(LogReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Replaces the clock. Tests use this to drive the gates manually.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the session and returns a handle to it.
    ///
    /// Detector initialization is the only fatal failure; everything after
    /// this point degrades and is reported instead.
    pub async fn start(
        self,
        mut detector: Box<dyn LandmarkDetector>,
        dataset: GestureDataset,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Result<PipelineHandle> {
        detector.start().await?;

        let running = Arc::new(AtomicBool::new(true));
        let ledger = Arc::new(Mutex::new(TranscriptLedger::new()));

        let session = Session {
            votes: VoteBuffer::new(self.options.window, self.options.confidence_threshold),
            debouncer: SpeechDebouncer::with_clock(self.options.refractory, self.clock.clone()),
            utterance: None,
            options: self.options,
            reporter: self.error_reporter,
            clock: self.clock,
            dataset,
            translator,
            synthesizer: synthesizer.clone(),
            ledger: ledger.clone(),
        };

        let task = tokio::spawn(run_loop(detector, session, running.clone()));

        Ok(PipelineHandle {
            running,
            task,
            ledger,
            synthesizer,
        })
    }
}

/// Handle to a running pipeline session.
pub struct PipelineHandle {
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
    ledger: Arc<Mutex<TranscriptLedger>>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl PipelineHandle {
    /// Check if the session is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared transcript ledger. Lock it to inspect or edit entries while
    /// the session runs.
    pub fn ledger(&self) -> Arc<Mutex<TranscriptLedger>> {
        self.ledger.clone()
    }

    /// Stops the session: interrupts any in-flight utterance, waits for
    /// the loop to exit, and returns the final transcript if anything was
    /// spoken.
    pub async fn stop(self) -> Option<String> {
        self.running.store(false, Ordering::SeqCst);
        self.synthesizer.cancel().await;
        self.wait().await
    }

    /// Waits for the loop to end on its own (a finite source running dry)
    /// and returns the final transcript if anything was spoken.
    pub async fn join(self) -> Option<String> {
        self.wait().await
    }

    async fn wait(self) -> Option<String> {
        if let Err(e) = self.task.await {
            eprintln!("Pipeline task failed: {}", e);
        }
        let transcript = self.ledger.lock().await.render();
        if transcript.is_empty() {
            None
        } else {
            Some(transcript)
        }
    }
}

/// Everything the loop mutates apart from the detector.
struct Session {
    options: PipelineOptions,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    dataset: GestureDataset,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    ledger: Arc<Mutex<TranscriptLedger>>,
    votes: VoteBuffer,
    debouncer: SpeechDebouncer<Arc<dyn Clock>>,
    utterance: Option<JoinHandle<()>>,
}

impl Session {
    /// Classifies one frame and records the vote.
    fn record_frame(&mut self, detection: &Detection, now: Instant) {
        if !detection.has_hands() || self.dataset.is_empty() {
            return;
        }
        let features = features::assemble(detection);
        if let Some(prediction) = classify(&features, &self.dataset, self.options.k_neighbors) {
            self.votes.accept(&prediction, now);
        }
    }

    /// Tallies the window and emits the outcome.
    async fn run_tally(&mut self, now: Instant) {
        match self.votes.tally(now) {
            Tally::Empty => {
                // A gap with no gesture: clear the display and let the same
                // label be spoken again without waiting out the refractory.
                self.debouncer.clear_last();
                emit(&self.options.event_tx, PipelineEvent::Cleared);
            }
            Tally::Majority {
                label, confidence, ..
            } => {
                emit(
                    &self.options.event_tx,
                    PipelineEvent::Gesture {
                        label: label.clone(),
                        confidence,
                    },
                );
                if self.debouncer.offer(&label) == OfferResult::Accepted {
                    self.speak(&label).await;
                }
            }
        }
    }

    /// Translates the label if needed, appends it to the transcript, and
    /// dispatches the utterance. A translation failure falls back to the
    /// untranslated label.
    async fn speak(&mut self, label: &str) {
        let target = current_language(&self.options.target_language);
        let text = if target == "en" {
            label.to_string()
        } else {
            match self.translator.translate(label, &target).await {
                Ok(translated) if !translated.trim().is_empty() => translated,
                Ok(_) => label.to_string(),
                Err(e) => {
                    self.reporter.report("translator", &e);
                    label.to_string()
                }
            }
        };

        self.ledger.lock().await.append(&text);

        // A new utterance preempts the previous one.
        self.synthesizer.cancel().await;
        if let Some(task) = self.utterance.take() {
            let _ = task.await;
        }

        let lang_tag = languages::bcp47(&target).to_string();
        let mut utterance = Utterance::new(&text, &lang_tag).with_rate(self.options.speech_rate);
        if let Some(voice) = resolve_voice(self.synthesizer.as_ref(), &lang_tag).await {
            utterance = utterance.with_voice(voice);
        }

        let guard = self.debouncer.utterance_guard();
        let synthesizer = self.synthesizer.clone();
        let reporter = self.reporter.clone();
        self.utterance = Some(tokio::spawn(async move {
            if let Err(e) = synthesizer.speak(utterance).await {
                reporter.report("synthesizer", &e);
            }
            guard.finish();
        }));

        emit(
            &self.options.event_tx,
            PipelineEvent::Spoken { text, lang: target },
        );
    }

    /// Lets the final utterance play out, then announces the end.
    async fn finish(mut self) {
        if let Some(task) = self.utterance.take() {
            let _ = task.await;
        }
        let transcript = self.ledger.lock().await.render();
        emit(&self.options.event_tx, PipelineEvent::Stopped { transcript });
    }
}

async fn run_loop(
    mut detector: Box<dyn LandmarkDetector>,
    mut session: Session,
    running: Arc<AtomicBool>,
) {
    let clock = session.clock.clone();
    let started = clock.now();
    let mut last_frame: Option<Instant> = None;
    let mut last_tally = started;
    let mut consecutive_errors: u32 = 0;
    let mut drain_pending = false;

    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let now = clock.now();

        let frame_due = match last_frame {
            Some(at) => now.duration_since(at) >= session.options.frame_interval,
            None => true,
        };

        if frame_due {
            last_frame = Some(now);
            match detector.detect(now.duration_since(started)).await {
                Ok(Some(detection)) => {
                    consecutive_errors = 0;
                    session.record_frame(&detection, now);
                }
                Ok(None) => {
                    // Finite source exhausted: tally what is left, then
                    // wind down.
                    drain_pending = true;
                    break;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    session.reporter.report("detector", &e);
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        eprintln!("Too many consecutive detector errors, stopping pipeline");
                        break;
                    }
                }
            }
        }

        if now.duration_since(last_tally) >= session.options.window {
            last_tally = now;
            session.run_tally(now).await;
        }

        if !frame_due {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    if drain_pending && !session.votes.is_empty() {
        session.run_tally(clock.now()).await;
    }

    if let Err(e) = detector.stop().await {
        session.reporter.report("detector", &e);
    }

    running.store(false, Ordering::SeqCst);
    session.finish().await;
}

fn emit(event_tx: &Option<crossbeam_channel::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = event_tx {
        let _ = tx.try_send(event);
    }
}

fn current_language(language: &RwLock<String>) -> String {
    match language.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
