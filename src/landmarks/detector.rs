use crate::error::{Result, SignshError};
use crate::landmarks::types::Detection;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Trait for per-frame landmark detection.
///
/// This trait allows swapping implementations (live detector vs replay vs mock).
/// Calls may suspend for arbitrary time; the driving loop awaits each frame
/// and never issues a second `detect` before the previous one resolves.
#[async_trait::async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Initialize the detector. Failure here is fatal to the session.
    async fn start(&mut self) -> Result<()>;

    /// Produce the next frame's detections.
    ///
    /// # Arguments
    /// * `elapsed` - Time since the session started, for sources that seek
    ///
    /// # Returns
    /// `Ok(Some(detection))` for a frame (possibly with empty hands),
    /// `Ok(None)` once a finite source is exhausted, or an error for a
    /// transient detection failure.
    async fn detect(&mut self, elapsed: Duration) -> Result<Option<Detection>>;

    /// Release the underlying source.
    async fn stop(&mut self) -> Result<()>;

    /// Name of the detector for log messages.
    fn name(&self) -> &str;
}

/// Mock landmark detector for testing.
///
/// Serves a scripted sequence of frames, then reports exhaustion. Clones
/// share the frame queue and counters, so a test can keep a handle while
/// the pipeline owns the detector.
#[derive(Debug, Clone)]
pub struct MockDetector {
    frames: Arc<Mutex<VecDeque<Detection>>>,
    detect_calls: Arc<AtomicUsize>,
    started: Arc<AtomicBool>,
    fail_at: Arc<Mutex<Vec<usize>>>,
    should_fail_start: bool,
    should_fail_detect: bool,
    error_message: String,
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockDetector {
    /// Create a new mock detector with no frames.
    pub fn new() -> Self {
        Self {
            frames: Arc::new(Mutex::new(VecDeque::new())),
            detect_calls: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicBool::new(false)),
            fail_at: Arc::new(Mutex::new(Vec::new())),
            should_fail_start: false,
            should_fail_detect: false,
            error_message: "mock detection error".to_string(),
        }
    }

    /// Configure the mock to serve the given frames in order.
    pub fn with_frames(self, frames: Vec<Detection>) -> Self {
        *lock_or_recover(&self.frames) = frames.into();
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail the detect call with the given index
    /// (0-based, counted across all calls) instead of serving a frame.
    pub fn with_error_at(self, call_index: usize) -> Self {
        lock_or_recover(&self.fail_at).push(call_index);
        self
    }

    /// Configure the mock to fail every detect call.
    pub fn with_detect_failure(mut self) -> Self {
        self.should_fail_detect = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Number of detect calls made so far.
    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    /// Check if the detector has been started.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LandmarkDetector for MockDetector {
    async fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(SignshError::DetectorInit {
                message: self.error_message.clone(),
            });
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn detect(&mut self, _elapsed: Duration) -> Result<Option<Detection>> {
        let call = self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_detect || lock_or_recover(&self.fail_at).contains(&call) {
            return Err(SignshError::Detection {
                message: self.error_message.clone(),
            });
        }
        Ok(lock_or_recover(&self.frames).pop_front())
    }

    async fn stop(&mut self) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Landmark detector that replays recorded frames from a JSONL file.
///
/// Each line holds one serialized [`Detection`]. The file is read fully at
/// `start()`; malformed lines fail initialization with the offending line
/// number. Pacing is the driving loop's job, so `detect` returns the next
/// frame immediately.
pub struct ReplayDetector {
    path: PathBuf,
    frames: VecDeque<Detection>,
}

impl ReplayDetector {
    /// Create a replay detector for the given JSONL recording.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frames: VecDeque::new(),
        }
    }

    /// Number of frames not yet served.
    pub fn frames_remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn start(&mut self) -> Result<()> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| SignshError::DetectorInit {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                })?;

        let mut frames = VecDeque::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let detection: Detection =
                serde_json::from_str(line).map_err(|e| SignshError::DetectorInit {
                    message: format!(
                        "invalid frame at {}:{}: {}",
                        self.path.display(),
                        idx + 1,
                        e
                    ),
                })?;
            frames.push_back(detection);
        }

        self.frames = frames;
        Ok(())
    }

    async fn detect(&mut self, _elapsed: Duration) -> Result<Option<Detection>> {
        Ok(self.frames.pop_front())
    }

    async fn stop(&mut self) -> Result<()> {
        self.frames.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "replay"
    }
}
