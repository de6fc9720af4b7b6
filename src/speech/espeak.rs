//! Speech synthesis via the espeak-ng command line tool.

use crate::error::{Result, SignshError};
use crate::speech::languages;
use crate::speech::synth::{SpeechSynthesizer, Utterance, Voice};
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// espeak-ng's default speaking rate in words per minute. The utterance
/// rate is a multiplier on top of this.
const BASE_WPM: f32 = 175.0;

/// Synthesizer backed by the `espeak-ng` binary.
///
/// Each utterance runs one espeak-ng process to completion. The pipeline
/// serializes speak calls; a concurrent speak would race the cancel target.
pub struct EspeakSynthesizer {
    program: String,
    current_pid: Arc<AtomicU32>,
}

impl EspeakSynthesizer {
    pub fn new() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            current_pid: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Overrides the binary name (for tests).
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the espeak-ng argument list for an utterance.
///
/// espeak-ng voice names are language families ("en", "de"); region
/// subtags are not portable across installs, so only the family is passed.
fn build_args(utterance: &Utterance) -> Vec<String> {
    let lang = utterance
        .voice
        .as_ref()
        .map(|v| v.lang.as_str())
        .unwrap_or(&utterance.lang);
    let family = lang.split('-').next().unwrap_or(lang).to_lowercase();

    let wpm = (BASE_WPM * utterance.rate).round().clamp(80.0, 450.0) as u32;
    let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
    let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;

    vec![
        "-v".to_string(),
        family,
        "-s".to_string(),
        wpm.to_string(),
        "-p".to_string(),
        pitch.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
        "--".to_string(),
        utterance.text.clone(),
    ]
}

#[async_trait::async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn voices(&self) -> Vec<Voice> {
        // espeak-ng ships a voice for every language we can translate into,
        // so the catalog is derived from the language table instead of
        // parsing `espeak-ng --voices` output.
        languages::list_languages()
            .iter()
            .map(|l| Voice::new(l.name, l.bcp47))
            .collect()
    }

    async fn cancel(&self) {
        let pid = self.current_pid.swap(0, Ordering::SeqCst);
        if pid == 0 {
            return;
        }
        // Best effort: the process may already have exited.
        let _ = tokio::process::Command::new("kill")
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
    }

    async fn speak(&self, utterance: Utterance) -> Result<()> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(build_args(&utterance))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    SignshError::Speech {
                        message: format!(
                            "'{}' not found. Install espeak-ng:\n  \
                             Ubuntu/Debian: sudo apt install espeak-ng\n  \
                             Arch: sudo pacman -S espeak-ng",
                            self.program
                        ),
                    }
                } else {
                    SignshError::Speech {
                        message: format!("failed to run '{}': {}", self.program, e),
                    }
                }
            })?;

        self.current_pid
            .store(child.id().unwrap_or(0), Ordering::SeqCst);

        let exit = child.wait().await;
        // cancel() zeroes the pid before killing; if it is already zero
        // here, the utterance was cancelled and the exit status is noise.
        let cancelled = self.current_pid.swap(0, Ordering::SeqCst) == 0;

        let status = exit.map_err(|e| SignshError::Speech {
            message: format!("failed to wait for '{}': {}", self.program, e),
        })?;

        if cancelled {
            return Ok(());
        }
        if !status.success() {
            return Err(SignshError::Speech {
                message: format!("'{}' exited with {}", self.program, status),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "espeak"
    }
}
