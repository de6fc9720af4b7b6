//! Error reporting for the pipeline loop.
//!
//! Stage failures inside the loop are recoverable; they are handed to a
//! reporter instead of tearing the session down. Only detector
//! initialization is allowed to fail the session.

use crate::error::SignshError;
use std::sync::{Arc, Mutex};

/// Trait for reporting errors from a pipeline stage.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from the named stage.
    fn report(&self, stage: &str, error: &SignshError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &SignshError) {
        eprintln!("[{}] {}", stage, error);
    }
}

/// Error reporter that collects reports for inspection.
///
/// Clones share the underlying list, so a test can keep a handle while
/// the pipeline owns the reporter.
#[derive(Debug, Clone, Default)]
pub struct MockReporter {
    reports: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported (stage, message) pairs in order.
    pub fn reports(&self) -> Vec<(String, String)> {
        match self.reports.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of reports so far.
    pub fn len(&self) -> usize {
        self.reports().len()
    }

    /// True when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.reports().is_empty()
    }
}

impl ErrorReporter for MockReporter {
    fn report(&self, stage: &str, error: &SignshError) {
        let mut reports = match self.reports.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        reports.push((stage.to_string(), error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter() {
        let reporter = LogReporter;
        let error = SignshError::Detection {
            message: "test error".to_string(),
        };
        // Just ensure it doesn't panic
        reporter.report("detector", &error);
    }

    #[test]
    fn test_mock_reporter_collects_in_order() {
        let reporter = MockReporter::new();
        assert!(reporter.is_empty());

        reporter.report(
            "detector",
            &SignshError::Detection {
                message: "lost frame".to_string(),
            },
        );
        reporter.report(
            "translator",
            &SignshError::Translation {
                message: "service down".to_string(),
            },
        );

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, "detector");
        assert!(reports[0].1.contains("lost frame"));
        assert_eq!(reports[1].0, "translator");
    }

    #[test]
    fn test_mock_reporter_shares_state_across_clones() {
        let reporter = MockReporter::new();
        let handle = reporter.clone();

        reporter.report(
            "synthesizer",
            &SignshError::Speech {
                message: "engine gone".to_string(),
            },
        );

        assert_eq!(handle.len(), 1);
    }
}
