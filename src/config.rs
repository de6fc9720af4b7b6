use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;
use crate::error::{Result, SignshError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub speech: SpeechConfig,
    pub backend: BackendConfig,
}

/// Classification pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub frame_interval_ms: u64,
    pub window_ms: u64,
    pub confidence_threshold: f32,
    pub k_neighbors: usize,
}

/// Speech output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub target_language: String,
    pub refractory_ms: u64,
    pub rate: f32,
}

/// Dataset backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: defaults::FRAME_INTERVAL_MS,
            window_ms: defaults::WINDOW_DURATION_MS,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            k_neighbors: defaults::K_NEIGHBORS,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            target_language: defaults::DEFAULT_LANGUAGE.to_string(),
            refractory_ms: defaults::SPEAK_REFRACTORY_MS,
            rate: defaults::SPEECH_RATE,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: defaults::BACKEND_URL.to_string(),
            timeout_ms: defaults::BACKEND_TIMEOUT_MS,
        }
    }
}

impl PipelineConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl SpeechConfig {
    pub fn refractory(&self) -> Duration {
        Duration::from_millis(self.refractory_ms)
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Panics on invalid TOML rather than silently dropping the user's file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(SignshError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => panic!("Failed to load config from {}: {}", path.display(), e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNSH_LANGUAGE → speech.target_language
    /// - SIGNSH_BACKEND_URL → backend.url
    /// - SIGNSH_THRESHOLD → pipeline.confidence_threshold
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("SIGNSH_LANGUAGE")
            && !language.is_empty()
        {
            self.speech.target_language = language;
        }

        if let Ok(url) = std::env::var("SIGNSH_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.url = url;
        }

        if let Ok(threshold) = std::env::var("SIGNSH_THRESHOLD")
            && !threshold.is_empty()
        {
            match threshold.parse::<f32>() {
                Ok(value) => self.pipeline.confidence_threshold = value,
                Err(_) => eprintln!("Ignoring unparseable SIGNSH_THRESHOLD: {threshold}"),
            }
        }

        self
    }

    /// Check value ranges before the pipeline starts.
    pub fn validate(&self) -> Result<()> {
        let t = self.pipeline.confidence_threshold;
        if !(0.0..1.0).contains(&t) {
            return Err(SignshError::ConfigInvalidValue {
                key: "pipeline.confidence_threshold".to_string(),
                message: "must be between 0 and 1".to_string(),
            });
        }
        if self.pipeline.k_neighbors == 0 {
            return Err(SignshError::ConfigInvalidValue {
                key: "pipeline.k_neighbors".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.pipeline.frame_interval_ms == 0 {
            return Err(SignshError::ConfigInvalidValue {
                key: "pipeline.frame_interval_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.pipeline.window_ms == 0 {
            return Err(SignshError::ConfigInvalidValue {
                key: "pipeline.window_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.speech.rate <= 0.0 {
            return Err(SignshError::ConfigInvalidValue {
                key: "speech.rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signsh/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("signsh")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_signsh_env() {
        remove_env("SIGNSH_LANGUAGE");
        remove_env("SIGNSH_BACKEND_URL");
        remove_env("SIGNSH_THRESHOLD");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        // Pipeline defaults
        assert_eq!(config.pipeline.frame_interval_ms, 100);
        assert_eq!(config.pipeline.window_ms, 1000);
        assert_eq!(config.pipeline.confidence_threshold, 0.6);
        assert_eq!(config.pipeline.k_neighbors, 3);

        // Speech defaults
        assert_eq!(config.speech.target_language, "en");
        assert_eq!(config.speech.refractory_ms, 1500);
        assert_eq!(config.speech.rate, 0.9);

        // Backend defaults
        assert_eq!(config.backend.url, "http://localhost:3000");
        assert_eq!(config.backend.timeout_ms, 10_000);
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.pipeline.frame_interval(), Duration::from_millis(100));
        assert_eq!(config.pipeline.window(), Duration::from_secs(1));
        assert_eq!(config.speech.refractory(), Duration::from_millis(1500));
        assert_eq!(config.backend.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [pipeline]
            frame_interval_ms = 50
            window_ms = 2000
            confidence_threshold = 0.75
            k_neighbors = 5

            [speech]
            target_language = "es"
            refractory_ms = 3000
            rate = 1.2

            [backend]
            url = "http://gestures.local:8080"
            timeout_ms = 5000
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.pipeline.frame_interval_ms, 50);
        assert_eq!(config.pipeline.window_ms, 2000);
        assert_eq!(config.pipeline.confidence_threshold, 0.75);
        assert_eq!(config.pipeline.k_neighbors, 5);

        assert_eq!(config.speech.target_language, "es");
        assert_eq!(config.speech.refractory_ms, 3000);
        assert_eq!(config.speech.rate, 1.2);

        assert_eq!(config.backend.url, "http://gestures.local:8080");
        assert_eq!(config.backend.timeout_ms, 5000);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [speech]
            target_language = "fr"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        // Only the language should be overridden
        assert_eq!(config.speech.target_language, "fr");

        // Everything else should be defaults
        assert_eq!(config.pipeline.frame_interval_ms, 100);
        assert_eq!(config.pipeline.confidence_threshold, 0.6);
        assert_eq!(config.speech.refractory_ms, 1500);
        assert_eq!(config.backend.url, "http://localhost:3000");
    }

    #[test]
    fn test_env_override_language() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsh_env();

        set_env("SIGNSH_LANGUAGE", "de");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.speech.target_language, "de");
        assert_eq!(config.backend.url, "http://localhost:3000"); // Not overridden

        clear_signsh_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsh_env();

        set_env("SIGNSH_LANGUAGE", "ja");
        set_env("SIGNSH_BACKEND_URL", "http://10.0.0.2:3000");
        set_env("SIGNSH_THRESHOLD", "0.8");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.speech.target_language, "ja");
        assert_eq!(config.backend.url, "http://10.0.0.2:3000");
        assert_eq!(config.pipeline.confidence_threshold, 0.8);

        clear_signsh_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsh_env();

        set_env("SIGNSH_LANGUAGE", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.speech.target_language, "en");

        clear_signsh_env();
    }

    #[test]
    fn test_env_override_bad_threshold_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsh_env();

        set_env("SIGNSH_THRESHOLD", "very confident");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.pipeline.confidence_threshold, 0.6);

        clear_signsh_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [pipeline
            window_ms = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.pipeline.confidence_threshold = 1.5;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_validate_rejects_zero_neighbors() {
        let mut config = Config::default();
        config.pipeline.k_neighbors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_frame_interval() {
        let mut config = Config::default();
        config.pipeline.frame_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_rate() {
        let mut config = Config::default();
        config.speech.rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        // Should contain .config/signsh/config.toml
        assert!(path_str.contains("signsh"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_signsh_config_12345.toml");
        let config = Config::load_or_default(missing_path);

        // Should return defaults
        assert_eq!(config, Config::default());
    }

    #[test]
    #[should_panic(expected = "Failed to load config")]
    fn test_load_or_default_panics_on_invalid_toml() {
        let invalid_toml = r#"
            [pipeline
            window_ms = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        // Should panic on invalid TOML, not return defaults
        Config::load_or_default(temp_file.path());
    }
}
