//! Error types for signsh.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignshError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Landmark detector errors
    #[error("Landmark detector failed to initialize: {message}")]
    DetectorInit { message: String },

    #[error("Landmark detection failed: {message}")]
    Detection { message: String },

    // Dataset backend errors
    #[error("Dataset backend error: {message}")]
    Backend { message: String },

    #[error("Invalid dataset: {message}")]
    InvalidDataset { message: String },

    #[error("Unknown gesture label: {label}")]
    UnknownLabel { label: String },

    // External speech/text services
    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Grammar correction failed: {message}")]
    Grammar { message: String },

    #[error("Speech synthesis failed: {message}")]
    Speech { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SignshError>;
