//! Translation boundary.
//!
//! Labels are recorded in English; when the session targets another
//! language, each emission is translated before display and speech. A
//! translation failure is never fatal: the caller falls back to the
//! untranslated text.

use crate::error::{Result, SignshError};

/// Trait for text translation services.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translates English text into the target language.
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;

    /// Name of the service for log messages.
    fn name(&self) -> &str;
}

/// Mock translator for testing.
///
/// Wraps the input so tests can tell translated output from pass-through.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    prefix: String,
    should_fail: bool,
}

impl MockTranslator {
    /// Creates a mock that prefixes translations with the target language.
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            should_fail: false,
        }
    }

    /// Configures a fixed prefix instead of the target language.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Configures the mock to fail on translate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        if self.should_fail {
            return Err(SignshError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        let prefix = if self.prefix.is_empty() {
            target_lang
        } else {
            &self.prefix
        };
        Ok(format!("{}:{}", prefix, text))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Translator that returns the input unchanged.
///
/// Used when the build has no remote translation service; the session
/// then speaks labels in English regardless of the target language.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait::async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _target_lang: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Translator speaking the public Google translate endpoint.
///
/// The response is a nested array; the translated text sits at
/// `[0][0][0]`. Anything else in the document is ignored.
#[cfg(feature = "remote")]
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "remote")]
impl HttpTranslator {
    const DEFAULT_URL: &'static str = "https://translate.googleapis.com/translate_a/single";

    /// Creates a translator against the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_URL)
    }

    /// Creates a translator against a custom endpoint (for tests).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }
}

#[cfg(feature = "remote")]
impl Default for HttpTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
#[async_trait::async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", "en"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| SignshError::Translation {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SignshError::Translation {
                message: format!("service returned status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| SignshError::Translation {
            message: format!("failed to read response: {e}"),
        })?;

        let data: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SignshError::Translation {
                message: format!("failed to parse response: {e}"),
            })?;

        let translated = data
            .get(0)
            .and_then(|v| v.get(0))
            .and_then(|v| v.get(0))
            .and_then(|v| v.as_str())
            .ok_or_else(|| SignshError::Translation {
                message: "unexpected response shape".to_string(),
            })?;

        if translated.is_empty() {
            return Ok(text.to_string());
        }
        Ok(translated.to_string())
    }

    fn name(&self) -> &str {
        "google-translate"
    }
}
