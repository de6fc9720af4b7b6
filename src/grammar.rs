//! Grammar correction for exported transcripts.
//!
//! Raw transcripts are strings of gesture labels ("hello my name john").
//! Before export they can be run through a corrector that patches them into
//! readable sentences. Correction is best-effort: callers fall back to the
//! raw text when the corrector fails.

use crate::error::{Result, SignshError};

/// A single text patch reported by a corrector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte offset of the span to replace.
    pub offset: usize,
    /// Byte length of the span to replace.
    pub length: usize,
    /// Replacement text.
    pub value: String,
}

/// Apply replacements to `text`, highest offset first.
///
/// Applying back-to-front keeps earlier offsets valid as the string shifts.
/// Replacements that fall outside the text or cut a UTF-8 character in half
/// are skipped rather than applied partially.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut result = text.to_string();
    for r in sorted {
        let end = match r.offset.checked_add(r.length) {
            Some(end) if end <= result.len() => end,
            _ => continue,
        };
        if !result.is_char_boundary(r.offset) || !result.is_char_boundary(end) {
            continue;
        }
        result.replace_range(r.offset..end, &r.value);
    }
    result
}

/// Turns a raw label transcript into corrected prose.
#[async_trait::async_trait]
pub trait GrammarCorrector: Send + Sync {
    /// Correct `text` written in language `lang` (ISO code, e.g. "en").
    async fn correct(&self, text: &str, lang: &str) -> Result<String>;

    /// Corrector name for logging.
    fn name(&self) -> &str;
}

/// Scripted corrector for tests.
pub struct MockCorrector {
    response: Option<String>,
    should_fail: bool,
    error_message: String,
}

impl MockCorrector {
    pub fn new() -> Self {
        Self {
            response: None,
            should_fail: false,
            error_message: "mock grammar failure".to_string(),
        }
    }

    /// Return a fixed response instead of echoing the input.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

impl Default for MockCorrector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GrammarCorrector for MockCorrector {
    async fn correct(&self, text: &str, _lang: &str) -> Result<String> {
        if self.should_fail {
            return Err(SignshError::Grammar {
                message: self.error_message.clone(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| text.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Corrector that returns the input unchanged.
///
/// Used when the build has no remote correction service; exports then
/// contain the raw label transcript.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCorrector;

#[async_trait::async_trait]
impl GrammarCorrector for PassthroughCorrector {
    async fn correct(&self, text: &str, _lang: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Corrector backed by a LanguageTool-compatible HTTP endpoint.
#[cfg(feature = "remote")]
pub struct HttpCorrector {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "remote")]
impl HttpCorrector {
    pub const DEFAULT_URL: &'static str = "https://api.languagetool.org";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_URL)
    }

    /// Point at a different endpoint, e.g. a local server in tests.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(feature = "remote")]
impl Default for HttpCorrector {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract replacements from a LanguageTool check response.
///
/// Each match contributes its first suggested replacement; matches without
/// suggestions are dropped.
#[cfg(feature = "remote")]
fn replacements_from_response(value: &serde_json::Value) -> Vec<Replacement> {
    let Some(matches) = value.get("matches").and_then(|m| m.as_array()) else {
        return Vec::new();
    };

    matches
        .iter()
        .filter_map(|m| {
            let offset = m.get("offset")?.as_u64()? as usize;
            let length = m.get("length")?.as_u64()? as usize;
            let value = m
                .get("replacements")?
                .as_array()?
                .first()?
                .get("value")?
                .as_str()?
                .to_string();
            Some(Replacement {
                offset,
                length,
                value,
            })
        })
        .collect()
}

#[cfg(feature = "remote")]
#[async_trait::async_trait]
impl GrammarCorrector for HttpCorrector {
    async fn correct(&self, text: &str, lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let url = format!("{}/v2/check", self.base_url);
        let params = [("text", text), ("language", lang)];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| SignshError::Grammar {
                message: format!("Request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SignshError::Grammar {
                message: format!("Server returned status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| SignshError::Grammar {
            message: format!("Failed to read response: {e}"),
        })?;

        let parsed: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SignshError::Grammar {
                message: format!("Invalid response JSON: {e}"),
            })?;

        let replacements = replacements_from_response(&parsed);
        Ok(apply_replacements(text, &replacements))
    }

    fn name(&self) -> &str {
        "languagetool"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(offset: usize, length: usize, value: &str) -> Replacement {
        Replacement {
            offset,
            length,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_apply_single_replacement() {
        let out = apply_replacements("hello world", &[r(6, 5, "there")]);
        assert_eq!(out, "hello there");
    }

    #[test]
    fn test_apply_capitalizes_first_word() {
        let out = apply_replacements("hello world", &[r(0, 5, "Hello")]);
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn test_apply_multiple_back_to_front() {
        // Given in ascending order; must still apply cleanly.
        let out = apply_replacements("i am go store", &[r(0, 1, "I"), r(5, 2, "going to the")]);
        assert_eq!(out, "I am going to the store");
    }

    #[test]
    fn test_apply_out_of_bounds_skipped() {
        let out = apply_replacements("short", &[r(10, 3, "nope"), r(0, 1, "S")]);
        assert_eq!(out, "Short");
    }

    #[test]
    fn test_apply_length_overflowing_end_skipped() {
        let out = apply_replacements("abc", &[r(1, 10, "nope")]);
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_apply_mid_character_skipped() {
        // Offset 1 lands inside the two-byte 'é'.
        let out = apply_replacements("élan", &[r(1, 1, "x")]);
        assert_eq!(out, "élan");
    }

    #[test]
    fn test_apply_empty_replacement_deletes() {
        let out = apply_replacements("hello  world", &[r(5, 1, "")]);
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn test_mock_corrector_echoes_by_default() {
        let corrector = MockCorrector::new();
        let out = corrector.correct("hello world", "en").await.unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn test_mock_corrector_fixed_response() {
        let corrector = MockCorrector::new().with_response("Hello, world!");
        let out = corrector.correct("hello world", "en").await.unwrap();
        assert_eq!(out, "Hello, world!");
    }

    #[tokio::test]
    async fn test_mock_corrector_failure() {
        let corrector = MockCorrector::new()
            .with_failure()
            .with_error_message("service down");
        let err = corrector.correct("hello", "en").await.unwrap_err();
        assert!(err.to_string().contains("service down"));
    }

    #[test]
    fn test_mock_corrector_name() {
        assert_eq!(MockCorrector::new().name(), "mock");
    }

    #[tokio::test]
    async fn test_passthrough_corrector_returns_input() {
        let corrector = PassthroughCorrector;
        let out = corrector.correct("hello my name john", "en").await.unwrap();
        assert_eq!(out, "hello my name john");
        assert_eq!(corrector.name(), "passthrough");
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_replacements_from_response_shape() {
        let body = serde_json::json!({
            "matches": [
                {
                    "offset": 0,
                    "length": 1,
                    "replacements": [{"value": "I"}, {"value": "A"}]
                },
                {
                    "offset": 5,
                    "length": 2,
                    "replacements": []
                }
            ]
        });
        let reps = replacements_from_response(&body);
        assert_eq!(reps, vec![r(0, 1, "I")]);
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_replacements_from_response_missing_matches() {
        let body = serde_json::json!({"software": {"name": "LanguageTool"}});
        assert!(replacements_from_response(&body).is_empty());
    }
}
