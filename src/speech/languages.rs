//! Supported translation languages.
//!
//! Gesture labels are recorded in English; emissions can be translated into
//! any of these languages before display and speech. The BCP-47 tag is what
//! the synthesizer's voice catalog is matched against.

/// Metadata for a supported target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// ISO 639-1 code used for translation requests (e.g. "es").
    pub code: &'static str,
    /// English display name.
    pub name: &'static str,
    /// BCP-47 tag used for voice selection (e.g. "es-ES").
    pub bcp47: &'static str,
}

/// Catalog of supported target languages.
pub const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "en", name: "English", bcp47: "en-US" },
    LanguageInfo { code: "es", name: "Spanish", bcp47: "es-ES" },
    LanguageInfo { code: "fr", name: "French", bcp47: "fr-FR" },
    LanguageInfo { code: "de", name: "German", bcp47: "de-DE" },
    LanguageInfo { code: "pt", name: "Portuguese", bcp47: "pt-BR" },
    LanguageInfo { code: "it", name: "Italian", bcp47: "it-IT" },
    LanguageInfo { code: "ru", name: "Russian", bcp47: "ru-RU" },
    LanguageInfo { code: "ar", name: "Arabic", bcp47: "ar-SA" },
    LanguageInfo { code: "nl", name: "Dutch", bcp47: "nl-NL" },
    LanguageInfo { code: "pl", name: "Polish", bcp47: "pl-PL" },
    LanguageInfo { code: "tr", name: "Turkish", bcp47: "tr-TR" },
    LanguageInfo { code: "zh", name: "Chinese", bcp47: "zh-CN" },
    LanguageInfo { code: "ja", name: "Japanese", bcp47: "ja-JP" },
    LanguageInfo { code: "ko", name: "Korean", bcp47: "ko-KR" },
    LanguageInfo { code: "hi", name: "Hindi", bcp47: "hi-IN" },
    LanguageInfo { code: "id", name: "Indonesian", bcp47: "id-ID" },
    LanguageInfo { code: "sv", name: "Swedish", bcp47: "sv-SE" },
    LanguageInfo { code: "cs", name: "Czech", bcp47: "cs-CZ" },
    LanguageInfo { code: "el", name: "Greek", bcp47: "el-GR" },
    LanguageInfo { code: "hu", name: "Hungarian", bcp47: "hu-HU" },
    LanguageInfo { code: "ro", name: "Romanian", bcp47: "ro-RO" },
    LanguageInfo { code: "bg", name: "Bulgarian", bcp47: "bg-BG" },
    LanguageInfo { code: "uk", name: "Ukrainian", bcp47: "uk-UA" },
    LanguageInfo { code: "fi", name: "Finnish", bcp47: "fi-FI" },
    LanguageInfo { code: "da", name: "Danish", bcp47: "da-DK" },
];

/// Find a language by ISO code.
pub fn get_language(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// All supported languages.
pub fn list_languages() -> &'static [LanguageInfo] {
    LANGUAGES
}

/// Whether the code names a supported language.
pub fn is_supported(code: &str) -> bool {
    get_language(code).is_some()
}

/// BCP-47 tag for a language code.
///
/// Unknown codes pass through unchanged so the synthesizer still gets
/// something to match on.
pub fn bcp47(code: &str) -> &str {
    get_language(code).map_or(code, |l| l.bcp47)
}
