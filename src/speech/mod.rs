//! Speech emission: debouncing, translation, synthesis.
//!
//! A stabilized label leaves the vote window, passes the debouncer's state
//! machine, is optionally translated, and finally becomes an utterance on
//! the synthesizer. Every external service here degrades to a local
//! fallback; only the debouncer is load-bearing for correctness.

pub mod debounce;
pub mod espeak;
pub mod languages;
pub mod synth;
pub mod translate;

pub use debounce::{OfferResult, SpeakState, SpeechDebouncer, UtteranceGuard};
pub use espeak::EspeakSynthesizer;
pub use synth::{MockSynthesizer, SpeechSynthesizer, Utterance, Voice, select_voice};
pub use translate::{MockTranslator, PassthroughTranslator, Translator};
#[cfg(feature = "remote")]
pub use translate::HttpTranslator;
