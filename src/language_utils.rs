//! Language utilities for voice identifiers and ISO language codes
//!
//! Voice identifiers follow the TTS voice naming, which is close to but not
//! quite ISO 639-1 ("jp" instead of "ja", "kr" instead of "ko"). Voices are
//! mapped to the transcription service's code set before a transcript is
//! requested.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Voice identifiers whose transcription language differs from the identifier
const VOICE_LANGUAGE_OVERRIDES: &[(&str, &str)] = &[
    ("br", "pt"),
    // The transcription service has no Indonesian model
    ("id", "en"),
    ("jp", "ja"),
    ("kr", "ko"),
];

/// Map a voice identifier to the transcription service's language code.
///
/// Known mismatches go through the override table; anything else passes
/// through unchanged.
pub fn transcription_language_for_voice(voice: &str) -> String {
    VOICE_LANGUAGE_OVERRIDES
        .iter()
        .find(|(from, _)| *from == voice)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| voice.to_string())
}

/// Check whether a code is a valid ISO 639-1 (2-letter) code
pub fn is_iso_639_1(code: &str) -> bool {
    let normalized_code = code.trim().to_lowercase();
    normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some()
}

/// Get the English language name from a 2- or 3-letter code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let lang = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    Ok(lang.to_name().to_string())
}
