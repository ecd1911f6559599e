use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, warn};

// @module: Narration script loading and sentence splitting

/// Split a script into sentences on every literal period.
///
/// No abbreviation or decimal handling: "Dr. Smith" and "3.5" are split too.
/// A script ending in a period yields a trailing empty segment.
pub fn split_sentences(script: &str) -> Vec<String> {
    script.split('.').map(str::to_string).collect()
}

/// Remove segments that contain nothing to speak
pub fn spoken_sentences(sentences: Vec<String>) -> Vec<String> {
    let total = sentences.len();
    let spoken: Vec<String> = sentences
        .into_iter()
        .filter(|sentence| !sentence.trim().is_empty())
        .collect();

    let dropped = total - spoken.len();
    if dropped > 0 {
        warn!("Skipping {} empty script segment(s)", dropped);
    }

    spoken
}

/// Read a script file and split it into sentences
pub fn load_sentences<P: AsRef<Path>>(path: P, skip_empty: bool) -> Result<Vec<String>> {
    let path = path.as_ref();
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;

    let sentences = split_sentences(&script);
    debug!("Script {} split into {} segments", path.display(), sentences.len());

    if skip_empty {
        Ok(spoken_sentences(sentences))
    } else {
        Ok(sentences)
    }
}
