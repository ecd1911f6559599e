/*!
 * Subtitle equalization.
 *
 * Rewrites a track so that no displayed cue carries more than a fixed number
 * of characters. Long cues are split on word boundaries with a greedy fill,
 * and the original cue's time span is shared between the pieces in
 * proportion to their length. Cue boundaries of the input are never moved.
 */

use std::path::Path;
use anyhow::{Context, Result, anyhow};
use log::debug;

use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry, write_srt_text};

/// Default maximum characters per displayed cue
pub const DEFAULT_MAX_CHARS: usize = 10;

/// Split text into chunks of at most `max_chars` characters, breaking on whitespace.
///
/// A word longer than `max_chars` is kept whole as its own chunk.
pub fn greedy_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current.is_empty() {
            current.push_str(word);
        } else if current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split one cue into cues that respect `max_chars`
pub fn split_entry(entry: &SubtitleEntry, max_chars: usize) -> Vec<SubtitleEntry> {
    if entry.text.chars().count() <= max_chars {
        return vec![entry.clone()];
    }

    let chunks = greedy_chunks(&entry.text, max_chars);
    if chunks.len() <= 1 {
        // Either whitespace-only text or a single oversized word
        return vec![entry.clone()];
    }

    let total_chars: usize = chunks.iter().map(|c| c.chars().count()).sum();
    let span = entry.duration_secs();

    let mut pieces = Vec::with_capacity(chunks.len());
    let mut start = entry.start_secs;
    let last = chunks.len() - 1;
    for (i, chunk) in chunks.into_iter().enumerate() {
        let end = if i == last {
            entry.end_secs
        } else {
            start + span * chunk.chars().count() as f64 / total_chars as f64
        };
        pieces.push(SubtitleEntry::new(0, start, end, chunk));
        start = end;
    }

    pieces
}

/// Equalize a whole track; output cues are renumbered from 1
pub fn equalize(track: &SubtitleCollection, max_chars: usize) -> Result<SubtitleCollection> {
    if max_chars == 0 {
        return Err(anyhow!("max_chars must be greater than zero"));
    }

    let mut equalized = SubtitleCollection::new(
        track
            .entries
            .iter()
            .flat_map(|entry| split_entry(entry, max_chars))
            .collect(),
    );
    equalized.renumber();

    debug!(
        "Equalized {} cues into {} cues (max {} chars)",
        track.len(),
        equalized.len(),
        max_chars
    );

    Ok(equalized)
}

/// Rewrite an SRT file in place
pub fn equalize_srt_file<P: AsRef<Path>>(path: P, max_chars: usize) -> Result<()> {
    let path = path.as_ref();
    let track = SubtitleCollection::read_from_srt(path)?;
    let equalized = equalize(&track, max_chars)
        .with_context(|| format!("Failed to equalize {}", path.display()))?;
    write_srt_text(path, &equalized.to_srt())
}
