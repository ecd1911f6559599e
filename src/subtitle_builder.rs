/*!
 * Subtitle generation for the narration.
 *
 * Two modes produce the same artifact, an SRT file:
 * - remote: the transcription service listens to the composed narration;
 * - local: cue timings are accumulated from the per-sentence clip durations.
 *
 * The mode follows from the transcription credential alone. Either way the
 * file is equalized in place afterwards.
 */

use std::path::Path;
use anyhow::{Context, Result};
use log::{info, warn};

use crate::equalizer;
use crate::errors::{AppError, PipelineStage, SubtitleError};
use crate::language_utils;
use crate::narration::AudioClip;
use crate::providers::Transcriber;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry, write_srt_text};

/// How subtitles will be produced for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleMode {
    /// Transcribe the narration with the given language code
    Remote { language_code: String },
    /// Accumulate durations locally
    Local,
}

impl SubtitleMode {
    /// Remote when a non-blank credential is present, local otherwise
    pub fn select(credential: Option<&str>, voice: &str) -> Self {
        match credential {
            Some(key) if !key.trim().is_empty() => SubtitleMode::Remote {
                language_code: language_utils::transcription_language_for_voice(voice),
            },
            _ => SubtitleMode::Local,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SubtitleMode::Remote { .. })
    }
}

/// Build cues from sentences and the durations of their audio clips.
///
/// Cue `i` starts where cue `i - 1` ends; the first starts at zero. The two
/// lists must pair up one to one.
pub fn build_local_track(sentences: &[String], durations: &[f64]) -> Result<SubtitleCollection, SubtitleError> {
    if sentences.len() != durations.len() {
        return Err(SubtitleError::LengthMismatch {
            sentences: sentences.len(),
            clips: durations.len(),
        });
    }

    let mut entries = Vec::with_capacity(sentences.len());
    let mut start = 0.0_f64;
    for (i, (sentence, duration)) in sentences.iter().zip(durations).enumerate() {
        let end = start + duration;
        entries.push(SubtitleEntry::new(i + 1, start, end, sentence.as_str()));
        start = end;
    }

    Ok(SubtitleCollection::new(entries))
}

/// Everything subtitle generation needs from the earlier stages
pub struct SubtitleJob<'a> {
    /// Composed narration track, sent in remote mode
    pub audio_path: &'a Path,
    /// Spoken sentences in order
    pub sentences: &'a [String],
    /// One clip per sentence, same order
    pub clips: &'a [AudioClip],
    /// Destination SRT file
    pub subtitles_path: &'a Path,
    /// Equalization bound
    pub max_chars: usize,
}

/// Produce the SRT file in the selected mode, then equalize it in place.
///
/// `transcriber` must be present in remote mode. Failures are tagged with the
/// subtitles or equalization stage.
pub async fn generate_subtitles(
    mode: &SubtitleMode,
    transcriber: Option<&dyn Transcriber>,
    job: &SubtitleJob<'_>,
) -> Result<()> {
    write_subtitles(mode, transcriber, job)
        .await
        .map_err(|e| AppError::stage(PipelineStage::Subtitles, e))?;

    equalizer::equalize_srt_file(job.subtitles_path, job.max_chars)
        .map_err(|e| AppError::stage(PipelineStage::Equalization, e))?;

    info!("Subtitles generated: {}", job.subtitles_path.display());
    Ok(())
}

/// Produce the raw, unequalized SRT file in the selected mode
pub async fn write_subtitles(
    mode: &SubtitleMode,
    transcriber: Option<&dyn Transcriber>,
    job: &SubtitleJob<'_>,
) -> Result<()> {
    let srt = match mode {
        SubtitleMode::Remote { language_code } => {
            info!("Creating subtitles using the transcription service ({})", language_code);
            if !language_utils::is_iso_639_1(language_code) {
                warn!("'{}' is not an ISO 639-1 code, sending it unchanged", language_code);
            }

            let transcriber = transcriber
                .context("Remote subtitle mode selected but no transcriber is configured")?;
            transcriber
                .transcribe_srt(job.audio_path, language_code)
                .await
                .context("Transcription request failed")?
        }
        SubtitleMode::Local => {
            info!("Creating subtitles locally");
            let durations: Vec<f64> = job.clips.iter().map(|clip| clip.duration_secs).collect();
            build_local_track(job.sentences, &durations)?.to_srt()
        }
    };

    write_srt_text(job.subtitles_path, &srt)
}
