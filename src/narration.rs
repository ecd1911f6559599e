use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{debug, info};

use crate::app_controller::progress_bar;
use crate::errors::MediaError;
use crate::file_utils::FileManager;
use crate::media::{Ffmpeg, MediaProbe};
use crate::providers::SpeechSynthesizer;

// @module: Per-sentence speech synthesis and narration track assembly

/// Synthesized audio for one sentence
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Audio file on disk
    pub path: PathBuf,
    /// Probed length in seconds
    pub duration_secs: f64,
}

/// Sum of clip durations, added in narration order
pub fn total_duration(clips: &[AudioClip]) -> f64 {
    clips.iter().fold(0.0, |total, clip| total + clip.duration_secs)
}

/// Turns sentences into measured audio clips
pub struct Narrator<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    probe: &'a dyn MediaProbe,
}

impl<'a> Narrator<'a> {
    pub fn new(synthesizer: &'a dyn SpeechSynthesizer, probe: &'a dyn MediaProbe) -> Self {
        Self { synthesizer, probe }
    }

    /// Path of the clip for sentence `index`
    pub fn clip_path(&self, audio_dir: &Path, index: usize) -> PathBuf {
        audio_dir.join(format!("sentence{}.{}", index, self.synthesizer.file_extension()))
    }

    /// Synthesize every sentence in order, one file each, and probe its duration.
    ///
    /// The first failing call aborts the whole batch.
    pub async fn synthesize_all(&self, sentences: &[String], audio_dir: &Path) -> Result<Vec<AudioClip>> {
        FileManager::ensure_dir(audio_dir)?;

        let progress = progress_bar(sentences.len() as u64, "sentences");
        let mut clips = Vec::with_capacity(sentences.len());

        for (index, sentence) in sentences.iter().enumerate() {
            let audio = self
                .synthesizer
                .synthesize(sentence)
                .await
                .with_context(|| format!("Speech synthesis failed for sentence {}", index + 1))?;

            let path = self.clip_path(audio_dir, index);
            tokio::fs::write(&path, &audio)
                .await
                .map_err(MediaError::from)
                .with_context(|| format!("Failed to write audio clip: {}", path.display()))?;

            let info = self
                .probe
                .probe(&path)
                .await
                .with_context(|| format!("Failed to measure audio clip: {}", path.display()))?;

            debug!("Sentence {} -> {} ({:.3}s)", index + 1, path.display(), info.duration_secs);
            clips.push(AudioClip {
                path,
                duration_secs: info.duration_secs,
            });
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Synthesized {} sentences, {:.2}s of narration",
            clips.len(),
            total_duration(&clips)
        );

        Ok(clips)
    }
}

/// Join per-sentence clips into the single narration track
pub async fn concat_audio(ffmpeg: &Ffmpeg, clips: &[AudioClip], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        FileManager::ensure_dir(parent)?;
    }

    let inputs: Vec<PathBuf> = clips.iter().map(|clip| clip.path.clone()).collect();
    ffmpeg
        .concat(&inputs, output, false)
        .await
        .with_context(|| format!("Failed to assemble narration track: {}", output.display()))?;

    info!("Narration track written to {}", output.display());
    Ok(())
}
