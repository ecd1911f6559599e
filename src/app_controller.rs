use anyhow::{Result, Context};
use log::{info, warn, debug};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;

use crate::app_config::Config;
use crate::errors::{AppError, PipelineStage};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::media::Ffmpeg;
use crate::narration::{self, Narrator};
use crate::providers::{SpeechSynthesizer, Transcriber};
use crate::providers::assemblyai::AssemblyAi;
use crate::providers::elevenlabs::ElevenLabs;
use crate::script;
use crate::subtitle_builder::{self, SubtitleJob, SubtitleMode};
use crate::video_combiner::{self, CombineRequest};
use crate::video_renderer::{self, RenderJob, RenderStyle};

// @module: Application controller for the video assembly pipeline

/// Progress bar in the application's house style
pub fn progress_bar(len: u64, unit: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    let template_result = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(template_result.progress_chars("█▓▒░"));
    progress_bar
}

/// What a run would do, computed without touching any service
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub sentences: Vec<String>,
    pub subtitle_mode: SubtitleMode,
    pub video_pool: Vec<PathBuf>,
    pub output_path: PathBuf,
}

impl fmt::Display for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sentences: {}", self.sentences.len())?;
        for (i, sentence) in self.sentences.iter().enumerate() {
            writeln!(f, "  {:>3}. {}", i + 1, sentence.trim())?;
        }
        match &self.subtitle_mode {
            SubtitleMode::Remote { language_code } => {
                let name = language_utils::get_language_name(language_code)
                    .unwrap_or_else(|_| "unrecognized language".to_string());
                writeln!(f, "Subtitles: remote transcription ({}, {})", language_code, name)?
            }
            SubtitleMode::Local => writeln!(f, "Subtitles: local timing")?,
        }
        writeln!(f, "Video clips: {}", self.video_pool.len())?;
        for clip in &self.video_pool {
            writeln!(f, "  {}", clip.display())?;
        }
        write!(f, "Output: {}", self.output_path.display())
    }
}

/// Main application controller: script in, finished short video out
pub struct Controller {
    // @field: App configuration
    config: Config,
    synthesizer: Box<dyn SpeechSynthesizer>,
    transcriber: Option<Box<dyn Transcriber>>,
    ffmpeg: Ffmpeg,
}

impl Controller {
    // @method: Create a controller backed by the configured services
    pub fn with_config(config: Config) -> Result<Self> {
        let synthesizer: Box<dyn SpeechSynthesizer> = Box::new(ElevenLabs::from_config(&config.tts));
        let transcriber = AssemblyAi::from_config(&config.transcription)
            .map(|service| Box::new(service) as Box<dyn Transcriber>);

        Ok(Self::with_providers(config, synthesizer, transcriber))
    }

    /// Create a controller with explicit service implementations
    pub fn with_providers(
        config: Config,
        synthesizer: Box<dyn SpeechSynthesizer>,
        transcriber: Option<Box<dyn Transcriber>>,
    ) -> Self {
        let ffmpeg = Ffmpeg::from_config(&config.video);
        Self {
            config,
            synthesizer,
            transcriber,
            ffmpeg,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subtitle mode implied by the transcription credential
    pub fn subtitle_mode(&self) -> SubtitleMode {
        SubtitleMode::select(self.config.transcription.credential(), &self.config.voice)
    }

    /// Resolve inputs and decisions of a run without calling any service
    pub fn plan(&self) -> Result<RunPlan> {
        let sentences = script::load_sentences(&self.config.script_path, self.config.script.skip_empty_sentences)?;
        let video_pool = FileManager::collect_video_pool(&self.config.video_path, &self.config.video_pool)?;

        Ok(RunPlan {
            sentences,
            subtitle_mode: self.subtitle_mode(),
            video_pool,
            output_path: self.config.output_path.clone(),
        })
    }

    /// Run the whole pipeline and return the path of the rendered video
    pub async fn run(&self) -> Result<PathBuf> {
        let start_time = Instant::now();
        let config = &self.config;

        let sentences = script::load_sentences(&config.script_path, config.script.skip_empty_sentences)
            .map_err(|e| AppError::stage(PipelineStage::Script, e))?;
        if sentences.is_empty() {
            return Err(AppError::stage(
                PipelineStage::Script,
                anyhow::anyhow!("Script {:?} has no sentences to narrate", config.script_path),
            )
            .into());
        }
        info!("Script loaded: {} sentences", sentences.len());

        // Render inputs are checked before any paid service is called
        let video_pool = FileManager::collect_video_pool(&config.video_path, &config.video_pool)
            .map_err(|e| AppError::stage(PipelineStage::Combination, e))?;
        let style = RenderStyle::from_config(&config.subtitles)
            .map_err(|e| AppError::stage(PipelineStage::Rendering, e))?;

        self.synthesizer
            .test_connection()
            .await
            .map_err(|e| AppError::stage(PipelineStage::Synthesis, e))?;

        FileManager::ensure_dir(&config.temp_dir)?;
        let mut scratch: Option<TempDir> = None;
        let audio_dir = match &config.tts.audio_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = TempDir::new_in(&config.temp_dir)
                    .context("Failed to create audio scratch directory")?;
                let path = dir.path().to_path_buf();
                scratch = Some(dir);
                path
            }
        };

        let clips = Narrator::new(self.synthesizer.as_ref(), &self.ffmpeg)
            .synthesize_all(&sentences, &audio_dir)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Synthesis, e))?;

        narration::concat_audio(&self.ffmpeg, &clips, &config.audio_path)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Narration, e))?;
        let narration_secs = narration::total_duration(&clips);

        let mode = self.subtitle_mode();
        if mode.is_remote() && self.transcriber.is_none() {
            warn!("Transcription credential set but no transcriber available");
        }
        let job = SubtitleJob {
            audio_path: &config.audio_path,
            sentences: &sentences,
            clips: &clips,
            subtitles_path: &config.subtitles_path,
            max_chars: config.subtitles.max_chars,
        };
        subtitle_builder::generate_subtitles(&mode, self.transcriber.as_deref(), &job).await?;

        let request = CombineRequest {
            video_paths: &video_pool,
            target_secs: narration_secs,
            max_clip_secs: config.video.max_clip_duration,
            threads: config.video.threads,
            temp_dir: &config.temp_dir,
        };
        let combined = video_combiner::combine_videos(&self.ffmpeg, &self.ffmpeg, &request)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Combination, e))?;

        let render = RenderJob {
            video_path: &combined,
            audio_path: &config.audio_path,
            subtitles_path: &config.subtitles_path,
            output_path: &config.output_path,
            threads: config.video.threads,
        };
        video_renderer::render_video(&self.ffmpeg, &render, &style)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Rendering, e))?;

        if let Some(dir) = scratch {
            debug!("Removing audio scratch directory {}", dir.path().display());
        }

        info!(
            "Success: {} ({:.2}s of video, finished in {})",
            config.output_path.display(),
            narration_secs,
            Self::format_duration(start_time.elapsed())
        );
        Ok(config.output_path.clone())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
