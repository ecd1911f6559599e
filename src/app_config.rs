use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

use crate::errors::ConfigError;
use crate::video_renderer::SubtitlePosition;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Narration script, sentences separated by periods
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Where the composed narration track is written
    #[serde(default = "default_audio_path")]
    pub audio_path: PathBuf,

    /// Where the SRT subtitle file is written
    #[serde(default = "default_subtitles_path")]
    pub subtitles_path: PathBuf,

    /// Directory holding the stock clip pool
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,

    /// Explicit clip pool; when non-empty it is used instead of scanning `video_path`
    #[serde(default)]
    pub video_pool: Vec<PathBuf>,

    /// Final rendered video
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Directory for combined videos and other working files
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Voice identifier, also used to pick the transcription language
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Transcription service config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Text-to-speech config
    #[serde(default)]
    pub tts: TtsConfig,

    /// Subtitle layout and styling
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Clip combination and encoding
    #[serde(default)]
    pub video: VideoConfig,

    /// Script handling
    #[serde(default)]
    pub script: ScriptConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Transcription (remote subtitle) service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// API key; absent or blank selects local subtitle timing
    #[serde(default, deserialize_with = "blank_string_as_none")]
    pub api_key: Option<String>,

    /// Service URL
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    /// Give up polling for a transcript after this many seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between transcript status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_transcription_endpoint(),
            timeout_secs: default_transcription_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TranscriptionConfig {
    /// The credential, if one is actually set
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

/// Text-to-speech service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TtsConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Voice used for every sentence
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    // @field: Model name
    #[serde(default = "default_tts_model")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    // @field: Audio encoding requested from the service
    #[serde(default = "default_output_format")]
    pub output_format: String,

    // @field: Voice stability (0.0 to 1.0)
    #[serde(default = "default_stability")]
    pub stability: f32,

    // @field: Similarity boost (0.0 to 1.0)
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    // @field: Timeout seconds
    #[serde(default = "default_tts_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Keep per-sentence clips here instead of a scratch directory
    #[serde(default)]
    pub audio_dir: Option<PathBuf>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: default_voice_id(),
            model: default_tts_model(),
            endpoint: default_tts_endpoint(),
            output_format: default_output_format(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            timeout_secs: default_tts_timeout_secs(),
            audio_dir: None,
        }
    }
}

/// Subtitle layout and styling
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Maximum characters per displayed subtitle chunk
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Anchor pair "horizontal,vertical", e.g. "center,bottom"
    #[serde(default = "default_position")]
    pub position: String,

    /// Text colour, a name or #RRGGBB
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Bold font file used for the overlay
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            position: default_position(),
            text_color: default_text_color(),
            font_path: default_font_path(),
            font_size: default_font_size(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

/// Clip combination and encoding
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// Longest stretch taken from a single source clip, in seconds
    #[serde(default = "default_max_clip_duration")]
    pub max_clip_duration: f64,

    /// Encoder threads passed to ffmpeg
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Upper bound for a single ffmpeg/ffprobe call
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            max_clip_duration: default_max_clip_duration(),
            threads: default_threads(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

/// Script handling
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Drop whitespace-only segments before speech synthesis
    #[serde(default = "default_true")]
    pub skip_empty_sentences: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            skip_empty_sentences: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn blank_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn default_script_path() -> PathBuf {
    PathBuf::from("script.txt")
}

fn default_audio_path() -> PathBuf {
    PathBuf::from("audio/narration.mp3")
}

fn default_subtitles_path() -> PathBuf {
    PathBuf::from("subtitles/subtitles.srt")
}

fn default_video_path() -> PathBuf {
    PathBuf::from("videos")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/final.mp4")
}

fn default_temp_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("shortreel"))
        .unwrap_or_else(|| std::env::temp_dir().join("shortreel"))
}

fn default_voice() -> String {
    "en".to_string()
}

fn default_transcription_endpoint() -> String {
    "https://api.assemblyai.com".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_voice_id() -> String {
    // "Rachel", one of the premade voices
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_tts_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_tts_timeout_secs() -> u64 {
    60
}

fn default_max_chars() -> usize {
    10
}

fn default_position() -> String {
    "center,center".to_string()
}

fn default_text_color() -> String {
    "green".to_string()
}

fn default_font_path() -> PathBuf {
    PathBuf::from("fonts/bold_font.ttf")
}

fn default_font_size() -> u32 {
    100
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_stroke_width() -> u32 {
    5
}

fn default_max_clip_duration() -> f64 {
    5.0
}

fn default_threads() -> usize {
    2
}

fn default_ffmpeg_timeout_secs() -> u64 {
    600
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the config file, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let required_paths = [
            ("script_path", &self.script_path),
            ("audio_path", &self.audio_path),
            ("subtitles_path", &self.subtitles_path),
            ("output_path", &self.output_path),
            ("temp_dir", &self.temp_dir),
        ];
        for (field, path) in required_paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Missing(field.to_string()));
            }
        }

        if self.video_pool.is_empty() && self.video_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("video_path or video_pool".to_string()));
        }

        if self.voice.trim().is_empty() {
            return Err(ConfigError::Missing("voice".to_string()));
        }

        validate_endpoint("transcription.endpoint", &self.transcription.endpoint)?;
        validate_endpoint("tts.endpoint", &self.tts.endpoint)?;

        if self.subtitles.max_chars == 0 {
            return Err(invalid("subtitles.max_chars", "must be greater than zero"));
        }

        SubtitlePosition::from_str(&self.subtitles.position)
            .map_err(|e| invalid("subtitles.position", &e.to_string()))?;

        if self.video.threads == 0 {
            return Err(invalid("video.threads", "must be greater than zero"));
        }

        let cap = self.video.max_clip_duration;
        if cap.is_nan() || cap <= 0.0 {
            return Err(invalid("video.max_clip_duration", "must be a positive number of seconds"));
        }

        Ok(())
    }

    /// Check the credentials a real (non dry-run) render needs
    pub fn require_tts_credentials(&self) -> std::result::Result<(), ConfigError> {
        if self.tts.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("tts.api_key".to_string()));
        }
        Ok(())
    }
}

fn validate_endpoint(field: &str, endpoint: &str) -> std::result::Result<(), ConfigError> {
    Url::parse(endpoint)
        .map(|_| ())
        .map_err(|e| invalid(field, &e.to_string()))
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            script_path: default_script_path(),
            audio_path: default_audio_path(),
            subtitles_path: default_subtitles_path(),
            video_path: default_video_path(),
            video_pool: Vec::new(),
            output_path: default_output_path(),
            temp_dir: default_temp_dir(),
            voice: default_voice(),
            transcription: TranscriptionConfig::default(),
            tts: TtsConfig::default(),
            subtitles: SubtitleConfig::default(),
            video: VideoConfig::default(),
            script: ScriptConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
