/*!
 * Error types for the shortreel application.
 *
 * This module contains custom error types for the different stages of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;
use thiserror::Error;

/// Errors that can occur when talking to an external service (TTS, transcription)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The transcription job finished with an error status
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// The service did not answer in time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether the same call could succeed if issued again later.
    ///
    /// Nothing in the pipeline retries; this only drives how failures are reported.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::RequestFailed(_)
            | Self::ParseError(_)
            | Self::AuthenticationError(_)
            | Self::TranscriptionFailed(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while building, parsing or rewriting subtitles
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The SRT content could not be parsed
    #[error("Malformed SRT: {0}")]
    Format(String),

    /// A timestamp string was not in SRT form
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Sentence and audio clip lists do not pair up
    #[error("Cannot pair {sentences} sentences with {clips} audio clips")]
    LengthMismatch {
        /// Number of sentences
        sentences: usize,
        /// Number of audio clips
        clips: usize,
    },
}

/// Errors raised by ffmpeg/ffprobe invocations and media files
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool binary could not be started
    #[error("Failed to execute {tool}: {message}")]
    Spawn {
        /// Binary name
        tool: String,
        /// OS error text
        message: String,
    },

    /// The tool ran and exited with a failure status
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Binary name
        tool: String,
        /// Filtered stderr
        message: String,
    },

    /// The tool did not finish within the configured timeout
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Binary name
        tool: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// A media file is missing or its probe output is unusable
    #[error("Invalid media file {path}: {message}")]
    InvalidMedia {
        /// Offending path
        path: String,
        /// What was wrong
        message: String,
    },

    /// The clip pool cannot fill any duration
    #[error("Video clip pool has no usable footage")]
    EmptyPool,

    /// Reading or writing a working file failed
    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors found while validating the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required value is empty or absent
    #[error("Missing required configuration value: {0}")]
    Missing(String),

    /// A value is present but unusable
    #[error("Invalid configuration value for {field}: {message}")]
    Invalid {
        /// Config key
        field: String,
        /// Why it was rejected
        message: String,
    },
}

/// Pipeline stage, used to report where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Script,
    Synthesis,
    Narration,
    Subtitles,
    Equalization,
    Combination,
    Rendering,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Script => "script",
            Self::Synthesis => "speech synthesis",
            Self::Narration => "narration",
            Self::Subtitles => "subtitles",
            Self::Equalization => "subtitle equalization",
            Self::Combination => "video combination",
            Self::Rendering => "rendering",
        };
        write!(f, "{}", name)
    }
}

/// Main application error type, naming the stage a run stopped in
#[derive(Error, Debug)]
pub enum AppError {
    /// A pipeline stage failed
    #[error("{stage} stage failed: {message}")]
    Stage {
        /// Stage that was running
        stage: PipelineStage,
        /// Full error chain of the failure
        message: String,
    },
}

impl AppError {
    /// Tag an error with the stage it came from
    pub fn stage(stage: PipelineStage, error: impl Into<anyhow::Error>) -> Self {
        Self::Stage {
            stage,
            message: format!("{:#}", error.into()),
        }
    }
}
