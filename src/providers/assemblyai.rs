use std::path::Path;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::app_config::TranscriptionConfig;
use crate::errors::ProviderError;
use crate::providers::Transcriber;

/// AssemblyAI client for transcribing the narration into subtitles
#[derive(Debug)]
pub struct AssemblyAi {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `authorization` header
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Delay between status polls
    poll_interval: Duration,
    /// Total time allowed for a transcript to complete
    timeout: Duration,
}

/// Response of the upload endpoint
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    /// Private URL of the uploaded audio
    pub upload_url: String,
}

/// Transcript creation request
#[derive(Debug, Serialize)]
pub struct TranscriptRequest {
    /// URL of the audio to transcribe
    pub audio_url: String,

    /// Spoken language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Lifecycle state of a transcript job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Transcript resource as returned by create and poll calls
#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    /// Transcript identifier
    pub id: String,
    /// Job state
    pub status: TranscriptStatus,
    /// Failure reason when `status` is `error`
    #[serde(default)]
    pub error: Option<String>,
}

impl TranscriptResponse {
    /// Whether polling can stop
    pub fn is_finished(&self) -> bool {
        matches!(self.status, TranscriptStatus::Completed | TranscriptStatus::Error)
    }
}

impl AssemblyAi {
    /// Create a new AssemblyAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(600),
        }
    }

    /// Create a client from the transcription section of the config.
    ///
    /// Returns `None` when no credential is configured.
    pub fn from_config(config: &TranscriptionConfig) -> Option<Self> {
        let api_key = config.credential()?;
        Some(Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
            ..Self::new(api_key, config.endpoint.clone())
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Upload local audio and return the URL the service can read it from
    pub async fn upload(&self, audio_path: &Path) -> Result<String, ProviderError> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            ProviderError::RequestFailed(format!("Cannot read {}: {}", audio_path.display(), e))
        })?;

        debug!("Uploading {} bytes from {}", audio.len(), audio_path.display());
        let response = self
            .client
            .post(self.url("upload"))
            .header("authorization", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(audio)
            .send()
            .await?;

        let upload: UploadResponse = Self::check(response).await?.json().await?;
        Ok(upload.upload_url)
    }

    /// Start a transcript job
    pub async fn create_transcript(&self, request: &TranscriptRequest) -> Result<TranscriptResponse, ProviderError> {
        let response = self
            .client
            .post(self.url("transcript"))
            .header("authorization", &self.api_key)
            .json(request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the current state of a transcript job
    pub async fn get_transcript(&self, id: &str) -> Result<TranscriptResponse, ProviderError> {
        let response = self
            .client
            .get(self.url(&format!("transcript/{}", id)))
            .header("authorization", &self.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Poll until the job completes, fails, or the timeout elapses
    pub async fn wait_for_completion(&self, id: &str) -> Result<TranscriptResponse, ProviderError> {
        let started = Instant::now();
        loop {
            let transcript = self.get_transcript(id).await?;
            if transcript.is_finished() {
                return Ok(transcript);
            }

            if started.elapsed() >= self.timeout {
                return Err(ProviderError::Timeout(format!(
                    "transcript {} still {:?} after {} seconds",
                    id,
                    transcript.status,
                    self.timeout.as_secs()
                )));
            }

            debug!("Transcript {} is {:?}, polling again", id, transcript.status);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Export a completed transcript as SRT
    pub async fn export_srt(&self, id: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(self.url(&format!("transcript/{}/srt", id)))
            .header("authorization", &self.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.text().await?)
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("AssemblyAI API error ({}): {}", status, error_text);
        Err(ProviderError::from_status(status.as_u16(), error_text))
    }
}

#[async_trait]
impl Transcriber for AssemblyAi {
    async fn transcribe_srt(&self, audio_path: &Path, language_code: &str) -> Result<String, ProviderError> {
        let audio_url = self.upload(audio_path).await?;

        let request = TranscriptRequest {
            audio_url,
            language_code: Some(language_code.to_string()),
        };
        let created = self.create_transcript(&request).await?;
        info!("Transcript {} submitted ({})", created.id, language_code);

        let finished = self.wait_for_completion(&created.id).await?;
        if finished.status == TranscriptStatus::Error {
            return Err(ProviderError::TranscriptionFailed(
                finished.error.unwrap_or_else(|| "no error message returned".to_string()),
            ));
        }

        self.export_srt(&finished.id).await
    }
}
