use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;

use crate::app_config::TtsConfig;
use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// ElevenLabs client for text-to-speech
#[derive(Debug)]
pub struct ElevenLabs {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Voice to speak with
    voice_id: String,
    /// Model to synthesize with
    model: String,
    /// Encoding requested from the service, e.g. "mp3_44100_128"
    output_format: String,
    /// Voice tuning sent with every request
    voice_settings: VoiceSettings,
}

/// Text-to-speech request body
#[derive(Debug, Serialize)]
pub struct SpeechRequest {
    /// The text to speak
    pub text: String,

    /// Model identifier
    pub model_id: String,

    /// Voice tuning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
}

/// Voice tuning parameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceSettings {
    /// Lower values give a more expressive, less stable delivery
    pub stability: f32,
    /// How closely to stick to the original voice
    pub similarity_boost: f32,
}

impl SpeechRequest {
    /// Create a new request for a piece of text
    pub fn new(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: model_id.into(),
            voice_settings: None,
        }
    }

    /// Set the voice tuning
    pub fn voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = Some(settings);
        self
    }
}

impl ElevenLabs {
    /// Create a new ElevenLabs client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            voice_id: voice_id.into(),
            model: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        }
    }

    /// Create a client from the TTS section of the config
    pub fn from_config(config: &TtsConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            voice_id: config.voice_id.clone(),
            model: config.model.clone(),
            output_format: config.output_format.clone(),
            voice_settings: VoiceSettings {
                stability: config.stability,
                similarity_boost: config.similarity_boost,
            },
        }
    }

    /// URL of the speech endpoint for the configured voice
    pub fn speech_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.endpoint.trim_end_matches('/'),
            self.voice_id,
            self.output_format
        )
    }

    /// Build the request body for one sentence
    pub fn build_request(&self, text: &str) -> SpeechRequest {
        SpeechRequest::new(text, self.model.clone()).voice_settings(self.voice_settings)
    }

    /// Request audio for a piece of text
    pub async fn generate(&self, text: &str) -> Result<Bytes, ProviderError> {
        let response = self
            .client
            .post(self.speech_url())
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("ElevenLabs API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ProviderError::ParseError("ElevenLabs returned an empty audio body".to_string()));
        }

        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabs {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        let audio = self.generate(text).await?;
        debug!("Received {} bytes of speech for {} chars", audio.len(), text.chars().count());
        Ok(audio)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v1/voices/{}", self.endpoint.trim_end_matches('/'), self.voice_id);
        let response = self
            .client
            .get(url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }
        Ok(())
    }
}
