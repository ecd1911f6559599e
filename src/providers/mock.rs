/*!
 * Mock provider implementations for testing.
 *
 * These simulate the external speech services without network access:
 * - `MockSynthesizer::working()` - Returns a small fake audio payload per call
 * - `MockSynthesizer::failing()` - Always fails with an error
 * - `MockTranscriber::with_srt(..)` - Returns a fixed SRT document
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{SpeechSynthesizer, Transcriber};

/// Behavior mode for the mock providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails on the Nth request (1-based), succeeds otherwise
    FailOn { request: usize },
    /// Always fails with an error
    Failing,
}

/// Mock text-to-speech engine
#[derive(Debug)]
pub struct MockSynthesizer {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of synthesize calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.to_string());
        }

        match self.behavior {
            MockBehavior::Working => Ok(Bytes::from(format!("MOCKAUDIO:{}", text))),
            MockBehavior::FailOn { request } if request == count => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure on request {}", count),
            }),
            MockBehavior::FailOn { .. } => Ok(Bytes::from(format!("MOCKAUDIO:{}", text))),
            MockBehavior::Failing => Err(ProviderError::AuthenticationError("Simulated invalid API key".to_string())),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}

/// Mock transcription service
#[derive(Debug)]
pub struct MockTranscriber {
    srt: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriber {
    /// A transcriber that answers every request with `srt`
    pub fn with_srt(srt: impl Into<String>) -> Self {
        Self {
            srt: Some(srt.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A transcriber whose jobs always end in an error status
    pub fn failing() -> Self {
        Self {
            srt: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Language codes received, in call order
    pub fn languages(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe_srt(&self, _audio_path: &Path, language_code: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(language_code.to_string());
        }

        self.srt
            .clone()
            .ok_or_else(|| ProviderError::TranscriptionFailed("Simulated transcription error".to_string()))
    }
}
