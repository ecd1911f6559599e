/*!
 * Provider implementations for the external speech services.
 *
 * This module contains client implementations for:
 * - ElevenLabs: text-to-speech, one audio file per sentence
 * - AssemblyAI: transcription of the narration into SRT subtitles
 * - Mock: in-process stand-ins used by tests and dry runs
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ProviderError;

/// Common trait for text-to-speech engines
///
/// Implementations turn one piece of text into one encoded audio clip, so the
/// pipeline can measure each sentence's duration separately.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` into encoded audio
    ///
    /// # Arguments
    /// * `text` - The sentence to speak
    ///
    /// # Returns
    /// * `Result<Bytes, ProviderError>` - Audio in the provider's output format
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError>;

    /// File extension matching the audio format returned by `synthesize`
    fn file_extension(&self) -> &str {
        "mp3"
    }

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Common trait for transcription services that return SRT text
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe an audio file into SRT subtitles
    ///
    /// # Arguments
    /// * `audio_path` - The full narration track
    /// * `language_code` - A language code the service accepts
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - SRT document text
    async fn transcribe_srt(&self, audio_path: &Path, language_code: &str) -> Result<String, ProviderError>;
}

pub mod elevenlabs;
pub mod assemblyai;
pub mod mock;
