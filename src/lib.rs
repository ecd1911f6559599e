/*!
 * # shortreel - short vertical videos from a text script
 *
 * A Rust library that turns a period-separated script into a narrated,
 * subtitled 1080x1920 video.
 *
 * ## Features
 *
 * - Sentence-by-sentence speech synthesis (ElevenLabs)
 * - Subtitles either transcribed remotely (AssemblyAI) or timed locally
 *   from the length of each spoken sentence
 * - Subtitle equalization into short, readable chunks
 * - Stock footage looped, trimmed and center-cropped to 9:16 at 30 fps
 * - Subtitles burned in with a configurable font, colour and anchor
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: Script loading and sentence splitting
 * - `providers`: Clients for external speech services:
 *   - `providers::elevenlabs`: Text-to-speech
 *   - `providers::assemblyai`: Transcription with SRT export
 * - `narration`: Per-sentence audio clips and the joined narration track
 * - `subtitle_processor`: SRT model, formatting and parsing
 * - `subtitle_builder`: Remote or local subtitle generation
 * - `equalizer`: Splitting cues into short chunks
 * - `media`: ffmpeg and ffprobe invocation
 * - `video_combiner`: Background footage assembly
 * - `video_renderer`: Subtitle burn-in and audio attachment
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod equalizer;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod narration;
pub mod providers;
pub mod script;
pub mod subtitle_builder;
pub mod subtitle_processor;
pub mod video_combiner;
pub mod video_renderer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use subtitle_builder::SubtitleMode;
pub use video_renderer::SubtitlePosition;
pub use errors::{AppError, ConfigError, MediaError, ProviderError, SubtitleError};
