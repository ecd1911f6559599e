/*!
 * Tests for subtitle mode selection and subtitle generation
 */

use std::path::PathBuf;
use anyhow::Result;
use shortreel::errors::SubtitleError;
use shortreel::narration::AudioClip;
use shortreel::providers::Transcriber;
use shortreel::providers::mock::MockTranscriber;
use shortreel::subtitle_builder::{build_local_track, generate_subtitles, write_subtitles, SubtitleJob, SubtitleMode};
use shortreel::subtitle_processor::SubtitleCollection;
use crate::common;

fn clips(durations: &[f64]) -> Vec<AudioClip> {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| AudioClip {
            path: PathBuf::from(format!("sentence{}.mp3", i)),
            duration_secs: *d,
        })
        .collect()
}

#[test]
fn test_select_withCredential_shouldBeRemoteWithMappedLanguage() {
    let mode = SubtitleMode::select(Some("abc123"), "br");
    assert_eq!(mode, SubtitleMode::Remote { language_code: "pt".to_string() });
    assert!(mode.is_remote());
}

#[test]
fn test_select_withoutCredential_shouldBeLocal() {
    assert_eq!(SubtitleMode::select(None, "en"), SubtitleMode::Local);
    assert_eq!(SubtitleMode::select(Some("   "), "en"), SubtitleMode::Local);
}

#[test]
fn test_build_local_track_withTwoSentences_shouldAccumulateTimings() -> Result<()> {
    let sentences = vec!["Hello world".to_string(), " Bye".to_string()];
    let track = build_local_track(&sentences, &[1.5, 2.0])?;

    assert_eq!(
        track.to_srt(),
        "1\n0:00:00,0 --> 0:00:01,500\nHello world\n\n2\n0:00:01,500 --> 0:00:03,500\n Bye\n"
    );
    Ok(())
}

#[test]
fn test_build_local_track_withManyCues_shouldBeContiguous() -> Result<()> {
    let sentences: Vec<String> = (0..20).map(|i| format!("Sentence {}", i)).collect();
    let durations: Vec<f64> = (0..20).map(|i| 0.1 + i as f64 * 0.37).collect();
    let track = build_local_track(&sentences, &durations)?;

    assert_eq!(track.entries[0].start_secs, 0.0);
    for pair in track.entries.windows(2) {
        assert_eq!(pair[0].end_secs, pair[1].start_secs);
    }
    let total: f64 = durations.iter().fold(0.0, |acc, d| acc + d);
    assert_eq!(track.total_duration_secs(), total);
    Ok(())
}

#[test]
fn test_build_local_track_withLengthMismatch_shouldFail() {
    let sentences = vec!["One".to_string(), "Two".to_string()];
    let result = build_local_track(&sentences, &[1.0]);
    assert!(matches!(result, Err(SubtitleError::LengthMismatch { sentences: 2, clips: 1 })));
}

#[tokio::test]
async fn test_write_subtitles_withLocalMode_shouldWriteUnequalizedTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let subtitles_path = temp_dir.path().join("subs").join("subtitles.srt");
    let sentences = vec!["Hello world".to_string(), " Bye".to_string()];
    let clips = clips(&[1.5, 2.0]);
    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &sentences,
        clips: &clips,
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };

    write_subtitles(&SubtitleMode::Local, None, &job).await?;

    let written = std::fs::read_to_string(&subtitles_path)?;
    assert!(written.starts_with("1\n0:00:00,0 --> 0:00:01,500\nHello world\n"));
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withLocalMode_shouldEqualize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");
    let sentences = vec!["Hello world".to_string(), " Bye".to_string()];
    let clips = clips(&[1.5, 2.0]);
    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &sentences,
        clips: &clips,
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };

    generate_subtitles(&SubtitleMode::Local, None, &job).await?;

    let track = SubtitleCollection::read_from_srt(&subtitles_path)?;
    let texts: Vec<&str> = track.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", "world", "Bye"]);
    assert_eq!(track.total_duration_secs(), 3.5);
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withRemoteMode_shouldUseTranscriberOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");
    let transcriber = MockTranscriber::with_srt("1\n00:00:00,000 --> 00:00:02,000\nBom dia a todos\n");
    let sentences = vec!["Bom dia a todos".to_string()];
    let clips = clips(&[2.0]);
    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &sentences,
        clips: &clips,
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    let mode = SubtitleMode::select(Some("key"), "br");

    generate_subtitles(&mode, Some(&transcriber as &dyn Transcriber), &job).await?;

    assert_eq!(transcriber.languages(), vec!["pt"]);
    let track = SubtitleCollection::read_from_srt(&subtitles_path)?;
    let texts: Vec<&str> = track.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Bom dia a", "todos"]);
    assert_eq!(track.total_duration_secs(), 2.0);
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withFailingTranscriber_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");
    let transcriber = MockTranscriber::failing();
    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &[],
        clips: &[],
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    let mode = SubtitleMode::select(Some("key"), "en");

    let result = generate_subtitles(&mode, Some(&transcriber as &dyn Transcriber), &job).await;

    assert!(result.is_err());
    assert!(!subtitles_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withRemoteModeAndNoTranscriber_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &[],
        clips: &[],
        subtitles_path: &temp_dir.path().join("subtitles.srt"),
        max_chars: 10,
    };
    let mode = SubtitleMode::Remote { language_code: "en".to_string() };

    assert!(generate_subtitles(&mode, None, &job).await.is_err());
    Ok(())
}
