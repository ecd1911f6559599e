/*!
 * End-to-end subtitle generation: script to equalized SRT file
 */

use anyhow::Result;
use shortreel::narration::Narrator;
use shortreel::providers::Transcriber;
use shortreel::providers::mock::{MockSynthesizer, MockTranscriber};
use shortreel::script;
use shortreel::subtitle_builder::{generate_subtitles, SubtitleJob, SubtitleMode};
use shortreel::subtitle_processor::SubtitleCollection;
use crate::common::{self, FixedProbe};

#[tokio::test]
async fn test_localWorkflow_fromScript_shouldWriteEqualizedContiguousTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(
        temp_dir.path(),
        "script.txt",
        "Hello world. This is a longer sentence.",
    )?;
    let audio_dir = temp_dir.path().join("audio");
    let subtitles_path = temp_dir.path().join("subtitles.srt");

    let sentences = script::load_sentences(&script_path, true)?;
    assert_eq!(sentences.len(), 2);

    let synthesizer = MockSynthesizer::working();
    let probe = FixedProbe::new(2.0);
    let clips = Narrator::new(&synthesizer, &probe)
        .synthesize_all(&sentences, &audio_dir)
        .await?;

    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &sentences,
        clips: &clips,
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    generate_subtitles(&SubtitleMode::Local, None, &job).await?;

    let track = SubtitleCollection::read_from_srt(&subtitles_path)?;
    let texts: Vec<&str> = track.entries.iter().map(|e| e.text.trim()).collect();
    assert_eq!(texts, vec!["Hello", "world", "This is a", "longer", "sentence"]);

    assert_eq!(track.entries[0].start_secs, 0.0);
    assert!((track.entries[1].end_secs - 2.0).abs() < 1e-3);
    assert!((track.entries[4].end_secs - 4.0).abs() < 1e-3);
    for pair in track.entries.windows(2) {
        assert!((pair[0].end_secs - pair[1].start_secs).abs() < 1e-3);
    }
    for (i, entry) in track.entries.iter().enumerate() {
        assert_eq!(entry.seq_num, i + 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_localWorkflow_withOneSentencePerLine_shouldEqualizeCleanly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(
        temp_dir.path(),
        "script.txt",
        "Hello world.\nThis is a test.\n",
    )?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");

    let sentences = script::load_sentences(&script_path, true)?;
    assert_eq!(sentences, vec!["Hello world", "\nThis is a test"]);

    let synthesizer = MockSynthesizer::working();
    let probe = FixedProbe::new(1.0);
    let clips = Narrator::new(&synthesizer, &probe)
        .synthesize_all(&sentences, &temp_dir.path().join("audio"))
        .await?;

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
    assert_eq!(texts, vec!["Hello", "world", "This is a", "test"]);
    assert!((track.total_duration_secs() - 2.0).abs() < 1e-3);
    Ok(())
}

#[tokio::test]
async fn test_localWorkflow_withTrailingPeriodKept_shouldFailOnClipMismatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(temp_dir.path(), "script.txt", "One. Two.")?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");

    // Raw segments include the empty tail; synthesis only ran for spoken ones
    let raw = script::load_sentences(&script_path, false)?;
    let spoken = script::spoken_sentences(raw.clone());
    let synthesizer = MockSynthesizer::working();
    let probe = FixedProbe::new(1.0);
    let clips = Narrator::new(&synthesizer, &probe)
        .synthesize_all(&spoken, &temp_dir.path().join("audio"))
        .await?;

    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &raw,
        clips: &clips,
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    let result = generate_subtitles(&SubtitleMode::Local, None, &job).await;

    assert!(result.is_err());
    assert!(!subtitles_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_remoteWorkflow_withTranscript_shouldEqualizeServiceOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = common::create_test_file(temp_dir.path(), "narration.mp3", "MOCKAUDIO")?;
    let subtitles_path = temp_dir.path().join("out").join("subtitles.srt");
    let transcriber = MockTranscriber::with_srt("1\n00:00:00,000 --> 00:00:03,000\nBonjour tout le monde\n");
    let sentences = vec!["Bonjour tout le monde".to_string()];

    let job = SubtitleJob {
        audio_path: &audio_path,
        sentences: &sentences,
        clips: &[],
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    let mode = SubtitleMode::select(Some("secret"), "fr");
    generate_subtitles(&mode, Some(&transcriber as &dyn Transcriber), &job).await?;

    assert_eq!(transcriber.languages(), vec!["fr"]);
    let track = SubtitleCollection::read_from_srt(&subtitles_path)?;
    let texts: Vec<&str> = track.entries.iter().map(|e| e.text.trim()).collect();
    assert_eq!(texts, vec!["Bonjour", "tout le", "monde"]);
    assert_eq!(track.entries[2].end_secs, 3.0);
    Ok(())
}

#[tokio::test]
async fn test_remoteWorkflow_withFailedTranscript_shouldNotWriteFile() -> Result<()> {
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
    let mode = SubtitleMode::Remote { language_code: "en".to_string() };
    let result = generate_subtitles(&mode, Some(&transcriber as &dyn Transcriber), &job).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.starts_with("subtitles stage failed"), "unexpected error: {}", message);
    assert!(message.contains("Transcription request failed"));
    assert!(!subtitles_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_remoteWorkflow_withMalformedTranscript_shouldFailAtEqualizationStage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let subtitles_path = temp_dir.path().join("subtitles.srt");
    let transcriber = MockTranscriber::with_srt("this is not srt at all");

    let job = SubtitleJob {
        audio_path: &temp_dir.path().join("narration.mp3"),
        sentences: &[],
        clips: &[],
        subtitles_path: &subtitles_path,
        max_chars: 10,
    };
    let mode = SubtitleMode::Remote { language_code: "en".to_string() };
    let result = generate_subtitles(&mode, Some(&transcriber as &dyn Transcriber), &job).await;

    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("subtitle equalization stage failed"), "unexpected error: {}", message);
    Ok(())
}
