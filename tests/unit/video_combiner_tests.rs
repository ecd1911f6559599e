/*!
 * Tests for clip planning and 9:16 crop geometry
 */

use std::path::{Path, PathBuf};
use anyhow::Result;
use shortreel::errors::MediaError;
use shortreel::media::Ffmpeg;
use shortreel::video_combiner::{
    combine_videos, plan_segments, segment_args, ClipSegment, CombineRequest, CropRect,
};
use crate::common::{self, FixedProbe};

fn pool(entries: &[(&str, f64)]) -> Vec<(PathBuf, f64)> {
    entries.iter().map(|(name, d)| (PathBuf::from(name), *d)).collect()
}

fn trims(segments: &[ClipSegment]) -> Vec<(String, f64)> {
    segments
        .iter()
        .map(|s| (s.source.display().to_string(), s.trim_secs))
        .collect()
}

#[test]
fn test_center_9x16_withLandscapeSource_shouldCropWidth() {
    let crop = CropRect::center_9x16(1920, 1080).unwrap();
    assert_eq!(crop, CropRect { width: 608, height: 1080, x: 656, y: 0 });
    assert_eq!(crop.filter(), "crop=608:1080:656:0");
}

#[test]
fn test_center_9x16_withExactRatio_shouldKeepFrame() {
    assert_eq!(CropRect::center_9x16(720, 1280), Some(CropRect { width: 720, height: 1280, x: 0, y: 0 }));
    assert_eq!(CropRect::center_9x16(1080, 1920), Some(CropRect { width: 1080, height: 1920, x: 0, y: 0 }));
}

#[test]
fn test_center_9x16_withTallSource_shouldCropHeight() {
    assert_eq!(CropRect::center_9x16(1080, 2400), Some(CropRect { width: 1080, height: 1920, x: 0, y: 240 }));
}

#[test]
fn test_center_9x16_withDegenerateFrame_shouldHaveNoWindow() {
    assert_eq!(CropRect::center_9x16(1, 100), None);
    assert_eq!(CropRect::center_9x16(100, 0), None);
    assert_eq!(CropRect::center_9x16(0, 0), None);
}

#[test]
fn test_center_9x16_withTinyFrames_shouldStayInsideSource() {
    for (width, height) in [(2, 2), (2, 100), (100, 2), (3, 3), (5, 7), (641, 3)] {
        let crop = CropRect::center_9x16(width, height).unwrap();
        assert!(crop.width <= width && crop.height <= height, "{}x{} gave {:?}", width, height, crop);
        assert!(crop.x + crop.width <= width && crop.y + crop.height <= height);
        assert_eq!(crop.width % 2, 0);
        assert_eq!(crop.height % 2, 0);
    }
}

#[test]
fn test_center_9x16_withSquareSource_shouldUseEvenWidth() {
    let crop = CropRect::center_9x16(1000, 1000).unwrap();
    assert_eq!(crop.width % 2, 0);
    assert_eq!(crop, CropRect { width: 562, height: 1000, x: 219, y: 0 });
}

#[test]
fn test_plan_segments_withShortClips_shouldLoopPoolInOrder() -> Result<()> {
    let segments = plan_segments(&pool(&[("a.mp4", 3.0), ("b.mp4", 10.0)]), 12.0, 5.0)?;

    assert_eq!(
        trims(&segments),
        vec![
            ("a.mp4".to_string(), 3.0),
            ("b.mp4".to_string(), 5.0),
            ("a.mp4".to_string(), 3.0),
            ("b.mp4".to_string(), 1.0),
        ]
    );
    Ok(())
}

#[test]
fn test_plan_segments_withSingleClip_shouldRepeatAndTrimLast() -> Result<()> {
    let segments = plan_segments(&pool(&[("only.mp4", 2.0)]), 4.5, 5.0)?;
    let lengths: Vec<f64> = segments.iter().map(|s| s.trim_secs).collect();
    assert_eq!(lengths, vec![2.0, 2.0, 0.5]);
    Ok(())
}

#[test]
fn test_plan_segments_withFractionalTarget_shouldLandOnTarget() -> Result<()> {
    let segments = plan_segments(&pool(&[("a.mp4", 1.1), ("b.mp4", 0.7)]), 7.3, 5.0)?;
    let total: f64 = segments.iter().map(|s| s.trim_secs).sum();

    assert!((total - 7.3).abs() < 1e-3, "total was {}", total);
    assert!(segments.iter().all(|s| s.trim_secs > 0.0 && s.trim_secs <= 1.1));
    Ok(())
}

#[test]
fn test_plan_segments_withLongClip_shouldRespectCap() -> Result<()> {
    let segments = plan_segments(&pool(&[("long.mp4", 60.0)]), 12.0, 5.0)?;
    let lengths: Vec<f64> = segments.iter().map(|s| s.trim_secs).collect();
    assert_eq!(lengths, vec![5.0, 5.0, 2.0]);
    Ok(())
}

#[test]
fn test_plan_segments_withLongNarration_shouldShareTargetAcrossPool() -> Result<()> {
    let segments = plan_segments(
        &pool(&[("a.mp4", 10.0), ("b.mp4", 10.0), ("c.mp4", 10.0), ("d.mp4", 10.0)]),
        8.0,
        5.0,
    )?;

    assert_eq!(
        trims(&segments),
        vec![
            ("a.mp4".to_string(), 2.0),
            ("b.mp4".to_string(), 2.0),
            ("c.mp4".to_string(), 2.0),
            ("d.mp4".to_string(), 2.0),
        ]
    );
    Ok(())
}

#[test]
fn test_plan_segments_withShortClipsAndShare_shouldUseEveryClipBeforeRepeating() -> Result<()> {
    let segments = plan_segments(&pool(&[("a.mp4", 1.0), ("b.mp4", 4.0), ("c.mp4", 4.0)]), 9.0, 5.0)?;
    let names: Vec<String> = trims(&segments).into_iter().map(|(name, _)| name).collect();

    assert_eq!(&names[..3], &["a.mp4", "b.mp4", "c.mp4"]);
    assert_eq!(segments[1].trim_secs, 3.0);
    let total: f64 = segments.iter().map(|s| s.trim_secs).sum();
    assert!((total - 9.0).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_plan_segments_withZeroTarget_shouldPlanNothing() -> Result<()> {
    assert!(plan_segments(&pool(&[("a.mp4", 3.0)]), 0.0, 5.0)?.is_empty());
    Ok(())
}

#[test]
fn test_plan_segments_withEmptyPool_shouldFail() {
    assert!(matches!(plan_segments(&[], 10.0, 5.0), Err(MediaError::EmptyPool)));
}

#[test]
fn test_plan_segments_withZeroLengthClips_shouldFailInsteadOfLooping() {
    let result = plan_segments(&pool(&[("a.mp4", 0.0), ("b.mp4", 0.0)]), 10.0, 5.0);
    assert!(matches!(result, Err(MediaError::EmptyPool)));
}

#[test]
fn test_segment_args_shouldNormalizeFrameRateCropAndSize() {
    let segment = ClipSegment {
        source: PathBuf::from("in.mp4"),
        trim_secs: 2.5,
    };
    let crop = CropRect { width: 608, height: 1080, x: 656, y: 0 };
    let args = segment_args(&segment, crop, 4, Path::new("out.mp4"));

    let joined = args.join(" ");
    assert!(joined.starts_with("-i in.mp4 -an -t 2.500 -vf "));
    assert!(joined.contains("fps=30,crop=608:1080:656:0,scale=1080:1920,setsar=1"));
    assert!(joined.contains("-threads 4"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[tokio::test]
async fn test_combine_videos_withEmptyPool_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let probe = FixedProbe::new(5.0).with_dimensions(1920, 1080);
    let request = CombineRequest {
        video_paths: &[],
        target_secs: 10.0,
        max_clip_secs: 5.0,
        threads: 2,
        temp_dir: temp_dir.path(),
    };

    let result = combine_videos(&Ffmpeg::default(), &probe, &request).await;
    assert!(result.is_err());
    assert!(probe.probed().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_combine_videos_withAudioOnlyClip_shouldFailBeforeEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let probe = FixedProbe::new(5.0);
    let clips = vec![temp_dir.path().join("sound.mp4")];
    let request = CombineRequest {
        video_paths: &clips,
        target_secs: 10.0,
        max_clip_secs: 5.0,
        threads: 2,
        temp_dir: temp_dir.path(),
    };

    let result = combine_videos(&Ffmpeg::default(), &probe, &request).await;
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("no video stream"));
    Ok(())
}

#[tokio::test]
async fn test_combine_videos_withOnePixelWideClip_shouldFailBeforeEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let probe = FixedProbe::new(5.0).with_dimensions(1, 100);
    let clips = vec![temp_dir.path().join("sliver.mp4")];
    let request = CombineRequest {
        video_paths: &clips,
        target_secs: 10.0,
        max_clip_secs: 5.0,
        threads: 2,
        temp_dir: temp_dir.path(),
    };

    let result = combine_videos(&Ffmpeg::default(), &probe, &request).await;
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("too small to crop"), "unexpected error: {}", message);
    Ok(())
}
