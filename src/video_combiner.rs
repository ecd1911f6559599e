use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use tempfile::TempDir;
use uuid::Uuid;

use crate::app_controller::progress_bar;
use crate::errors::MediaError;
use crate::file_utils::FileManager;
use crate::media::{Ffmpeg, MediaProbe};

// @module: Background footage assembly from the stock clip pool

/// Output frame width
pub const TARGET_WIDTH: u32 = 1080;
/// Output frame height
pub const TARGET_HEIGHT: u32 = 1920;
/// Output frame rate
pub const TARGET_FPS: u32 = 30;
/// Width over height of a 9:16 frame
pub const TARGET_ASPECT: f64 = 9.0 / 16.0;

// Remaining budget below this counts as filled
const MIN_SEGMENT_SECS: f64 = 1e-3;

/// Centered crop window inside a source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    /// Largest centered 9:16 window of a `width` x `height` frame.
    ///
    /// Sources narrower than 9:16 lose height, everything else loses width.
    /// Sizes are rounded down to even numbers for yuv420p. Frames smaller
    /// than 2x2 have no such window.
    pub fn center_9x16(width: u32, height: u32) -> Option<Self> {
        if width < 2 || height < 2 {
            return None;
        }

        let ratio = (width as f64 / height as f64 * 10_000.0).round() / 10_000.0;

        let (crop_w, crop_h) = if ratio < TARGET_ASPECT {
            (width, (width as f64 / TARGET_ASPECT).round() as u32)
        } else {
            ((TARGET_ASPECT * height as f64).round() as u32, height)
        };

        let crop_w = even(crop_w.min(width));
        let crop_h = even(crop_h.min(height));

        Some(CropRect {
            width: crop_w,
            height: crop_h,
            x: (width - crop_w) / 2,
            y: (height - crop_h) / 2,
        })
    }

    /// ffmpeg `crop` filter expression
    pub fn filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

fn even(value: u32) -> u32 {
    (value - value % 2).max(2)
}

/// One trimmed piece of a pool clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSegment {
    /// Source clip
    pub source: PathBuf,
    /// Seconds taken from the start of the source
    pub trim_secs: f64,
}

/// Decide which clips to use and how much of each.
///
/// The pool is walked in order, repeatedly, each clip contributing
/// `min(remaining, target / pool size, cap, clip duration)` until the target
/// is filled. The even share means every clip appears before any repeats.
/// The last segment is cut to land on the target exactly.
pub fn plan_segments(pool: &[(PathBuf, f64)], target_secs: f64, max_clip_secs: f64) -> Result<Vec<ClipSegment>, MediaError> {
    if pool.is_empty() {
        return Err(MediaError::EmptyPool);
    }

    let share = target_secs / pool.len() as f64;

    let mut segments = Vec::new();
    let mut accumulated = 0.0_f64;

    while target_secs - accumulated > MIN_SEGMENT_SECS {
        let before = accumulated;

        for (source, duration) in pool {
            let remaining = target_secs - accumulated;
            if remaining <= MIN_SEGMENT_SECS {
                break;
            }

            let trim = remaining.min(share).min(max_clip_secs).min(*duration);
            if !(trim > MIN_SEGMENT_SECS) {
                continue;
            }

            segments.push(ClipSegment {
                source: source.clone(),
                trim_secs: trim,
            });
            accumulated += trim;
        }

        // A full pass that adds nothing would loop forever
        if accumulated <= before {
            return Err(MediaError::EmptyPool);
        }
    }

    Ok(segments)
}

/// ffmpeg arguments that turn one segment into a normalized silent clip
pub fn segment_args(segment: &ClipSegment, crop: CropRect, threads: usize, output: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        segment.source.display().to_string(),
        "-an".to_string(),
        "-t".to_string(),
        format!("{:.3}", segment.trim_secs),
        "-vf".to_string(),
        format!(
            "fps={},{},scale={}:{},setsar=1",
            TARGET_FPS,
            crop.filter(),
            TARGET_WIDTH,
            TARGET_HEIGHT
        ),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-threads".to_string(),
        threads.to_string(),
        output.display().to_string(),
    ]
}

/// Inputs of a combination pass
pub struct CombineRequest<'a> {
    /// Stock clips, in the order they should appear
    pub video_paths: &'a [PathBuf],
    /// Length of the finished background
    pub target_secs: f64,
    /// Longest stretch taken from one clip
    pub max_clip_secs: f64,
    /// Encoder threads
    pub threads: usize,
    /// Where the combined file and scratch segments go
    pub temp_dir: &'a Path,
}

/// Build a silent 1080x1920, 30 fps video of `target_secs` from the pool.
///
/// Returns the path of a freshly named file under `temp_dir`. Intermediate
/// segments are deleted before returning.
pub async fn combine_videos(ffmpeg: &Ffmpeg, probe: &dyn MediaProbe, request: &CombineRequest<'_>) -> Result<PathBuf> {
    if request.video_paths.is_empty() {
        return Err(anyhow!(MediaError::EmptyPool));
    }

    FileManager::ensure_dir(request.temp_dir)?;

    let mut pool = Vec::with_capacity(request.video_paths.len());
    let mut geometry = Vec::with_capacity(request.video_paths.len());
    for path in request.video_paths {
        let info = probe
            .probe(path)
            .await
            .with_context(|| format!("Failed to probe clip: {}", path.display()))?;
        let (width, height) = info.dimensions().ok_or_else(|| MediaError::InvalidMedia {
            path: path.display().to_string(),
            message: "no video stream".to_string(),
        })?;
        let crop = CropRect::center_9x16(width, height).ok_or_else(|| MediaError::InvalidMedia {
            path: path.display().to_string(),
            message: format!("frame {}x{} is too small to crop", width, height),
        })?;
        pool.push((path.clone(), info.duration_secs));
        geometry.push((path.clone(), crop));
    }

    let segments = plan_segments(&pool, request.target_secs, request.max_clip_secs)?;
    info!(
        "Combining {} segments from {} clips into {:.2}s of footage",
        segments.len(),
        pool.len(),
        request.target_secs
    );

    let scratch = TempDir::new_in(request.temp_dir)
        .with_context(|| format!("Failed to create scratch directory in {}", request.temp_dir.display()))?;

    let progress = progress_bar(segments.len() as u64, "clips");
    let mut processed = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        let crop = geometry
            .iter()
            .find(|(path, _)| *path == segment.source)
            .map(|(_, crop)| *crop)
            .ok_or_else(|| anyhow!("No geometry for {}", segment.source.display()))?;

        let output = scratch.path().join(format!("segment_{:04}.mp4", index));
        debug!(
            "Segment {}: {} for {:.3}s, {}",
            index + 1,
            segment.source.display(),
            segment.trim_secs,
            crop.filter()
        );
        ffmpeg
            .run(&segment_args(segment, crop, request.threads, &output))
            .await
            .with_context(|| format!("Failed to process clip: {}", segment.source.display()))?;

        processed.push(output);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let combined = request.temp_dir.join(format!("{}.mp4", Uuid::new_v4()));
    ffmpeg
        .concat(&processed, &combined, true)
        .await
        .with_context(|| format!("Failed to concatenate clips into {}", combined.display()))?;

    info!("Combined video written to {}", combined.display());
    Ok(combined)
}
