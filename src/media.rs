use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use serde_json::Value;
use tokio::process::Command;

use crate::app_config::VideoConfig;
use crate::errors::MediaError;

// @module: ffmpeg and ffprobe invocation

/// Stream and container facts reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration_secs: f64,
    /// Width of the first video stream, if any
    pub width: Option<u32>,
    /// Height of the first video stream, if any
    pub height: Option<u32>,
    /// Frame rate of the first video stream, if any
    pub fps: Option<f64>,
}

impl MediaInfo {
    /// Width and height, when the file has a video stream
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// Anything that can report the duration and geometry of a media file
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError>;
}

/// Thin async wrapper over the ffmpeg and ffprobe binaries
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::from_config(&VideoConfig::default())
    }
}

impl Ffmpeg {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: Duration::from_secs(config.ffmpeg_timeout_secs),
        }
    }

    /// Run ffmpeg with the given arguments, overwriting outputs
    pub async fn run(&self, args: &[String]) -> Result<(), MediaError> {
        let mut full_args = vec!["-y".to_string(), "-hide_banner".to_string()];
        full_args.extend_from_slice(args);
        debug!("{} {}", self.ffmpeg_path, full_args.join(" "));

        let output = self.execute(&self.ffmpeg_path, &full_args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("ffmpeg failed: {}", filtered);
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                message: filtered,
            });
        }
        Ok(())
    }

    /// Join media files with the concat demuxer.
    ///
    /// With `copy_streams` the inputs must share codecs and parameters.
    pub async fn concat(&self, inputs: &[PathBuf], output: &Path, copy_streams: bool) -> Result<(), MediaError> {
        if inputs.is_empty() {
            return Err(MediaError::InvalidMedia {
                path: output.display().to_string(),
                message: "nothing to concatenate".to_string(),
            });
        }

        let list_file = tempfile::Builder::new()
            .prefix("concat")
            .suffix(".txt")
            .tempfile()?;
        // The demuxer resolves relative entries against the list file's directory
        let absolute = inputs
            .iter()
            .map(std::path::absolute)
            .collect::<Result<Vec<_>, _>>()?;
        std::fs::write(list_file.path(), concat_list(&absolute))?;

        let mut args = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_file.path().display().to_string(),
        ];
        if copy_streams {
            args.extend(["-c".to_string(), "copy".to_string()]);
        }
        args.push(output.display().to_string());

        self.run(&args).await
    }

    async fn execute(&self, program: &str, args: &[String]) -> Result<std::process::Output, MediaError> {
        let future = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        tokio::select! {
            result = future => {
                result.map_err(|e| MediaError::Spawn {
                    tool: program.to_string(),
                    message: e.to_string(),
                })
            },
            _ = tokio::time::sleep(self.timeout) => {
                Err(MediaError::Timeout {
                    tool: program.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[async_trait]
impl MediaProbe for Ffmpeg {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        if !path.exists() {
            return Err(MediaError::InvalidMedia {
                path: path.display().to_string(),
                message: "file does not exist".to_string(),
            });
        }

        let args = [
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(path.display().to_string()))
        .collect::<Vec<_>>();

        let output = self.execute(&self.ffprobe_path, &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed: {}", stderr);
            return Err(MediaError::ToolFailed {
                tool: "ffprobe".to_string(),
                message: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_probe_output(&stdout).map_err(|message| MediaError::InvalidMedia {
            path: path.display().to_string(),
            message,
        })
    }
}

/// Extract duration and first video stream geometry from ffprobe JSON
pub fn parse_probe_output(json: &str) -> Result<MediaInfo, String> {
    let json: Value = serde_json::from_str(json)
        .map_err(|e| format!("unreadable ffprobe output: {}", e))?;

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();

    let video = streams
        .iter()
        .find(|stream| stream.get("codec_type").and_then(|v| v.as_str()) == Some("video"));

    let stream_duration = streams
        .iter()
        .filter_map(|stream| stream.get("duration").and_then(|v| v.as_str()))
        .filter_map(|d| d.parse::<f64>().ok())
        .fold(None, |max: Option<f64>, d| Some(max.map_or(d, |m| m.max(d))));

    let duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .or(stream_duration)
        .ok_or_else(|| "no duration reported".to_string())?;

    let dimension = |key: &str| {
        video
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
    };

    let fps = video
        .and_then(|v| v.get("avg_frame_rate").or_else(|| v.get("r_frame_rate")))
        .and_then(|v| v.as_str())
        .and_then(parse_frame_rate);

    Ok(MediaInfo {
        duration_secs,
        width: dimension("width"),
        height: dimension("height"),
        fps,
    })
}

/// Parse an ffprobe rational frame rate such as "30000/1001"
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 || num == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => rate.trim().parse().ok().filter(|r: &f64| *r > 0.0),
    }
}

/// Build a concat demuxer list, quoting each path
pub fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| {
            let escaped = path.display().to_string().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "frame=",
        "size=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
