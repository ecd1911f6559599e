/*!
 * Final render: subtitles burned into the combined footage, narration attached.
 *
 * Subtitles go through ffmpeg's `subtitles` filter (libass). SRT input is
 * laid out on libass' default 384x288 script canvas, so pixel sizes meant for
 * the 1080x1920 frame are scaled down before they reach `force_style`.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::app_config::SubtitleConfig;
use crate::errors::MediaError;
use crate::file_utils::FileManager;
use crate::media::Ffmpeg;
use crate::video_combiner::TARGET_HEIGHT;

// libass PlayResY for scripts converted from SRT
const ASS_PLAY_RES_Y: f64 = 288.0;

/// Horizontal subtitle anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Vertical subtitle anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Where subtitles sit on the frame, parsed from "horizontal,vertical"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtitlePosition {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl SubtitlePosition {
    /// ASS `Alignment` value, numpad layout (1 bottom-left ... 9 top-right)
    pub fn ass_alignment(&self) -> u8 {
        let row = match self.vertical {
            VerticalAnchor::Bottom => 0,
            VerticalAnchor::Center => 3,
            VerticalAnchor::Top => 6,
        };
        let column = match self.horizontal {
            HorizontalAnchor::Left => 1,
            HorizontalAnchor::Center => 2,
            HorizontalAnchor::Right => 3,
        };
        row + column
    }
}

impl Default for SubtitlePosition {
    fn default() -> Self {
        Self {
            horizontal: HorizontalAnchor::Center,
            vertical: VerticalAnchor::Center,
        }
    }
}

impl FromStr for SubtitlePosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = s.split(',').map(|p| p.trim().to_lowercase()).collect();
        if parts.len() != 2 {
            return Err(anyhow!("Expected \"horizontal,vertical\", got '{}'", s));
        }

        let horizontal = match parts[0].as_str() {
            "left" => HorizontalAnchor::Left,
            "center" | "middle" => HorizontalAnchor::Center,
            "right" => HorizontalAnchor::Right,
            other => return Err(anyhow!("Unknown horizontal anchor '{}'", other)),
        };
        let vertical = match parts[1].as_str() {
            "top" => VerticalAnchor::Top,
            "center" | "middle" => VerticalAnchor::Center,
            "bottom" => VerticalAnchor::Bottom,
            other => return Err(anyhow!("Unknown vertical anchor '{}'", other)),
        };

        Ok(Self { horizontal, vertical })
    }
}

impl fmt::Display for SubtitlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let horizontal = match self.horizontal {
            HorizontalAnchor::Left => "left",
            HorizontalAnchor::Center => "center",
            HorizontalAnchor::Right => "right",
        };
        let vertical = match self.vertical {
            VerticalAnchor::Top => "top",
            VerticalAnchor::Center => "center",
            VerticalAnchor::Bottom => "bottom",
        };
        write!(f, "{},{}", horizontal, vertical)
    }
}

const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("white", (255, 255, 255)),
    ("black", (0, 0, 0)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("lime", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("pink", (255, 192, 203)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
];

/// Convert a colour name or `#RRGGBB` into an ASS `&H00BBGGRR` literal
pub fn ass_color(color: &str) -> Result<String> {
    let color = color.trim().to_lowercase();

    let (r, g, b) = if let Some(hex) = color.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("Invalid hex colour '#{}'", hex));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        (channel(0)?, channel(2)?, channel(4)?)
    } else {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == color)
            .map(|(_, rgb)| *rgb)
            .ok_or_else(|| anyhow!("Unknown colour '{}'", color))?
    };

    Ok(format!("&H00{:02X}{:02X}{:02X}", b, g, r))
}

/// Escape a path for use as a filter option value inside single quotes
pub fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 8);
    for ch in normalized.chars() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("\\'"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '[' => escaped.push_str("\\["),
            ']' => escaped.push_str("\\]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Subtitle look, in output-frame pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub font_path: PathBuf,
    pub font_size: u32,
    pub text_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub position: SubtitlePosition,
}

impl RenderStyle {
    pub fn from_config(config: &SubtitleConfig) -> Result<Self> {
        let position = config
            .position
            .parse::<SubtitlePosition>()
            .context("Invalid subtitle position")?;
        ass_color(&config.text_color).context("Invalid subtitle text colour")?;
        ass_color(&config.stroke_color).context("Invalid subtitle stroke colour")?;

        Ok(Self {
            font_path: config.font_path.clone(),
            font_size: config.font_size,
            text_color: config.text_color.clone(),
            stroke_color: config.stroke_color.clone(),
            stroke_width: config.stroke_width,
            position,
        })
    }

    /// Font family name handed to libass, taken from the font file name
    pub fn font_name(&self) -> String {
        self.font_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace('_', " "))
            .unwrap_or_else(|| "Sans".to_string())
    }

    /// Comma separated `force_style` overrides
    pub fn force_style(&self) -> Result<String> {
        let scale = ASS_PLAY_RES_Y / TARGET_HEIGHT as f64;
        let font_size = (self.font_size as f64 * scale).round().max(1.0);
        let outline = self.stroke_width as f64 * scale;

        Ok(format!(
            "Fontname={},Fontsize={},Bold=1,PrimaryColour={},OutlineColour={},BorderStyle=1,Outline={:.2},Shadow=0,Alignment={},MarginL=0,MarginR=0,MarginV=0",
            self.font_name(),
            font_size,
            ass_color(&self.text_color)?,
            ass_color(&self.stroke_color)?,
            outline,
            self.position.ass_alignment()
        ))
    }

    /// Complete `subtitles` filter for `subtitles_path`
    pub fn subtitle_filter(&self, subtitles_path: &Path) -> Result<String> {
        let mut filter = format!(
            "subtitles=filename='{}':charenc=UTF-8",
            escape_filter_path(subtitles_path)
        );

        if let Some(fonts_dir) = self.font_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            filter.push_str(&format!(":fontsdir='{}'", escape_filter_path(fonts_dir)));
        }

        filter.push_str(&format!(":force_style='{}'", self.force_style()?));
        Ok(filter)
    }
}

/// Files taking part in the final render
pub struct RenderJob<'a> {
    /// Combined silent footage
    pub video_path: &'a Path,
    /// Narration track
    pub audio_path: &'a Path,
    /// Equalized SRT file
    pub subtitles_path: &'a Path,
    /// Destination file
    pub output_path: &'a Path,
    /// Encoder threads
    pub threads: usize,
}

/// ffmpeg arguments for the final render
pub fn render_args(job: &RenderJob<'_>, style: &RenderStyle) -> Result<Vec<String>> {
    Ok(vec![
        "-i".to_string(),
        job.video_path.display().to_string(),
        "-i".to_string(),
        job.audio_path.display().to_string(),
        "-vf".to_string(),
        style.subtitle_filter(job.subtitles_path)?,
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-threads".to_string(),
        job.threads.to_string(),
        "-shortest".to_string(),
        job.output_path.display().to_string(),
    ])
}

/// Burn subtitles into the footage and attach the narration
pub async fn render_video(ffmpeg: &Ffmpeg, job: &RenderJob<'_>, style: &RenderStyle) -> Result<()> {
    for input in [job.video_path, job.audio_path, job.subtitles_path] {
        if !input.exists() {
            return Err(MediaError::InvalidMedia {
                path: input.display().to_string(),
                message: "file does not exist".to_string(),
            }
            .into());
        }
    }

    if let Some(parent) = job.output_path.parent() {
        FileManager::ensure_dir(parent)?;
    }

    let args = render_args(job, style)?;
    debug!("Render filter: {}", args[5]);

    ffmpeg
        .run(&args)
        .await
        .with_context(|| format!("Failed to render {}", job.output_path.display()))?;

    info!("Rendered {}", job.output_path.display());
    Ok(())
}
