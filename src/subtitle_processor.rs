use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Context, Result};
use log::warn;

use crate::errors::SubtitleError;

// @module: SRT subtitle model, formatting and parsing

// @const: SRT timing line, tolerant of unpadded hours and short fractions
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+:\d{2}:\d{2}(?:[,.]\d{1,3})?)\s*-->\s*(\d+:\d{2}:\d{2}(?:[,.]\d{1,3})?)")
        .expect("timing line regex is valid")
});

// @const: Single SRT timestamp
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})(?:[,.](\d{1,3}))?$").expect("timestamp regex is valid")
});

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number, 1-based
    pub seq_num: usize,

    // @field: Start offset in seconds
    pub start_secs: f64,

    // @field: End offset in seconds
    pub end_secs: f64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_secs: f64, end_secs: f64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_secs,
            end_secs,
            text: text.into(),
        }
    }

    /// Length of the cue in seconds
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_secs)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_secs)
    }

    /// Format a seconds offset as `H:MM:SS,mmm`.
    ///
    /// Hours are not zero-padded and milliseconds are rounded to the nearest
    /// value. Zero is written as the literal `0:00:00,0`.
    pub fn format_timestamp(secs: f64) -> String {
        let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
        if total_ms == 0 {
            return "0:00:00,0".to_string();
        }

        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1_000;
        let millis = total_ms % 1_000;

        format!("{}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SRT timestamp into seconds.
    ///
    /// The fractional part is a decimal fraction, so `,5` is half a second and
    /// `,0` is zero; a missing fraction is allowed.
    pub fn parse_timestamp(timestamp: &str) -> Result<f64, SubtitleError> {
        let caps = TIMESTAMP_REGEX
            .captures(timestamp.trim())
            .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;

        let field = |idx: usize| -> Result<u64, SubtitleError> {
            caps.get(idx)
                .map_or(Ok(0), |m| m.as_str().parse::<u64>())
                .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))
        };

        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        if minutes >= 60 || seconds >= 60 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        let millis = match caps.get(4) {
            Some(fraction) => {
                let digits = fraction.as_str();
                let value: u64 = digits
                    .parse()
                    .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
                value * 10u64.pow(3 - digits.len() as u32)
            }
            None => 0,
        };

        let total_ms = hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
        Ok(total_ms as f64 / 1000.0)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        // A blank line would end the cue early
        for line in self.text.lines().filter(|line| !line.trim().is_empty()) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Ordered subtitle track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleCollection {
    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a track from entries already in display order
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the last cue, zero for an empty track
    pub fn total_duration_secs(&self) -> f64 {
        self.entries.last().map_or(0.0, |entry| entry.end_secs)
    }

    /// Serialize to SRT: cues separated by a single blank line
    pub fn to_srt(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_srt_text(path, &self.to_srt())
    }

    /// Read and parse an SRT file
    pub fn read_from_srt<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let collection = Self::parse_srt_string(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
        Ok(collection)
    }

    /// Parse SRT format string into a subtitle track
    pub fn parse_srt_string(content: &str) -> Result<Self, SubtitleError> {
        let mut entries = Vec::new();

        // State variables for parsing
        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(f64, f64)> = None;
        let mut current_text = String::new();

        let content = content.trim_start_matches('\u{feff}');
        for (line_idx, line) in content.lines().enumerate() {
            let line_number = line_idx + 1;
            let trimmed = line.trim();

            // A blank line closes the current cue
            if trimmed.is_empty() {
                if let (Some(seq_num), Some((start, end))) = (current_seq_num, current_times) {
                    entries.push(SubtitleEntry::new(seq_num, start, end, current_text.trim_end()));
                    current_seq_num = None;
                    current_times = None;
                    current_text.clear();
                }
                continue;
            }

            if current_seq_num.is_none() {
                let seq_num = trimmed.parse::<usize>().map_err(|_| {
                    SubtitleError::Format(format!(
                        "expected cue number at line {}, found '{}'",
                        line_number, trimmed
                    ))
                })?;
                current_seq_num = Some(seq_num);
                continue;
            }

            if current_times.is_none() {
                let caps = TIMING_LINE_REGEX.captures(trimmed).ok_or_else(|| {
                    SubtitleError::Format(format!(
                        "expected timing line at line {}, found '{}'",
                        line_number, trimmed
                    ))
                })?;
                let start = SubtitleEntry::parse_timestamp(&caps[1])?;
                let end = SubtitleEntry::parse_timestamp(&caps[2])?;
                if end < start {
                    return Err(SubtitleError::Format(format!(
                        "cue ends before it starts at line {}",
                        line_number
                    )));
                }
                current_times = Some((start, end));
                continue;
            }

            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        }

        match (current_seq_num, current_times) {
            (Some(seq_num), Some((start, end))) => {
                entries.push(SubtitleEntry::new(seq_num, start, end, current_text.trim_end()));
            }
            (Some(seq_num), None) => {
                return Err(SubtitleError::Format(format!(
                    "cue {} has no timing line",
                    seq_num
                )));
            }
            _ => {}
        }

        let overlap_count = entries
            .windows(2)
            .filter(|pair| pair[0].end_secs > pair[1].start_secs)
            .count();
        if overlap_count > 0 {
            warn!("Found {} overlapping subtitle entries", overlap_count);
        }

        Ok(SubtitleCollection { entries })
    }

    /// Renumber entries sequentially from 1
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_srt())
    }
}

/// Write raw SRT text, creating the parent directory if needed
pub fn write_srt_text<P: AsRef<Path>>(path: P, srt: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, srt)
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
    Ok(())
}
