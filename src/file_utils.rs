use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// Common video file extensions supported by ffmpeg
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files matching any of `extensions` under a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && has_extension(path, extensions) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Resolve the stock clip pool.
    ///
    /// An explicit list wins and must point at existing files. Otherwise the
    /// directory is scanned for video files.
    pub fn collect_video_pool<P: AsRef<Path>>(video_dir: P, explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if !explicit.is_empty() {
            for path in explicit {
                if !Self::file_exists(path) {
                    return Err(anyhow!("Video clip does not exist: {:?}", path));
                }
            }
            return Ok(explicit.to_vec());
        }

        let video_dir = video_dir.as_ref();
        if !Self::dir_exists(video_dir) {
            return Err(anyhow!("Video directory does not exist: {:?}", video_dir));
        }

        let pool = Self::find_files(video_dir, VIDEO_EXTENSIONS)?;
        if pool.is_empty() {
            return Err(anyhow!("No video files found in {:?}", video_dir));
        }
        Ok(pool)
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| ext.eq_ignore_ascii_case(e.trim_start_matches('.')))
        })
        .unwrap_or(false)
}
