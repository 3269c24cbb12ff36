use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

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

    /// Directory holding everything produced for one post
    pub fn post_dir<P: AsRef<Path>>(output_dir: P, post_id: &str) -> PathBuf {
        output_dir.as_ref().join(post_id)
    }

    /// Title as it may appear inside a file name.
    ///
    /// Double quotes are dropped, path separators and other characters that
    /// are invalid on common file systems become spaces.
    pub fn sanitize_title_for_file(title: &str) -> String {
        let cleaned: String = title
            .chars()
            .filter(|c| *c != '"')
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '<' | '>' | '|' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed = collapsed.trim_matches('.').trim();
        if trimmed.is_empty() {
            "untitled".to_string()
        } else {
            trimmed.to_string()
        }
    }

    // @generates: Rendered video path for part `index`
    pub fn part_video_path<P: AsRef<Path>>(post_dir: P, title: &str, index: usize) -> PathBuf {
        post_dir
            .as_ref()
            .join(format!("{} part {}.mp4", Self::sanitize_title_for_file(title), index))
    }

    // @generates: Intermediate audio path for part `index`
    pub fn part_audio_path<P: AsRef<Path>>(post_dir: P, index: usize) -> PathBuf {
        post_dir.as_ref().join(format!("audio-part-{}.wav", index))
    }

    // @generates: Intermediate caption path for part `index`
    pub fn part_captions_path<P: AsRef<Path>>(post_dir: P, index: usize) -> PathBuf {
        post_dir.as_ref().join(format!("audio-part-{}.srt", index))
    }

    /// Delete a file if present, logging instead of failing
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) {
        let path = path.as_ref();
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove {:?}: {}", path, e);
            }
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
