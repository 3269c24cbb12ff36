use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::CaptionError;

// @module: Caption tracks, SRT parsing/writing and normalization

// @const: SRT timestamp regex (accepts ',' or '.' before milliseconds)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp regex is valid")
});

// @const: Runs of horizontal whitespace
static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00a0}]+").expect("whitespace regex is valid"));

// @struct: Single caption cue
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Caption text
    pub text: String,
}

impl CaptionEntry {
    /// Creates a new caption entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        CaptionEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, CaptionError> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(CaptionError::InvalidTimestamp(timestamp.to_string()));
        }

        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(parts.iter()) {
            *slot = part
                .parse()
                .map_err(|_| CaptionError::InvalidTimestamp(timestamp.to_string()))?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(CaptionError::InvalidTimestamp(timestamp.to_string()));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Duration of the cue in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered caption cues aligned to one part's audio
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionTrack {
    /// Caption cues in playback order
    pub entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    /// Create a track from entries
    pub fn new(entries: Vec<CaptionEntry>) -> Self {
        Self { entries }
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parse SRT content into a track
    ///
    /// Malformed blocks are skipped with a warning; an input without a single
    /// usable block is an error.
    pub fn parse_srt_string(content: &str) -> Result<Self, CaptionError> {
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let mut flush = |seq_num: Option<usize>, times: Option<(u64, u64)>, text: &mut String| {
            if let (Some(seq_num), Some((start_ms, end_ms))) = (seq_num, times) {
                if text.trim().is_empty() {
                    debug!("Skipping empty caption block {}", seq_num);
                } else {
                    entries.push(CaptionEntry::new(seq_num, start_ms, end_ms, text.trim()));
                }
            }
            text.clear();
        };

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.is_empty() {
                if current_times.is_some() {
                    flush(current_seq_num.take(), current_times.take(), &mut current_text);
                }
                continue;
            }

            if current_seq_num.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    current_times = Some((Self::captured_ms(&caps, 1), Self::captured_ms(&caps, 5)));
                    continue;
                }
            }

            if current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!("Unexpected caption text at line {}: {}", line_number + 1, trimmed);
            }
        }
        flush(current_seq_num, current_times, &mut current_text);

        if entries.is_empty() {
            return Err(CaptionError::Empty("no parseable SRT blocks".to_string()));
        }

        Ok(Self { entries })
    }

    fn captured_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let field = |i: usize| -> u64 {
            caps.get(start_idx + i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        (field(0) * 3600 + field(1) * 60 + field(2)) * 1000 + field(3)
    }

    /// Render the track as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write the track to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create caption file: {}", path.display()))?;
        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }

    /// Read and parse an SRT file
    pub fn read_srt<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read caption file: {}", path.display()))?;
        Self::parse_srt_string(&content).map_err(|e| anyhow!("{}: {}", path.display(), e))
    }

    /// Clean up a freshly transcribed track.
    ///
    /// Text loses control characters and stray whitespace, empty cues are
    /// dropped, cues are ordered by start time and made non-overlapping, ends
    /// are clamped to `audio_duration_ms` when given, and numbering restarts at 1.
    pub fn normalize(&self, audio_duration_ms: Option<u64>) -> CaptionTrack {
        let mut entries: Vec<CaptionEntry> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let text = clean_caption_text(&entry.text);
                (!text.is_empty()).then(|| CaptionEntry { text, ..entry.clone() })
            })
            .collect();

        entries.sort_by_key(|entry| (entry.start_time_ms, entry.end_time_ms));

        let mut normalized: Vec<CaptionEntry> = Vec::with_capacity(entries.len());
        let mut adjusted = 0usize;
        for mut entry in entries {
            if let Some(prev) = normalized.last() {
                if entry.start_time_ms < prev.end_time_ms {
                    entry.start_time_ms = prev.end_time_ms;
                    adjusted += 1;
                }
            }
            if let Some(limit) = audio_duration_ms {
                if entry.end_time_ms > limit {
                    entry.end_time_ms = limit;
                    adjusted += 1;
                }
            }
            if entry.end_time_ms <= entry.start_time_ms {
                debug!("Dropping caption collapsed by normalization: {:?}", entry.text);
                continue;
            }
            normalized.push(entry);
        }

        if adjusted > 0 {
            debug!("Adjusted {} caption timestamp(s) during normalization", adjusted);
        }

        for (i, entry) in normalized.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        CaptionTrack { entries: normalized }
    }

    /// Whether cues are strictly ordered and non-overlapping
    pub fn is_monotonic(&self) -> bool {
        self.entries.iter().all(|e| e.start_time_ms < e.end_time_ms)
            && self
                .entries
                .windows(2)
                .all(|pair| pair[0].end_time_ms <= pair[1].start_time_ms)
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} caption(s)", self.entries.len())?;
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            write!(
                f,
                " {} - {}",
                CaptionEntry::format_timestamp(first.start_time_ms),
                CaptionEntry::format_timestamp(last.end_time_ms)
            )?;
        }
        Ok(())
    }
}

/// Strip control and zero-width characters and collapse whitespace, line by line
pub fn clean_caption_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            let visible: String = line
                .chars()
                .filter(|c| !c.is_control() && !matches!(c, '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}'))
                .collect();
            WHITESPACE_REGEX.replace_all(visible.trim(), " ").into_owned()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
