use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::warn;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::AudioError;

// @module: In-memory PCM audio clips and scratch storage for intermediate audio

/// Synthesized or loaded speech audio.
///
/// Holds interleaved 16-bit PCM samples. The empty clip carries no format and
/// is the identity for concatenation; the first non-empty clip appended fixes
/// the format for everything that follows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioClip {
    // @field: Sample format, None while empty
    spec: Option<WavSpec>,

    // @field: Interleaved samples
    samples: Vec<i16>,
}

impl AudioClip {
    /// Create an empty clip
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a clip from raw interleaved samples
    pub fn from_samples(spec: WavSpec, samples: Vec<i16>) -> Result<Self, AudioError> {
        Self::check_spec(&spec)?;
        Ok(Self {
            spec: Some(spec),
            samples,
        })
    }

    /// Create a mono clip of silence lasting `seconds`
    pub fn silence(sample_rate: u32, seconds: f64) -> Self {
        let spec = Self::mono_spec(sample_rate);
        let count = (seconds.max(0.0) * sample_rate as f64).round() as usize;
        Self {
            spec: Some(spec),
            samples: vec![0; count],
        }
    }

    /// 16-bit mono PCM at the given rate
    pub fn mono_spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Load a 16-bit PCM WAV file
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let reader = WavReader::open(path)?;
        Self::from_reader(reader)
    }

    /// Decode 16-bit PCM WAV bytes
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();
        Self::check_spec(&spec)?;
        let samples = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            spec: Some(spec),
            samples,
        })
    }

    fn check_spec(spec: &WavSpec) -> Result<(), AudioError> {
        if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
            return Err(AudioError::Unsupported(format!(
                "{}-bit {:?} (only 16-bit integer PCM is supported)",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AudioError::Unsupported(format!(
                "{} channel(s) at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }
        Ok(())
    }

    /// Write the clip as a WAV file
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioError> {
        let spec = self.spec.ok_or(AudioError::Empty)?;
        let mut writer = WavWriter::create(path, spec)?;
        for sample in &self.samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        match self.spec {
            Some(spec) if !self.samples.is_empty() => {
                self.samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64)
            }
            _ => 0.0,
        }
    }

    /// Whether the clip holds no audio
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample format, if any audio has been added
    pub fn spec(&self) -> Option<WavSpec> {
        self.spec
    }

    /// Raw interleaved samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Append `other` after this clip
    pub fn append(&mut self, other: AudioClip) -> Result<(), AudioError> {
        if other.is_empty() {
            return Ok(());
        }
        self.adopt_spec(&other)?;
        self.samples.extend(other.samples);
        Ok(())
    }

    /// Insert `other` before this clip
    pub fn prepend(&mut self, other: AudioClip) -> Result<(), AudioError> {
        if other.is_empty() {
            return Ok(());
        }
        self.adopt_spec(&other)?;
        let mut samples = other.samples;
        samples.append(&mut self.samples);
        self.samples = samples;
        Ok(())
    }

    /// Concatenate clips in order
    pub fn concat<I: IntoIterator<Item = AudioClip>>(clips: I) -> Result<Self, AudioError> {
        let mut combined = Self::empty();
        for clip in clips {
            combined.append(clip)?;
        }
        Ok(combined)
    }

    /// Take the clip's audio, leaving it empty
    pub fn take(&mut self) -> AudioClip {
        std::mem::take(self)
    }

    fn adopt_spec(&mut self, other: &AudioClip) -> Result<(), AudioError> {
        match (self.spec, other.spec) {
            (Some(mine), Some(theirs)) if !self.samples.is_empty() && mine != theirs => {
                Err(AudioError::FormatMismatch {
                    expected: describe_spec(&mine),
                    actual: describe_spec(&theirs),
                })
            }
            (_, theirs) => {
                if self.samples.is_empty() {
                    self.spec = theirs;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.spec {
            Some(spec) => write!(f, "{:.2}s ({})", self.duration(), describe_spec(&spec)),
            None => write!(f, "empty clip"),
        }
    }
}

fn describe_spec(spec: &WavSpec) -> String {
    let layout = if spec.channels == 1 {
        "mono".to_string()
    } else {
        format!("{}ch", spec.channels)
    };
    format!("{}Hz {} {}-bit", spec.sample_rate, layout, spec.bits_per_sample)
}

/// Scoped scratch directory for intermediate audio files.
///
/// Everything inside is deleted when the value is dropped, so per-sentence,
/// per-title and probe files never outlive the call that produced them.
#[derive(Debug)]
pub struct ScratchAudio {
    dir: TempDir,
}

impl ScratchAudio {
    // @creates: Fresh scratch directory with the given prefix
    pub fn new(prefix: &str) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        Ok(Self { dir })
    }

    /// Path of a file inside the scratch directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// The scratch directory itself
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the scratch directory now, logging instead of failing
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch audio {}: {}", path.display(), e);
        }
    }
}
