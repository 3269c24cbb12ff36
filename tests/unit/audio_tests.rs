/*!
 * Tests for in-memory audio clips
 */

use anyhow::Result;
use hound::{SampleFormat, WavSpec};
use storyparts::audio::{AudioClip, ScratchAudio};
use storyparts::errors::AudioError;

/// Stereo clips count frames, not samples
#[test]
fn test_duration_withStereoClip_shouldCountFrames() -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 10,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let clip = AudioClip::from_samples(spec, vec![0; 40])?;
    assert_eq!(clip.duration(), 2.0);
    Ok(())
}

/// Only 16-bit integer PCM is accepted
#[test]
fn test_from_samples_withFloatFormat_shouldBeUnsupported() {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    assert!(matches!(
        AudioClip::from_samples(spec, vec![0; 4]),
        Err(AudioError::Unsupported(_))
    ));
}

/// Bytes read from a WAV file decode to the same clip
#[test]
fn test_from_wav_bytes_withWrittenFile_shouldMatchClip() -> Result<()> {
    let scratch = ScratchAudio::new("audio-bytes")?;
    let path = scratch.file("speech.wav");
    let clip = AudioClip::from_samples(AudioClip::mono_spec(24_000), (0..480).map(|i| i as i16).collect())?;
    clip.write_wav(&path)?;

    let bytes = std::fs::read(&path)?;
    let decoded = AudioClip::from_wav_bytes(&bytes)?;

    assert_eq!(decoded, clip);
    assert_eq!(decoded.duration(), 0.02);
    Ok(())
}

/// Garbage bytes are a WAV error
#[test]
fn test_from_wav_bytes_withGarbage_shouldFail() {
    assert!(matches!(
        AudioClip::from_wav_bytes(b"definitely not RIFF"),
        Err(AudioError::Wav(_))
    ));
}

/// Taking a clip leaves the empty clip behind
#[test]
fn test_take_shouldLeaveEmptyClip() {
    let mut clip = AudioClip::silence(100, 3.0);
    let taken = clip.take();
    assert!(clip.is_empty());
    assert!(clip.spec().is_none());
    assert_eq!(taken.duration(), 3.0);
}

/// An empty clip adopts the format of the first audio appended
#[test]
fn test_append_toEmptyClip_shouldAdoptFormat() -> Result<()> {
    let mut running = AudioClip::empty();
    running.append(AudioClip::silence(16_000, 0.5))?;
    assert_eq!(running.spec(), Some(AudioClip::mono_spec(16_000)));
    assert_eq!(running.to_string(), "0.50s (16000Hz mono 16-bit)");
    Ok(())
}
