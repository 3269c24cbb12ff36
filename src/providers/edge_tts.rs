use async_trait::async_trait;
use log::debug;
use std::ffi::OsStr;
use std::path::Path;

use crate::app_config::SpeechConfig;
use crate::audio::{AudioClip, ScratchAudio};
use crate::errors::ProviderError;
use crate::providers::{SpeechSynthesizer, retry_with_backoff, run_tool};

/// Speech synthesis through the `edge-tts` command-line tool.
///
/// edge-tts writes MP3; ffmpeg decodes it to mono 16-bit PCM at the
/// configured sample rate so every clip of a run shares one format.
#[derive(Debug, Clone)]
pub struct EdgeTts {
    config: SpeechConfig,
}

impl EdgeTts {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn synthesize_once(&self, text: &str, voice: &str) -> Result<AudioClip, ProviderError> {
        let scratch = ScratchAudio::new("storyparts-tts")?;
        let script = scratch.file("speech.txt");
        let mp3 = scratch.file("speech.mp3");
        let wav = scratch.file("speech.wav");

        tokio::fs::write(&script, text).await?;
        run_tool(&self.config.command, tts_args(voice, &script, &mp3), self.config.timeout())
            .await
            .map_err(classify_tts_failure)?;

        let sample_rate = self.config.sample_rate.to_string();
        let decode_args: [&OsStr; 12] = [
            "-y".as_ref(),
            "-loglevel".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            mp3.as_os_str(),
            "-ar".as_ref(),
            sample_rate.as_ref(),
            "-ac".as_ref(),
            "1".as_ref(),
            "-c:a".as_ref(),
            "pcm_s16le".as_ref(),
            wav.as_os_str(),
        ];
        run_tool(&self.config.ffmpeg_command, decode_args, self.config.timeout()).await?;

        let clip = AudioClip::from_wav_file(&wav)?;
        scratch.release();
        Ok(clip)
    }
}

/// The text travels in a file so its size and leading dashes never reach argv
fn tts_args<'a>(voice: &'a str, script: &'a Path, mp3: &'a Path) -> [&'a OsStr; 6] {
    [
        "--voice".as_ref(),
        voice.as_ref(),
        "--file".as_ref(),
        script.as_os_str(),
        "--write-media".as_ref(),
        mp3.as_os_str(),
    ]
}

/// edge-tts streams from an online service; its network failures are
/// transient, anything else it reports is not
fn classify_tts_failure(error: ProviderError) -> ProviderError {
    match error {
        ProviderError::ToolFailed { tool, status, stderr } if is_network_failure(&stderr) => {
            ProviderError::ConnectionError(format!("{} failed ({}): {}", tool, status, stderr))
        }
        other => other,
    }
}

fn is_network_failure(stderr: &str) -> bool {
    const MARKERS: &[&str] = &[
        "connect",
        "timeout",
        "timed out",
        "websocket",
        "network",
        "temporary failure",
        "no audio was received",
        "503",
    ];
    let stderr = stderr.to_lowercase();
    MARKERS.iter().any(|marker| stderr.contains(marker))
}

#[async_trait]
impl SpeechSynthesizer for EdgeTts {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioClip, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput("nothing to synthesize".to_string()));
        }

        let clip = retry_with_backoff(
            &self.config.command,
            self.config.retry_count,
            self.config.retry_backoff_ms,
            || self.synthesize_once(text, voice),
        )
        .await?;

        debug!("Synthesized {} chars into {}", text.chars().count(), clip);
        Ok(clip)
    }
}
