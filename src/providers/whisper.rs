use async_trait::async_trait;
use log::debug;
use std::ffi::OsString;

use crate::app_config::TranscriptionConfig;
use crate::audio::{AudioClip, ScratchAudio};
use crate::caption_processor::CaptionTrack;
use crate::errors::ProviderError;
use crate::providers::{Transcriber, run_tool};

/// Transcription through the openai-whisper command-line tool
#[derive(Debug, Clone)]
pub struct WhisperCli {
    config: TranscriptionConfig,
}

impl WhisperCli {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Command-line arguments for transcribing `audio` into `output_dir`
    fn build_args(&self, audio: &std::path::Path, output_dir: &std::path::Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            audio.as_os_str().to_owned(),
            "--model".into(),
            self.config.model.as_str().into(),
            "--output_format".into(),
            "srt".into(),
            "--output_dir".into(),
            output_dir.as_os_str().to_owned(),
            "--language".into(),
            self.config.language.as_str().into(),
            "--fp16".into(),
            "False".into(),
            "--verbose".into(),
            "False".into(),
        ];

        if self.config.word_timestamps {
            args.push("--word_timestamps".into());
            args.push("True".into());
            if let Some(words) = self.config.max_words_per_line {
                args.push("--max_words_per_line".into());
                args.push(words.to_string().into());
            }
        }

        args
    }
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, audio: &AudioClip) -> Result<CaptionTrack, ProviderError> {
        if audio.is_empty() {
            return Err(ProviderError::InvalidInput("cannot transcribe empty audio".to_string()));
        }

        let scratch = ScratchAudio::new("storyparts-whisper")?;
        let wav = scratch.file("part.wav");
        audio.write_wav(&wav)?;

        let args = self.build_args(&wav, scratch.dir());
        run_tool(&self.config.command, &args, self.config.timeout()).await?;

        // whisper names its output after the input file stem
        let srt = scratch.file("part.srt");
        let content = tokio::fs::read_to_string(&srt).await?;
        let track = CaptionTrack::parse_srt_string(&content)
            .map_err(|e| ProviderError::ParseError(format!("whisper output: {}", e)))?;

        debug!("Transcribed {} into {}", audio, track);
        scratch.release();
        Ok(track)
    }
}
