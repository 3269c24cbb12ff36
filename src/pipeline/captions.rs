use log::debug;

use crate::audio::AudioClip;
use crate::caption_processor::CaptionTrack;
use crate::errors::{PipelineError, ProviderError};
use crate::pipeline::assembler::AssembledPart;
use crate::pipeline::manifest::Part;
use crate::providers::Transcriber;

/// Produces the caption track of each assembled part
#[derive(Debug)]
pub struct CaptionGenerator<'a> {
    transcriber: &'a dyn Transcriber,
}

impl<'a> CaptionGenerator<'a> {
    pub fn new(transcriber: &'a dyn Transcriber) -> Self {
        Self { transcriber }
    }

    /// Transcribe `audio` once and normalize the result against its duration
    pub async fn generate_captions(&self, part: usize, audio: &AudioClip) -> Result<CaptionTrack, PipelineError> {
        let failure = |source: ProviderError| PipelineError::TranscriptionFailure { part, source };

        if audio.is_empty() {
            return Err(failure(ProviderError::InvalidInput("part audio is empty".to_string())));
        }

        let raw = self.transcriber.transcribe(audio).await.map_err(failure)?;
        let duration_ms = (audio.duration() * 1000.0).round() as u64;
        let track = raw.normalize(Some(duration_ms));

        if track.is_empty() {
            return Err(failure(ProviderError::ParseError(
                "no captions left after normalization".to_string(),
            )));
        }

        debug!("Part {}: {} (from {} raw cue(s))", part, track, raw.len());
        Ok(track)
    }

    /// Caption every part in order; the first failure aborts the whole set
    pub async fn caption_parts(&self, parts: Vec<AssembledPart>) -> Result<Vec<Part>, PipelineError> {
        let mut captioned = Vec::with_capacity(parts.len());
        for part in parts {
            let captions = self.generate_captions(part.index, &part.audio).await?;
            captioned.push(Part {
                index: part.index,
                audio: part.audio,
                captions,
                body_duration: part.body_duration,
                sentence_count: part.sentence_count,
            });
        }
        Ok(captioned)
    }
}
