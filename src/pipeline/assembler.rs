/*!
 * Part assembly: turning a post's sentences into bounded-duration parts.
 *
 * `AssemblyState` is a small state machine whose transitions are pure
 * functions over owned audio. `PartAssembler` drives it, performing the one
 * synthesis call per sentence and per title announcement.
 *
 * ```text
 * Accumulating --accept (running >= budget)--> Finalizing
 * Finalizing   --finalize--------------------> Accumulating | Done
 * Accumulating --close-----------------------> Finalizing (flush) | Done
 * ```
 */

use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::app_config::RemainderPolicy;
use crate::audio::AudioClip;
use crate::errors::PipelineError;
use crate::providers::SpeechSynthesizer;

/// A part whose audio is complete but which has no captions yet
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPart {
    /// 1-based part number
    pub index: usize,
    /// Title announcement followed by the narrated sentences
    pub audio: AudioClip,
    /// Narration seconds, title excluded
    pub body_duration: f64,
    /// Sentences narrated in this part
    pub sentence_count: usize,
}

/// State of the part assembler
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyState {
    /// Collecting sentence audio for the next part
    Accumulating { running: AudioClip, sentences: usize },
    /// Budget reached (or remainder flushed); waiting for the title clip
    Finalizing { body: AudioClip, sentences: usize, last: bool },
    /// No further parts will be produced
    Done,
}

impl Default for AssemblyState {
    fn default() -> Self {
        Self::Accumulating {
            running: AudioClip::empty(),
            sentences: 0,
        }
    }
}

impl AssemblyState {
    /// Initial state: nothing accumulated
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sentence clip; moves to `Finalizing` once the running
    /// audio reaches `budget` seconds.
    pub fn accept(self, clip: AudioClip, budget: f64) -> Result<Self, PipelineError> {
        match self {
            Self::Accumulating { mut running, sentences } => {
                running.append(clip)?;
                let sentences = sentences + 1;
                if running.duration() >= budget {
                    Ok(Self::Finalizing {
                        body: running,
                        sentences,
                        last: false,
                    })
                } else {
                    Ok(Self::Accumulating { running, sentences })
                }
            }
            other => Err(PipelineError::InvalidTransition(format!(
                "sentence received while {}",
                other.name()
            ))),
        }
    }

    /// Prepend the title clip and emit part `index`
    pub fn finalize(self, title: AudioClip, index: usize) -> Result<(Self, AssembledPart), PipelineError> {
        match self {
            Self::Finalizing { body, sentences, last } => {
                let body_duration = body.duration();
                let mut audio = body;
                audio.prepend(title)?;
                let part = AssembledPart {
                    index,
                    audio,
                    body_duration,
                    sentence_count: sentences,
                };
                let next = if last { Self::Done } else { Self::new() };
                Ok((next, part))
            }
            other => Err(PipelineError::InvalidTransition(format!(
                "finalize requested while {}",
                other.name()
            ))),
        }
    }

    /// Sentences are exhausted; decide what happens to the remainder
    pub fn close(self, policy: RemainderPolicy) -> Result<Self, PipelineError> {
        match self {
            Self::Accumulating { running, .. } if running.is_empty() => Ok(Self::Done),
            Self::Accumulating { running, sentences } => match policy {
                RemainderPolicy::Flush => Ok(Self::Finalizing {
                    body: running,
                    sentences,
                    last: true,
                }),
                RemainderPolicy::Discard => Ok(Self::Done),
            },
            Self::Done => Ok(Self::Done),
            other => Err(PipelineError::InvalidTransition(format!(
                "close requested while {}",
                other.name()
            ))),
        }
    }

    /// Seconds accumulated but not yet emitted
    pub fn pending_duration(&self) -> f64 {
        match self {
            Self::Accumulating { running, .. } => running.duration(),
            Self::Finalizing { body, .. } => body.duration(),
            Self::Done => 0.0,
        }
    }

    pub fn is_finalizing(&self) -> bool {
        matches!(self, Self::Finalizing { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Accumulating { .. } => "accumulating",
            Self::Finalizing { .. } => "finalizing",
            Self::Done => "done",
        }
    }
}

/// Announcement spoken at the start of part `index`
pub fn title_text(title: &str, index: usize) -> String {
    format!("{}\nPart {}\n", title, index)
}

/// Drives `AssemblyState` with real synthesis
#[derive(Debug)]
pub struct PartAssembler<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    voice: &'a str,
    policy: RemainderPolicy,
}

impl<'a> PartAssembler<'a> {
    pub fn new(synthesizer: &'a dyn SpeechSynthesizer, voice: &'a str, policy: RemainderPolicy) -> Self {
        Self {
            synthesizer,
            voice,
            policy,
        }
    }

    /// Assemble `sentences` into parts of roughly `budget` seconds.
    ///
    /// Sentences are synthesized strictly in order; any synthesis failure
    /// aborts the whole assembly.
    pub async fn assemble(
        &self,
        title: &str,
        sentences: &[String],
        budget: f64,
        progress: &ProgressBar,
    ) -> Result<Vec<AssembledPart>, PipelineError> {
        let mut state = AssemblyState::new();
        let mut parts = Vec::new();

        for (i, sentence) in sentences.iter().enumerate() {
            let clip = self.synthesize(sentence, || format!("sentence {}", i + 1)).await?;
            state = state.accept(clip, budget)?;
            if state.is_finalizing() {
                state = self.finalize(state, title, &mut parts).await?;
            }
            progress.inc(1);
        }

        let remainder = state.pending_duration();
        state = state.close(self.policy)?;
        if state.is_finalizing() {
            debug!("Flushing {:.1}s remainder as a final part", remainder);
            state = self.finalize(state, title, &mut parts).await?;
        } else if remainder > 0.0 {
            warn!(
                "Discarded {:.1}s of narration below the {:.1}s part budget",
                remainder, budget
            );
        }

        if !state.is_done() {
            return Err(PipelineError::InvalidTransition(format!(
                "assembly ended while {}",
                state.name()
            )));
        }

        Ok(parts)
    }

    async fn finalize(
        &self,
        state: AssemblyState,
        title: &str,
        parts: &mut Vec<AssembledPart>,
    ) -> Result<AssemblyState, PipelineError> {
        let index = parts.len() + 1;
        let title_clip = self
            .synthesize(&title_text(title, index), || format!("title of part {}", index))
            .await?;
        let (next, part) = state.finalize(title_clip, index)?;
        info!(
            "Part {} assembled: {} sentence(s), {:.1}s of narration, {:.1}s total",
            part.index,
            part.sentence_count,
            part.body_duration,
            part.audio.duration()
        );
        parts.push(part);
        Ok(next)
    }

    async fn synthesize<F>(&self, text: &str, context: F) -> Result<AudioClip, PipelineError>
    where
        F: FnOnce() -> String,
    {
        self.synthesizer
            .synthesize(text, self.voice)
            .await
            .map_err(|source| PipelineError::SynthesisFailure {
                context: context(),
                source,
            })
    }
}
