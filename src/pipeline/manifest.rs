use std::fmt;

use crate::audio::AudioClip;
use crate::caption_processor::CaptionTrack;
use crate::providers::Post;

/// One finished, playable segment of a narration
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// 1-based position within the manifest
    pub index: usize,
    /// Title announcement followed by the part's sentences
    pub audio: AudioClip,
    /// Captions aligned to `audio`
    pub captions: CaptionTrack,
    /// Narration seconds, title excluded
    pub body_duration: f64,
    /// Number of sentences narrated in this part
    pub sentence_count: usize,
}

impl Part {
    /// Full duration including the title announcement
    pub fn duration(&self) -> f64 {
        self.audio.duration()
    }
}

/// A post together with all of its parts, ready for rendering.
///
/// Only built once every part has audio and captions.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub post: Post,
    pub parts: Vec<Part>,
}

impl Manifest {
    pub fn new(post: Post, parts: Vec<Part>) -> Self {
        Self { post, parts }
    }

    /// Sum of part body durations
    pub fn narration_duration(&self) -> f64 {
        self.parts.iter().map(|p| p.body_duration).sum()
    }

    /// Whether part indices run 1, 2, 3, ... without gaps
    pub fn has_contiguous_indices(&self) -> bool {
        self.parts.iter().enumerate().all(|(i, part)| part.index == i + 1)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' ({}): {} part(s), {:.1}s of narration",
            self.post.title,
            self.post.id,
            self.parts.len(),
            self.narration_duration()
        )
    }
}
