/*!
 * Mock collaborators for testing.
 *
 * - `MockSource` - yields a scripted list of candidates (or errors)
 * - `MockSynthesizer` - returns silence of scripted duration, records calls
 * - `MockTranscriber` - returns evenly spaced cues, can fail on the Nth call
 * - `MockBackground` / `MockRenderer` - count calls, keep what they were given
 */

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::audio::AudioClip;
use crate::caption_processor::{CaptionEntry, CaptionTrack};
use crate::errors::ProviderError;
use crate::pipeline::manifest::Manifest;
use crate::providers::{
    BackgroundProvider, CandidateFilter, ContentSource, Post, RenderedPart, Renderer, SpeechSynthesizer,
    Transcriber,
};

/// One scripted item of a `MockSource`
#[derive(Debug, Clone)]
pub enum MockCandidate {
    Post(Post),
    /// The source fails to produce this item
    Error(String),
}

/// Content source yielding a fixed candidate list
#[derive(Debug, Default)]
pub struct MockSource {
    candidates: Vec<MockCandidate>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(posts: Vec<Post>) -> Self {
        Self::from_candidates(posts.into_iter().map(MockCandidate::Post).collect())
    }

    pub fn from_candidates(candidates: Vec<MockCandidate>) -> Self {
        Self {
            candidates,
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of streams handed out
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl ContentSource for MockSource {
    fn fetch_candidates(&self, _filter: &CandidateFilter) -> BoxStream<'static, Result<Post, ProviderError>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<Post, ProviderError>> = self
            .candidates
            .iter()
            .cloned()
            .map(|candidate| match candidate {
                MockCandidate::Post(post) => Ok(post),
                MockCandidate::Error(message) => Err(ProviderError::RequestFailed(message)),
            })
            .collect();
        stream::iter(items).boxed()
    }
}

/// Speech synthesizer producing silence.
///
/// Exact texts can be given a duration; announcements (text containing
/// `"\nPart "`) get the title duration and everything else the default.
#[derive(Debug)]
pub struct MockSynthesizer {
    sample_rate: u32,
    default_secs: f64,
    title_secs: f64,
    durations: HashMap<String, f64>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    /// 100 Hz mono, 1 s per text, 2 s per title
    pub fn new() -> Self {
        Self {
            sample_rate: 100,
            default_secs: 1.0,
            title_secs: 2.0,
            durations: HashMap::new(),
            failing: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_duration(mut self, text: impl Into<String>, seconds: f64) -> Self {
        self.durations.insert(text.into(), seconds);
        self
    }

    pub fn with_default_duration(mut self, seconds: f64) -> Self {
        self.default_secs = seconds;
        self
    }

    pub fn with_title_duration(mut self, seconds: f64) -> Self {
        self.title_secs = seconds;
        self
    }

    /// Fail every call whose text contains `fragment`
    pub fn failing_on(mut self, fragment: impl Into<String>) -> Self {
        self.failing.push(fragment.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Texts synthesized so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn duration_for(&self, text: &str) -> f64 {
        if let Some(seconds) = self.durations.get(text) {
            *seconds
        } else if text.contains("\nPart ") {
            self.title_secs
        } else {
            self.default_secs
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<AudioClip, ProviderError> {
        self.calls.lock().push(text.to_string());
        if self.failing.iter().any(|fragment| text.contains(fragment.as_str())) {
            return Err(ProviderError::ToolFailed {
                tool: "mock-tts".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("refused to synthesize {:?}", text),
            });
        }
        Ok(AudioClip::silence(self.sample_rate, self.duration_for(text)))
    }
}

/// Transcriber emitting one cue per `cue_ms` of audio
#[derive(Debug)]
pub struct MockTranscriber {
    cue_ms: u64,
    fail_on_call: Option<usize>,
    call_count: Arc<AtomicUsize>,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            cue_ms: 2000,
            fail_on_call: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the `n`th call (1-based)
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio: &AudioClip) -> Result<CaptionTrack, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(ProviderError::ToolFailed {
                tool: "mock-whisper".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("transcription {} failed", call),
            });
        }

        let total_ms = (audio.duration() * 1000.0).round() as u64;
        let mut entries = Vec::new();
        let mut start = 0;
        while start < total_ms {
            let end = (start + self.cue_ms).min(total_ms);
            let seq_num = entries.len() + 1;
            entries.push(CaptionEntry::new(seq_num, start, end, format!("cue {}", seq_num)));
            start = end;
        }
        Ok(CaptionTrack::new(entries))
    }
}

/// Background provider returning a fixed path
#[derive(Debug)]
pub struct MockBackground {
    path: PathBuf,
    failing: bool,
    call_count: Arc<AtomicUsize>,
}

impl MockBackground {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            failing: false,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new("background.mp4")
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackgroundProvider for MockBackground {
    async fn fetch(&self, url: &str) -> Result<PathBuf, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ProviderError::ToolNotFound {
                tool: format!("mock downloader for {}", url),
            });
        }
        Ok(self.path.clone())
    }
}

/// Renderer that records manifests instead of producing videos
#[derive(Debug, Default)]
pub struct MockRenderer {
    manifests: Mutex<Vec<Manifest>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.manifests.lock().len()
    }

    /// Manifests rendered so far
    pub fn manifests(&self) -> Vec<Manifest> {
        self.manifests.lock().clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, manifest: &Manifest, background: &Path) -> Result<Vec<RenderedPart>, ProviderError> {
        self.manifests.lock().push(manifest.clone());
        Ok(manifest
            .parts
            .iter()
            .map(|part| RenderedPart {
                index: part.index,
                path: background.with_file_name(format!("{} part {}.mp4", manifest.post.id, part.index)),
            })
            .collect())
    }
}
