/*!
 * Collaborators of the narration pipeline.
 *
 * The pipeline only talks to the outside world through the traits below:
 * - `ContentSource`: candidate posts (Reddit)
 * - `SpeechSynthesizer`: text to speech (edge-tts)
 * - `Transcriber`: speech to captions (whisper)
 * - `BackgroundProvider`: background video (yt-dlp)
 * - `Renderer`: final muxing (ffmpeg)
 *
 * Command-line tools are run through `run_tool`, which bounds every call
 * with a timeout and kills the child when the call is dropped.
 */

use async_trait::async_trait;
use futures::stream::BoxStream;
use log::{debug, warn};
use std::ffi::OsStr;
use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::{Listing, SourceConfig};
use crate::audio::AudioClip;
use crate::caption_processor::CaptionTrack;
use crate::errors::ProviderError;
use crate::pipeline::manifest::Manifest;

/// A candidate text post
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Source identifier, unique per post
    pub id: String,
    /// Post title, announced at the start of every part
    pub title: String,
    /// Body text to narrate
    pub body: String,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Which candidates a content source should yield
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    pub subreddits: Vec<String>,
    pub listing: Listing,
    pub page_size: u32,
    pub max_pages: u32,
    pub allow_nsfw: bool,
}

impl CandidateFilter {
    pub fn from_config(source: &SourceConfig) -> Self {
        Self {
            subreddits: source.subreddits.clone(),
            listing: source.listing,
            page_size: source.page_size,
            max_pages: source.max_pages,
            allow_nsfw: source.allow_nsfw,
        }
    }
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

/// One rendered video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPart {
    /// Index of the manifest part it was rendered from
    pub index: usize,
    /// Output video file
    pub path: PathBuf,
}

/// Lazy, finite sequence of candidate posts in upstream order.
///
/// A stream is consumed once; calling `fetch_candidates` again starts a new
/// listing from the top.
pub trait ContentSource: Send + Sync + Debug {
    fn fetch_candidates(&self, filter: &CandidateFilter) -> BoxStream<'static, Result<Post, ProviderError>>;
}

/// Text to speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` with `voice`; one call produces one clip
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioClip, ProviderError>;
}

/// Speech to time-aligned captions
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    async fn transcribe(&self, audio: &AudioClip) -> Result<CaptionTrack, ProviderError>;
}

/// Background video acquisition
#[async_trait]
pub trait BackgroundProvider: Send + Sync + Debug {
    /// Local path of the video at `url`, downloading it if needed
    async fn fetch(&self, url: &str) -> Result<PathBuf, ProviderError>;
}

/// Final muxing of a manifest into videos
#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// Render every part of `manifest` over `background`, one video per part
    async fn render(&self, manifest: &Manifest, background: &Path) -> Result<Vec<RenderedPart>, ProviderError>;
}

/// Run an external tool to completion within `timeout`.
///
/// A missing executable maps to `ToolNotFound`, a non-zero exit to
/// `ToolFailed` with the tool's filtered stderr.
pub async fn run_tool<I, S>(program: &str, args: I, timeout: Duration) -> Result<Output, ProviderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let output = tokio::select! {
        result = command.output() => {
            result.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProviderError::ToolNotFound { tool: program.to_string() },
                _ => ProviderError::Io(e),
            })?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(ProviderError::Timeout { operation: program.to_string(), after: timeout });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::ToolFailed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: filter_tool_stderr(&stderr),
        });
    }

    Ok(output)
}

/// Keep only the meaningful lines of a tool's stderr (drops ffmpeg banners,
/// stream listings and progress lines)
pub fn filter_tool_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "libav",
        "libsw",
        "libpostproc",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "size=",
        "frame=",
        "[download]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "no error output".to_string()
    } else {
        // The tail holds the actual failure
        let start = meaningful.len().saturating_sub(10);
        meaningful[start..].join("\n")
    }
}

/// Retry `call` on retryable errors with exponential backoff.
///
/// The wait before retry `n` (1-based) is `backoff_base_ms * 2^(n-1)`.
pub async fn retry_with_backoff<T, F, Fut>(
    operation: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                let backoff_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
                warn!(
                    "{} failed: {} - retrying in {}ms (attempt {}/{})",
                    operation,
                    e,
                    backoff_ms,
                    attempt + 1,
                    max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub mod edge_tts;
pub mod ffmpeg;
pub mod mock;
pub mod reddit;
pub mod whisper;
pub mod youtube;
