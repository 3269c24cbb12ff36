use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory receiving one sub-directory per processed post
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Content source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Speech synthesis settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Transcription settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Background video settings
    #[serde(default)]
    pub background: BackgroundConfig,

    /// Rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Part assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Reddit listing to read candidates from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl Listing {
    // @returns: Path segment of the listing endpoint
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
        }
    }
}

/// Content source configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    // @field: Reddit app client id (script type)
    #[serde(default = "String::new")]
    pub client_id: String,

    // @field: Reddit app client secret
    #[serde(default = "String::new")]
    pub client_secret: String,

    // @field: Subreddits, queried together
    #[serde(default)]
    pub subreddits: Vec<String>,

    // @field: Listing to read
    #[serde(default)]
    pub listing: Listing,

    // @field: Posts per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    // @field: Upper bound on listing pages per run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    // @field: Include NSFW posts
    #[serde(default)]
    pub allow_nsfw: bool,

    // @field: User-Agent header sent to Reddit
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // @field: Token endpoint
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    // @field: OAuth API endpoint
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            subreddits: Vec::new(),
            listing: Listing::default(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            allow_nsfw: false,
            user_agent: default_user_agent(),
            auth_endpoint: default_auth_endpoint(),
            api_endpoint: default_api_endpoint(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// edge-tts executable
    #[serde(default = "default_tts_command")]
    pub command: String,

    /// ffmpeg executable used to decode synthesized speech
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,

    /// Voice name (see `edge-tts --list-voices`)
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Sample rate of decoded narration audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Timeout for one synthesis call in seconds
    #[serde(default = "default_tts_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for transient synthesis failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff between retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: default_tts_command(),
            ffmpeg_command: default_ffmpeg_command(),
            voice: default_voice(),
            sample_rate: default_sample_rate(),
            timeout_secs: default_tts_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Whisper model size
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    Tiny,
    Base,
    #[default]
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    // @returns: Model name as the whisper CLI expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(Self::Tiny),
            "base" => Ok(Self::Base),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(anyhow!("Invalid whisper model: {}", s)),
        }
    }
}

/// Transcription configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// whisper executable
    #[serde(default = "default_whisper_command")]
    pub command: String,

    /// Model size
    #[serde(default)]
    pub model: WhisperModel,

    /// Spoken language (ISO code)
    #[serde(default = "default_language")]
    pub language: String,

    /// Emit word-level timing so captions can be kept short
    #[serde(default = "default_true")]
    pub word_timestamps: bool,

    /// Words per caption line when word timestamps are on
    #[serde(default = "default_max_words_per_line")]
    pub max_words_per_line: Option<u32>,

    /// Timeout for one transcription in seconds
    #[serde(default = "default_whisper_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: default_whisper_command(),
            model: WhisperModel::default(),
            language: default_language(),
            word_timestamps: true,
            max_words_per_line: default_max_words_per_line(),
            timeout_secs: default_whisper_timeout_secs(),
        }
    }
}

/// Background video configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackgroundConfig {
    /// Video URL to download as background
    #[serde(default = "default_background_url")]
    pub url: String,

    /// Download cache directory
    #[serde(default = "default_background_dir")]
    pub directory: PathBuf,

    /// yt-dlp executable
    #[serde(default = "default_downloader_command")]
    pub command: String,

    /// Download timeout in seconds
    #[serde(default = "default_long_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            url: default_background_url(),
            directory: default_background_dir(),
            command: default_downloader_command(),
            timeout_secs: default_long_timeout_secs(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,

    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Timeout per rendered part in seconds
    #[serde(default = "default_long_timeout_secs")]
    pub timeout_secs: u64,

    /// Keep the per-part WAV and SRT files next to the videos
    #[serde(default)]
    pub keep_intermediate: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_command: default_ffmpeg_command(),
            width: default_width(),
            height: default_height(),
            timeout_secs: default_long_timeout_secs(),
            keep_intermediate: false,
        }
    }
}

/// What to do with narration left over after the last full part
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Emit the remainder as a final, shorter part
    #[default]
    Flush,
    /// Drop the remainder
    Discard,
}

impl std::str::FromStr for RemainderPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "flush" => Ok(Self::Flush),
            "discard" => Ok(Self::Discard),
            _ => Err(anyhow!("Invalid remainder policy: {}", s)),
        }
    }
}

/// Part assembly configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssemblyConfig {
    /// Minimum narration length for a post to qualify
    #[serde(default = "default_min_narration_secs")]
    pub min_narration_secs: f64,

    /// Handling of the trailing remainder
    #[serde(default)]
    pub remainder: RemainderPolicy,

    /// Language of the post text, for sentence segmentation
    #[serde(default = "default_language")]
    pub language: String,

    /// Number of posts to produce per run
    #[serde(default = "default_posts_per_run")]
    pub posts_per_run: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            min_narration_secs: default_min_narration_secs(),
            remainder: RemainderPolicy::default(),
            language: default_language(),
            posts_per_run: default_posts_per_run(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_page_size() -> u32 {
    25
}

fn default_max_pages() -> u32 {
    4
}

fn default_user_agent() -> String {
    format!("storyparts/{}", env!("CARGO_PKG_VERSION"))
}

fn default_auth_endpoint() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_api_endpoint() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_tts_command() -> String {
    "edge-tts".to_string()
}

fn default_ffmpeg_command() -> String {
    "ffmpeg".to_string()
}

fn default_voice() -> String {
    "en-US-ChristopherNeural".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

fn default_tts_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_whisper_command() -> String {
    "whisper".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_words_per_line() -> Option<u32> {
    Some(4)
}

fn default_whisper_timeout_secs() -> u64 {
    900
}

fn default_background_url() -> String {
    "https://www.youtube.com/watch?v=FvSqM5EKEeg".to_string()
}

fn default_background_dir() -> PathBuf {
    PathBuf::from("background")
}

fn default_downloader_command() -> String {
    "yt-dlp".to_string()
}

fn default_long_timeout_secs() -> u64 {
    1800
}

fn default_width() -> u32 {
    1080
}

fn default_height() -> u32 {
    1920
}

fn default_min_narration_secs() -> f64 {
    60.0
}

fn default_posts_per_run() -> usize {
    1
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source.client_id.trim().is_empty() || self.source.client_secret.trim().is_empty() {
            return Err(anyhow!("Reddit client id and client secret are required"));
        }

        if self.source.subreddits.iter().all(|s| s.trim().is_empty()) {
            return Err(anyhow!("At least one subreddit is required"));
        }

        if self.source.page_size == 0 || self.source.page_size > 100 {
            return Err(anyhow!("source.page_size must be between 1 and 100"));
        }

        let timeouts = [
            ("source.timeout_secs", self.source.timeout_secs),
            ("speech.timeout_secs", self.speech.timeout_secs),
            ("transcription.timeout_secs", self.transcription.timeout_secs),
            ("background.timeout_secs", self.background.timeout_secs),
            ("render.timeout_secs", self.render.timeout_secs),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(anyhow!("{} must be greater than zero", key));
        }

        if self.speech.voice.trim().is_empty() {
            return Err(anyhow!("A speech voice is required"));
        }

        if self.speech.sample_rate == 0 {
            return Err(anyhow!("speech.sample_rate must be greater than zero"));
        }

        url::Url::parse(&self.background.url)
            .map_err(|e| anyhow!("Invalid background URL '{}': {}", self.background.url, e))?;

        crate::language_utils::normalize_to_part1(&self.assembly.language)?;
        crate::language_utils::normalize_to_part1(&self.transcription.language)?;

        if !(self.assembly.min_narration_secs > 0.0) {
            return Err(anyhow!("assembly.min_narration_secs must be positive"));
        }

        if self.assembly.posts_per_run == 0 {
            return Err(anyhow!("assembly.posts_per_run must be at least 1"));
        }

        if self.render.width == 0 || self.render.height == 0 {
            return Err(anyhow!("render.width and render.height must be positive"));
        }

        Ok(())
    }

    /// Subreddits joined the way the listing endpoint expects (`a+b+c`)
    pub fn subreddit_path(&self) -> String {
        self.source
            .subreddits
            .iter()
            .map(|s| s.trim().trim_start_matches("r/"))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl SpeechConfig {
    /// Timeout of a single synthesis call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TranscriptionConfig {
    /// Timeout of a single transcription
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            source: SourceConfig::default(),
            speech: SpeechConfig::default(),
            transcription: TranscriptionConfig::default(),
            background: BackgroundConfig::default(),
            render: RenderConfig::default(),
            assembly: AssemblyConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
