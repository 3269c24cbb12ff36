/*!
 * Error types for the storyparts application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to an external collaborator
/// (HTTP APIs and command-line tools)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response or tool output fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The external tool is not installed or not on PATH
    #[error("Tool not found: {tool}")]
    ToolNotFound {
        /// Executable name
        tool: String,
    },

    /// The external tool exited unsuccessfully
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Executable name
        tool: String,
        /// Exit status description
        status: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The call did not complete within its time bound
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        /// What was being waited on
        operation: String,
        /// The bound that was exceeded
        after: Duration,
    },

    /// The collaborator rejected its input (empty or unsupported audio, empty text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio produced by the collaborator could not be read
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Local I/O around the call failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Whether a retry of the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_)
                | Self::ConnectionError(_)
                | Self::RateLimitExceeded(_)
                | Self::Timeout { .. }
        ) || matches!(self, Self::ApiError { status_code, .. } if *status_code >= 500)
    }
}

/// Errors that can occur while handling PCM audio
#[derive(Error, Debug)]
pub enum AudioError {
    /// Two clips with different sample formats were concatenated
    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    FormatMismatch {
        /// Format of the running clip
        expected: String,
        /// Format of the clip being appended
        actual: String,
    },

    /// Only 16-bit integer PCM is handled
    #[error("Unsupported audio format: {0}")]
    Unsupported(String),

    /// An empty clip was used where audio is required
    #[error("Audio clip is empty")]
    Empty,

    /// WAV decoding or encoding failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during caption processing
#[derive(Error, Debug)]
pub enum CaptionError {
    /// No usable cue was found
    #[error("No valid caption entries found: {0}")]
    Empty(String),

    /// A timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Writing the caption file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors of the narration pipeline.
///
/// Fatal errors end the run; the others abort the post being produced.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The content source was exhausted without a long enough narration
    #[error("No qualifying post found after examining {examined} candidate(s)")]
    NoQualifyingPost {
        /// Number of candidates pulled from the source
        examined: usize,
    },

    /// Speech synthesis failed for a piece of text
    #[error("Speech synthesis failed for {context}: {source}")]
    SynthesisFailure {
        /// What was being synthesized
        context: String,
        /// Collaborator error
        #[source]
        source: ProviderError,
    },

    /// Transcription of a part failed or produced no usable captions
    #[error("Transcription failed for part {part}: {source}")]
    TranscriptionFailure {
        /// Part index (1-based)
        part: usize,
        /// Collaborator error
        #[source]
        source: ProviderError,
    },

    /// Sentence boundary detection is unusable
    #[error("Sentence segmentation unavailable: {0}")]
    SegmentationFailure(String),

    /// Audio could not be combined
    #[error("Audio assembly failed: {0}")]
    Audio(#[from] AudioError),

    /// The background video could not be obtained
    #[error("Background video unavailable: {0}")]
    Background(#[source] ProviderError),

    /// The renderer failed
    #[error("Rendering failed: {0}")]
    Render(#[source] ProviderError),

    /// The part assembler was driven out of order
    #[error("Invalid assembly transition: {0}")]
    InvalidTransition(String),

    /// The run was cancelled by a shutdown signal
    #[error("Run cancelled")]
    Cancelled,

    /// Local I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Fatal errors terminate the run; non-fatal ones abort a single post
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoQualifyingPost { .. } | Self::SegmentationFailure(_) | Self::Cancelled
        )
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
