/*!
 * Tests for error classification and conversion
 */

use std::error::Error;
use std::time::Duration;
use storyparts::errors::{AppError, AudioError, PipelineError, ProviderError};

/// Transient collaborator failures are worth retrying
#[test]
fn test_provider_error_isRetryable_withTransientFailures_shouldReturnTrue() {
    assert!(ProviderError::RequestFailed("reset".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_retryable());
    assert!(ProviderError::Timeout {
        operation: "whisper".to_string(),
        after: Duration::from_secs(900),
    }
    .is_retryable());
}

/// Permanent failures are not retried
#[test]
fn test_provider_error_isRetryable_withPermanentFailures_shouldReturnFalse() {
    assert!(!ProviderError::AuthenticationError("bad secret".to_string()).is_retryable());
    assert!(!ProviderError::ParseError("not json".to_string()).is_retryable());
    assert!(!ProviderError::Audio(AudioError::Empty).is_retryable());
    assert!(!ProviderError::ToolFailed {
        tool: "ffmpeg".to_string(),
        status: "exit status: 1".to_string(),
        stderr: "Invalid data found when processing input".to_string(),
    }
    .is_retryable());
}

/// Cancellation ends the run, a failed render only ends the post
#[test]
fn test_pipeline_error_isFatal_shouldSeparateRunAndPostFailures() {
    assert!(PipelineError::Cancelled.is_fatal());
    assert!(!PipelineError::Render(ProviderError::ToolNotFound { tool: "ffmpeg".to_string() }).is_fatal());
    assert!(!PipelineError::Background(ProviderError::ConnectionError("dns".to_string())).is_fatal());
    assert!(!PipelineError::Audio(AudioError::Empty).is_fatal());
    assert!(!PipelineError::InvalidTransition("finalize requested while done".to_string()).is_fatal());
}

/// Wrapped collaborator errors stay reachable as the source
#[test]
fn test_transcription_failure_shouldExposeProviderSource() {
    let error = PipelineError::TranscriptionFailure {
        part: 2,
        source: ProviderError::ToolNotFound { tool: "whisper".to_string() },
    };

    assert_eq!(error.to_string(), "Transcription failed for part 2: Tool not found: whisper");
    let source = error.source().map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("Tool not found: whisper"));
}

/// Test conversion into the application error
#[test]
fn test_app_error_from_shouldWrapPipelineAndProviderErrors() {
    let app_error: AppError = PipelineError::NoQualifyingPost { examined: 4 }.into();
    assert!(matches!(app_error, AppError::Pipeline(_)));
    assert!(app_error.to_string().contains("after examining 4 candidate(s)"));

    let app_error: AppError = ProviderError::InvalidInput("empty text".to_string()).into();
    assert!(matches!(app_error, AppError::Provider(_)));

    let app_error: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(app_error, AppError::Unknown(_)));
}
