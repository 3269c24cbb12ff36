/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;
use storyparts::app_config::{Config, Listing, LogLevel, RemainderPolicy, WhisperModel};

fn configured() -> Config {
    let mut config = Config::default();
    config.source.client_id = "client".to_string();
    config.source.client_secret = "secret".to_string();
    config.source.subreddits = vec!["relationships".to_string(), "TwoXChromosomes".to_string()];
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source.listing, Listing::Hot);
    assert_eq!(config.source.page_size, 25);
    assert_eq!(config.speech.voice, "en-US-ChristopherNeural");
    assert_eq!(config.speech.command, "edge-tts");
    assert_eq!(config.transcription.model, WhisperModel::Small);
    assert_eq!(config.transcription.language, "en");
    assert_eq!(config.background.url, "https://www.youtube.com/watch?v=FvSqM5EKEeg");
    assert_eq!((config.render.width, config.render.height), (1080, 1920));
    assert_eq!(config.assembly.min_narration_secs, 60.0);
    assert_eq!(config.assembly.remainder, RemainderPolicy::Flush);
    assert_eq!(config.assembly.posts_per_run, 1);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = configured();
    assert!(config.validate().is_ok());

    // Missing subreddits
    config.source.subreddits = vec!["  ".to_string()];
    assert!(config.validate().is_err());
    config.source.subreddits = vec!["relationships".to_string()];

    // Invalid segmentation language
    config.assembly.language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.assembly.language = "en".to_string();

    // Unparseable background URL
    config.background.url = "not a url".to_string();
    assert!(config.validate().is_err());
    config.background.url = "https://example.com/bg".to_string();

    // Page size out of the listing API range
    config.source.page_size = 101;
    assert!(config.validate().is_err());
    config.source.page_size = 100;

    config.assembly.min_narration_secs = 0.0;
    assert!(config.validate().is_err());
    config.assembly.min_narration_secs = 45.0;

    config.assembly.posts_per_run = 0;
    assert!(config.validate().is_err());
    config.assembly.posts_per_run = 2;

    assert!(config.validate().is_ok());
}

/// A saved config loads back with the same values
#[test]
fn test_config_serialization_shouldRoundTripThroughJson() {
    let mut config = configured();
    config.transcription.model = WhisperModel::Medium;
    config.source.listing = Listing::Top;

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"model\": \"medium\""));
    assert!(json.contains("\"listing\": \"top\""));

    let loaded: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.transcription.model, WhisperModel::Medium);
    assert_eq!(loaded.source.subreddits, config.source.subreddits);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_whisper_model_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(WhisperModel::from_str("LARGE").unwrap(), WhisperModel::Large);
    assert_eq!(WhisperModel::Tiny.to_string(), "tiny");
    assert!(WhisperModel::from_str("huge").is_err());
}

#[test]
fn test_remainder_policy_fromStr_shouldParseBothPolicies() {
    assert_eq!(RemainderPolicy::from_str("discard").unwrap(), RemainderPolicy::Discard);
    assert_eq!(RemainderPolicy::from_str("Flush").unwrap(), RemainderPolicy::Flush);
    assert!(RemainderPolicy::from_str("keep").is_err());
}

#[test]
fn test_listing_as_path_shouldMatchEndpointSegment() {
    assert_eq!(Listing::Rising.as_path(), "rising");
    assert_eq!(Listing::New.as_path(), "new");
}

#[test]
fn test_timeouts_shouldComeFromSeconds() {
    let config = Config::default();
    assert_eq!(config.speech.timeout().as_secs(), config.speech.timeout_secs);
    assert_eq!(config.transcription.timeout().as_secs(), 900);
}
