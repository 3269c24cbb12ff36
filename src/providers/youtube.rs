use async_trait::async_trait;
use log::info;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::app_config::BackgroundConfig;
use crate::errors::ProviderError;
use crate::providers::{BackgroundProvider, run_tool};

/// Background video download through `yt-dlp`, cached by video id
#[derive(Debug, Clone)]
pub struct YtDlpBackground {
    config: BackgroundConfig,
}

impl YtDlpBackground {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Cache file for the video at `url`
    pub fn cache_path(&self, url: &str) -> Result<PathBuf, ProviderError> {
        Ok(self.config.directory.join(format!("{}.mp4", video_id(url)?)))
    }
}

/// Stable identifier of a video URL: the `v` query parameter for YouTube
/// watch links, otherwise the last path segment.
pub fn video_id(url: &str) -> Result<String, ProviderError> {
    let parsed = Url::parse(url)
        .map_err(|e| ProviderError::InvalidInput(format!("background URL '{}': {}", url, e)))?;

    if let Some((_, v)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        if !v.is_empty() {
            return Ok(v.into_owned());
        }
    }

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.trim_end_matches(".mp4").to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::InvalidInput(format!("cannot derive a video id from '{}'", url)))
}

#[async_trait]
impl BackgroundProvider for YtDlpBackground {
    async fn fetch(&self, url: &str) -> Result<PathBuf, ProviderError> {
        let target = self.cache_path(url)?;
        if target.is_file() {
            info!("Using cached background video {:?}", target);
            return Ok(target);
        }

        tokio::fs::create_dir_all(&self.config.directory).await?;
        info!("Downloading background video from {}", url);

        let args: Vec<OsString> = vec![
            "--format".into(),
            "bestvideo[height<=1080][ext=mp4]".into(),
            "--no-playlist".into(),
            "--quiet".into(),
            "--output".into(),
            target.as_os_str().to_owned(),
            url.into(),
        ];
        run_tool(&self.config.command, &args, Duration::from_secs(self.config.timeout_secs)).await?;

        if !target.is_file() {
            return Err(ProviderError::ToolFailed {
                tool: self.config.command.clone(),
                status: "exit status: 0".to_string(),
                stderr: format!("expected output {:?} was not written", target),
            });
        }

        info!("Background video saved to {:?}", target);
        Ok(target)
    }
}
