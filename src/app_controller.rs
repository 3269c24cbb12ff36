use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::pipeline::orchestrator::{Collaborators, PipelineOrchestrator, PipelineSettings, RunReport};
use crate::processed_store::DirectoryStore;
use crate::providers::edge_tts::EdgeTts;
use crate::providers::ffmpeg::FfmpegRenderer;
use crate::providers::reddit::RedditSource;
use crate::providers::whisper::WhisperCli;
use crate::providers::youtube::YtDlpBackground;

// @module: Application controller wiring configuration, collaborators and shutdown

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Production collaborators: Reddit, edge-tts, whisper, yt-dlp, ffmpeg
    pub fn collaborators(&self) -> Result<Collaborators> {
        FileManager::ensure_dir(&self.config.output_dir)?;

        Ok(Collaborators {
            source: Arc::new(RedditSource::new(&self.config.source)),
            synthesizer: Arc::new(EdgeTts::new(&self.config.speech)),
            transcriber: Arc::new(WhisperCli::new(&self.config.transcription)),
            background: Arc::new(YtDlpBackground::new(&self.config.background)),
            renderer: Arc::new(FfmpegRenderer::new(&self.config.render, &self.config.output_dir)),
            store: Arc::new(DirectoryStore::new(&self.config.output_dir)),
        })
    }

    /// Run the pipeline with production collaborators; Ctrl-C cancels the
    /// post in progress
    pub async fn run(&self) -> Result<RunReport> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after cleanup");
                let _ = shutdown_tx.send(true);
            }
        });

        let collaborators = self.collaborators()?;
        let result = self.run_with(collaborators, shutdown_rx, true).await;
        signal_task.abort();

        result.context("Pipeline run failed")
    }

    /// Run the pipeline with the given collaborators and shutdown signal
    pub async fn run_with(
        &self,
        collaborators: Collaborators,
        shutdown: watch::Receiver<bool>,
        show_progress: bool,
    ) -> Result<RunReport, PipelineError> {
        let start_time = Instant::now();
        let mut settings = PipelineSettings::from_config(&self.config);
        settings.show_progress = show_progress;

        let report = PipelineOrchestrator::new(collaborators, settings, shutdown).run().await?;

        for outcome in &report.produced {
            for video in &outcome.videos {
                info!("Part {}: {}", video.index, video.path.display());
            }
        }
        for failure in &report.failed {
            warn!("Post {} was not produced: {}", failure.post_id, failure.reason);
        }
        info!(
            "Run finished in {}: {} post(s) produced, {} failed",
            Self::format_duration(start_time.elapsed()),
            report.produced.len(),
            report.failed.len()
        );

        Ok(report)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
