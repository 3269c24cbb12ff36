use futures::stream::BoxStream;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};

use crate::app_config::{Config, RemainderPolicy};
use crate::errors::{AudioError, PipelineError, ProviderError};
use crate::pipeline::assembler::PartAssembler;
use crate::pipeline::budget::compute_budget;
use crate::pipeline::captions::CaptionGenerator;
use crate::pipeline::manifest::Manifest;
use crate::pipeline::qualifier::{PostQualifier, QualifiedPost};
use crate::processed_store::ProcessedStore;
use crate::providers::{
    BackgroundProvider, CandidateFilter, ContentSource, Post, RenderedPart, Renderer, SpeechSynthesizer,
    Transcriber,
};
use crate::segmentation::SentenceSegmenter;

/// External services used by one pipeline run
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub source: Arc<dyn ContentSource>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub background: Arc<dyn BackgroundProvider>,
    pub renderer: Arc<dyn Renderer>,
    pub store: Arc<dyn ProcessedStore>,
}

/// Knobs of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub voice: String,
    pub language: String,
    pub min_narration_secs: f64,
    pub remainder: RemainderPolicy,
    pub posts_per_run: usize,
    pub background_url: String,
    pub filter: CandidateFilter,
    pub show_progress: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            voice: config.speech.voice.clone(),
            language: config.assembly.language.clone(),
            min_narration_secs: config.assembly.min_narration_secs,
            remainder: config.assembly.remainder,
            posts_per_run: config.assembly.posts_per_run,
            background_url: config.background.url.clone(),
            filter: CandidateFilter::from_config(&config.source),
            show_progress: true,
        }
    }
}

/// A post turned into videos
#[derive(Debug, Clone, PartialEq)]
pub struct PostOutcome {
    pub post_id: String,
    pub title: String,
    pub videos: Vec<RenderedPart>,
}

/// A post that was selected but could not be produced
#[derive(Debug, Clone, PartialEq)]
pub struct PostFailure {
    pub post_id: String,
    pub reason: String,
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub produced: Vec<PostOutcome>,
    pub failed: Vec<PostFailure>,
}

impl RunReport {
    /// At least one post made it to video
    pub fn succeeded(&self) -> bool {
        !self.produced.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.produced.len() + self.failed.len()
    }
}

/// Runs qualifier, assembly, captioning and rendering for each selected post
pub struct PipelineOrchestrator {
    collaborators: Collaborators,
    settings: PipelineSettings,
    shutdown: watch::Receiver<bool>,
    background: OnceCell<PathBuf>,
}

impl PipelineOrchestrator {
    /// `shutdown` flipping to `true` cancels the post in progress
    pub fn new(collaborators: Collaborators, settings: PipelineSettings, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            collaborators,
            settings,
            shutdown,
            background: OnceCell::new(),
        }
    }

    /// Produce up to `posts_per_run` posts.
    ///
    /// Fatal errors end the run; a failure of a single post is recorded in
    /// the report and the next candidate is tried.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let segmenter = SentenceSegmenter::for_language(&self.settings.language)?;
        let mut candidates = self.collaborators.source.fetch_candidates(&self.settings.filter);
        let mut report = RunReport::default();

        while report.produced.len() < self.settings.posts_per_run {
            let qualified = match self.cancellable(self.select(&mut candidates)).await {
                Ok(qualified) => qualified,
                Err(PipelineError::NoQualifyingPost { examined }) if report.attempted() > 0 => {
                    info!("No further qualifying post ({} candidate(s) examined)", examined);
                    break;
                }
                Err(e) => return Err(e),
            };

            let post_id = qualified.post.id.clone();
            match self.cancellable(self.produce(&segmenter, qualified)).await {
                Ok(outcome) => {
                    info!(
                        "Post {} done: {} video(s) rendered",
                        outcome.post_id,
                        outcome.videos.len()
                    );
                    report.produced.push(outcome);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Post {} failed: {}", post_id, e);
                    report.failed.push(PostFailure {
                        post_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn select(
        &self,
        candidates: &mut BoxStream<'static, Result<Post, ProviderError>>,
    ) -> Result<QualifiedPost, PipelineError> {
        PostQualifier::new(
            self.collaborators.synthesizer.as_ref(),
            self.collaborators.store.as_ref(),
            &self.settings.voice,
            self.settings.min_narration_secs,
        )
        .select(candidates)
        .await
    }

    /// Assemble, caption, render and mark one qualified post
    async fn produce(&self, segmenter: &SentenceSegmenter, qualified: QualifiedPost) -> Result<PostOutcome, PipelineError> {
        let QualifiedPost { post, narration_secs } = qualified;
        let budget = compute_budget(narration_secs);
        let sentences = segmenter.segment(&post.body);
        info!(
            "Post {}: {:.1}s of narration, {:.1}s per part, {} sentence(s)",
            post.id,
            narration_secs,
            budget,
            sentences.len()
        );

        let progress = self.progress_bar(sentences.len() as u64);
        let assembled = PartAssembler::new(
            self.collaborators.synthesizer.as_ref(),
            &self.settings.voice,
            self.settings.remainder,
        )
        .assemble(&post.title, &sentences, budget, &progress)
        .await;
        progress.finish_and_clear();
        let assembled = assembled?;

        if assembled.is_empty() {
            return Err(PipelineError::Audio(AudioError::Empty));
        }

        let parts = CaptionGenerator::new(self.collaborators.transcriber.as_ref())
            .caption_parts(assembled)
            .await?;
        let manifest = Manifest::new(post, parts);
        info!("Manifest ready: {}", manifest);

        let background = self.background().await?;
        let videos = self
            .collaborators
            .renderer
            .render(&manifest, &background)
            .await
            .map_err(PipelineError::Render)?;

        self.collaborators.store.mark_processed(&manifest.post.id)?;

        Ok(PostOutcome {
            post_id: manifest.post.id,
            title: manifest.post.title,
            videos,
        })
    }

    /// Background video, fetched at most once per run
    async fn background(&self) -> Result<PathBuf, PipelineError> {
        self.background
            .get_or_try_init(|| async {
                self.collaborators
                    .background
                    .fetch(&self.settings.background_url)
                    .await
                    .map_err(PipelineError::Background)
            })
            .await
            .cloned()
    }

    /// Race `task` against the shutdown signal
    async fn cancellable<T, F>(&self, task: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return Err(PipelineError::Cancelled);
        }

        tokio::select! {
            result = task => result,
            _ = wait_for_shutdown(&mut shutdown) => {
                warn!("Shutdown requested, abandoning the post in progress");
                Err(PipelineError::Cancelled)
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sentences ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));
        progress
    }
}

/// Resolves once the flag is `true`; never resolves if the sender is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
