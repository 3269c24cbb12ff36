use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info, warn};

use crate::errors::{PipelineError, ProviderError};
use crate::processed_store::ProcessedStore;
use crate::providers::{Post, SpeechSynthesizer};

/// A post long enough to be produced
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedPost {
    pub post: Post,
    /// Duration of the full-body probe narration, in seconds
    pub narration_secs: f64,
}

/// Screens candidates by the length of their synthesized narration
#[derive(Debug)]
pub struct PostQualifier<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    store: &'a dyn ProcessedStore,
    voice: &'a str,
    min_narration_secs: f64,
}

impl<'a> PostQualifier<'a> {
    pub fn new(
        synthesizer: &'a dyn SpeechSynthesizer,
        store: &'a dyn ProcessedStore,
        voice: &'a str,
        min_narration_secs: f64,
    ) -> Self {
        Self {
            synthesizer,
            store,
            voice,
            min_narration_secs,
        }
    }

    /// Pull candidates until one qualifies.
    ///
    /// Already processed and empty posts are skipped without synthesis;
    /// synthesis and source errors are logged and the next candidate is
    /// tried. An exhausted source yields `NoQualifyingPost`.
    pub async fn select(
        &self,
        candidates: &mut BoxStream<'static, Result<Post, ProviderError>>,
    ) -> Result<QualifiedPost, PipelineError> {
        let mut examined = 0usize;

        while let Some(candidate) = candidates.next().await {
            examined += 1;
            let post = match candidate {
                Ok(post) => post,
                Err(e) => {
                    warn!("Skipping unreadable candidate: {}", e);
                    continue;
                }
            };

            if self.store.contains(&post.id) {
                debug!("Skipping already processed post {}", post.id);
                continue;
            }

            if post.body.trim().is_empty() {
                debug!("Skipping post {} with empty body", post.id);
                continue;
            }

            let probe = match self.synthesizer.synthesize(&post.body, self.voice).await {
                Ok(clip) => clip,
                Err(e) => {
                    warn!("Probe synthesis failed for post {}: {}", post.id, e);
                    continue;
                }
            };
            let narration_secs = probe.duration();
            drop(probe);

            if narration_secs >= self.min_narration_secs {
                info!(
                    "Selected post {} '{}' ({:.1}s of narration)",
                    post.id, post.title, narration_secs
                );
                return Ok(QualifiedPost { post, narration_secs });
            }

            debug!(
                "Post {} too short: {:.1}s < {:.1}s",
                post.id, narration_secs, self.min_narration_secs
            );
        }

        Err(PipelineError::NoQualifyingPost { examined })
    }
}
