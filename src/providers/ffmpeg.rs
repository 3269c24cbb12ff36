use async_trait::async_trait;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::RenderConfig;
use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::pipeline::manifest::{Manifest, Part};
use crate::providers::{RenderedPart, Renderer, run_tool};

/// Renders each part over a looped, vertically cropped background video
/// with burned-in captions
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    config: RenderConfig,
    output_dir: PathBuf,
}

impl FfmpegRenderer {
    pub fn new(config: &RenderConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: config.clone(),
            output_dir: output_dir.into(),
        }
    }

    /// Video filter: center crop to 9:16, scale, burn captions
    fn video_filter(&self, captions: &Path) -> String {
        format!(
            "crop=ih*9/16:ih,scale={}:{},subtitles={}:force_style='Alignment=10,FontSize=16,Bold=1,Outline=2'",
            self.config.width,
            self.config.height,
            escape_filter_path(captions)
        )
    }

    fn build_args(&self, background: &Path, audio: &Path, captions: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-stream_loop".into(),
            "-1".into(),
            "-i".into(),
            background.as_os_str().to_owned(),
            "-i".into(),
            audio.as_os_str().to_owned(),
            "-vf".into(),
            self.video_filter(captions).into(),
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "1:a:0".into(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            "-shortest".into(),
            output.as_os_str().to_owned(),
        ]
    }

    async fn render_parts(&self, dir: &Path, manifest: &Manifest, background: &Path) -> Result<Vec<RenderedPart>, ProviderError> {
        let mut rendered = Vec::with_capacity(manifest.parts.len());
        for part in &manifest.parts {
            rendered.push(self.render_part(dir, &manifest.post.title, part, background).await?);
        }
        Ok(rendered)
    }

    async fn render_part(&self, post_dir: &Path, title: &str, part: &Part, background: &Path) -> Result<RenderedPart, ProviderError> {
        let audio_path = FileManager::part_audio_path(post_dir, part.index);
        let captions_path = FileManager::part_captions_path(post_dir, part.index);
        let output = FileManager::part_video_path(post_dir, title, part.index);

        part.audio.write_wav(&audio_path)?;
        tokio::fs::write(&captions_path, part.captions.to_srt_string()).await?;

        let args = self.build_args(background, &audio_path, &captions_path, &output);
        let result = run_tool(&self.config.ffmpeg_command, &args, Duration::from_secs(self.config.timeout_secs)).await;

        if !self.config.keep_intermediate {
            FileManager::remove_if_exists(&audio_path);
            FileManager::remove_if_exists(&captions_path);
        }
        result?;

        debug!("Rendered part {} to {:?}", part.index, output);
        Ok(RenderedPart {
            index: part.index,
            path: output,
        })
    }
}

/// Escape a path for use as a filter option value inside a filtergraph
pub fn escape_filter_path(path: &Path) -> String {
    let mut escaped = String::new();
    for c in path.to_string_lossy().chars() {
        match c {
            '\\' => escaped.push('/'),
            ':' | '\'' | ',' | '[' | ']' | ';' | '=' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(&self, manifest: &Manifest, background: &Path) -> Result<Vec<RenderedPart>, ProviderError> {
        let post_dir = FileManager::post_dir(&self.output_dir, &manifest.post.id);
        if FileManager::dir_exists(&post_dir) {
            return self.render_parts(&post_dir, manifest, background).await;
        }

        // The post directory doubles as the processed marker: it only appears
        // once every part is rendered. A failed or abandoned render drops the
        // staging directory with its partial files.
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", manifest.post.id))
            .tempdir_in(&self.output_dir)?;
        let rendered = self.render_parts(staging.path(), manifest, background).await?;
        tokio::fs::rename(staging.path(), &post_dir).await?;

        info!("Rendered {} parts to {:?}", rendered.len(), post_dir);
        Ok(rendered
            .into_iter()
            .map(|part| RenderedPart {
                path: FileManager::part_video_path(&post_dir, &manifest.post.title, part.index),
                index: part.index,
            })
            .collect())
    }
}
