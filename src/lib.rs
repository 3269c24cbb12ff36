/*!
 * # storyparts
 *
 * A Rust library for turning long text posts into narrated, captioned,
 * multi-part short videos.
 *
 * ## Features
 *
 * - Select the first unprocessed post whose narration is long enough
 * - Split the narration into parts of one half or one third of its length,
 *   each announced by the post title and part number
 * - Caption every part with time-aligned, normalized subtitles
 * - Render vertical videos over a looped background clip
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `pipeline`: The narration pipeline:
 *   - `pipeline::qualifier`: Post selection by narration length
 *   - `pipeline::budget`: Part duration budgeting
 *   - `pipeline::assembler`: Part assembly state machine
 *   - `pipeline::captions`: Per-part caption generation
 *   - `pipeline::orchestrator`: End-to-end run with cancellation
 * - `segmentation`: Sentence boundary detection
 * - `audio`: In-memory PCM clips and scratch audio files
 * - `caption_processor`: Caption tracks and SRT handling
 * - `processed_store`: Record of processed posts
 * - `providers`: Collaborator traits and their Reddit, edge-tts, whisper,
 *   yt-dlp and ffmpeg implementations
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod caption_processor;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod processed_store;
pub mod providers;
pub mod segmentation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use audio::AudioClip;
pub use caption_processor::{CaptionEntry, CaptionTrack};
pub use errors::{AppError, AudioError, CaptionError, PipelineError, ProviderError};
pub use language_utils::{get_language_name, normalize_to_part1};
pub use pipeline::{Manifest, Part, PipelineOrchestrator, RunReport, compute_budget};
pub use providers::Post;
pub use segmentation::SentenceSegmenter;
