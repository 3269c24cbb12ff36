/*!
 * The narration pipeline.
 *
 * Data flows in one direction through these modules:
 * - `qualifier`: picks the first unprocessed post whose narration is long enough
 * - `budget`: derives the target part duration from the narration length
 * - `assembler`: synthesizes sentences and cuts them into titled parts
 * - `captions`: transcribes and normalizes each part's captions
 * - `manifest`: the finished parts of one post
 * - `orchestrator`: runs the steps above and hands manifests to the renderer
 */

pub mod assembler;
pub mod budget;
pub mod captions;
pub mod manifest;
pub mod orchestrator;
pub mod qualifier;

pub use assembler::{AssembledPart, AssemblyState, PartAssembler};
pub use budget::compute_budget;
pub use captions::CaptionGenerator;
pub use manifest::{Manifest, Part};
pub use orchestrator::{Collaborators, PipelineOrchestrator, PipelineSettings, RunReport};
pub use qualifier::{PostQualifier, QualifiedPost};
