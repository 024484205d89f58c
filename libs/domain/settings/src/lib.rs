//! `AnalyzeSettings` (§6.2): the configuration tree the Work Planner expands
//! into `WorkUnit`s and the Job Controller validates before a run starts.
//!
//! Pipeline steps are kept as opaque JSON (`PipelineStep`) here rather than
//! as a typed command enum — the engine treats `.icproj`/`.ictempl` project
//! files as opaque JSON on disk (§6.4), and `imagec-domain-commands` owns
//! the authoritative parsing of a step into a concrete `Command`.

pub mod grouping;
pub mod pipeline;
pub mod project;
pub mod validation;

use imagec_domain_model::Units;
use serde::{Deserialize, Serialize};

pub use grouping::GroupBy;
pub use pipeline::{Pipeline, PipelineMeta, PipelineSetup, PipelineStep};
pub use project::{ClassificationEntry, ProjectSettings};
pub use validation::{validate, SettingsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackHandling {
    EachOne,
    ExactOne,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TStackRange {
    pub start_frame: u32,
    pub end_frame: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageTileSettings {
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageSetup {
    pub z_stack_handling: StackHandling,
    pub t_stack_handling: StackHandling,
    pub t_stack_settings: TStackRange,
    pub image_tile_settings: ImageTileSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalPipelineSetup {
    pub real_sizes_unit: Units,
    pub pixel_size_fallback: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsSettings {
    /// Measurement columns to materialize in exports; kept opaque since the
    /// tabular exporter itself is out of scope.
    pub template: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeSettings {
    pub image_setup: ImageSetup,
    pub pipeline_setup: GlobalPipelineSetup,
    pub project_settings: ProjectSettings,
    pub pipelines: Vec<Pipeline>,
    pub results_settings: ResultsSettings,
}
