use imagec_domain_model::{ClassId, ZProjection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub uid: String,
    pub name: String,
    pub disabled: bool,
    pub locked: bool,
    pub notes: String,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSetup {
    /// `-1` when the pipeline is channel-agnostic (consumes only other
    /// pipelines' objects via cross-channel commands).
    pub c_stack_index: i32,
    pub z_projection: ZProjection,
    pub z_stack_index: u32,
    pub t_stack_index: u32,
    pub default_class_id: ClassId,
}

/// One step of a pipeline's command chain, kept as opaque JSON; parsed into
/// a concrete `Command` by `imagec-domain-commands`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub kind: String,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub meta: PipelineMeta,
    pub pipeline_setup: PipelineSetup,
    pub pipeline_steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn is_channel_agnostic(&self) -> bool {
        self.pipeline_setup.c_stack_index < 0
    }
}
