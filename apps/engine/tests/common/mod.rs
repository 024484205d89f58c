use std::sync::Arc;

use imagec_domain_model::{ClassId, Units, ZProjection};
use imagec_domain_settings::{
    AnalyzeSettings, ClassificationEntry, GlobalPipelineSetup, GroupBy, ImageSetup,
    ImageTileSettings, Pipeline, PipelineMeta, PipelineSetup, PipelineStep, ResultsSettings,
    StackHandling, TStackRange,
};
use imagec_engine::JobContext;
use imagec_infra_planesource::SyntheticPlaneSource;
use imagec_infra_store::StoreClient;

pub fn threshold_pipeline(uid: &str, c_stack: i32, steps: Vec<(&str, serde_json::Value)>) -> Pipeline {
    Pipeline {
        meta: PipelineMeta { uid: uid.into(), name: uid.into(), disabled: false, locked: false, notes: String::new(), history: vec![] },
        pipeline_setup: PipelineSetup {
            c_stack_index: c_stack,
            z_projection: ZProjection::None,
            z_stack_index: 0,
            t_stack_index: 0,
            default_class_id: ClassId(0),
        },
        pipeline_steps: steps.into_iter().map(|(kind, params)| PipelineStep { kind: kind.into(), params }).collect(),
    }
}

pub fn settings_with(tile: u32, pipelines: Vec<Pipeline>) -> AnalyzeSettings {
    AnalyzeSettings {
        image_setup: ImageSetup {
            z_stack_handling: StackHandling::ExactOne,
            t_stack_handling: StackHandling::ExactOne,
            t_stack_settings: TStackRange { start_frame: 0, end_frame: 0 },
            image_tile_settings: ImageTileSettings { tile_width: tile, tile_height: tile },
        },
        pipeline_setup: GlobalPipelineSetup { real_sizes_unit: Units::Micrometer, pixel_size_fallback: 1.0 },
        project_settings: imagec_domain_settings::ProjectSettings {
            plate: "plate-1".into(),
            address: "A1".into(),
            experiment: "exp".into(),
            classification: imagec_domain_settings::project::Classification {
                classes: vec![ClassificationEntry { class_id: ClassId(0), name: "nucleus".into(), color: "#fff".into(), default_measurements: vec![] }],
            },
            working_directory: "/tmp".into(),
            group_by: GroupBy::Off,
            tracking_compatibility: vec![],
        },
        pipelines,
        results_settings: ResultsSettings { template: serde_json::json!({}) },
    }
}

pub async fn memory_store() -> StoreClient {
    StoreClient::connect(":memory:", None).await.expect("in-memory store connects")
}

pub fn context(
    job_name: &str,
    settings: AnalyzeSettings,
    images: Vec<String>,
    source: SyntheticPlaneSource,
    store: StoreClient,
) -> JobContext {
    JobContext::new(job_name, settings, images, Arc::new(source), store)
}
