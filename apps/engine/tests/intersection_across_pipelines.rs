mod common;

use imagec_engine::{JobController, Phase};
use imagec_infra_planesource::SyntheticPlaneSource;

/// A second pipeline's `intersecting` step reads the first pipeline's object
/// list through `cross_pipeline_objects` (§4.3/§4.6) once the first pipeline
/// has run to completion for that image.
#[test]
fn a_later_pipeline_sees_an_earlier_pipelines_objects() {
    let nuclei = common::threshold_pipeline(
        "nuclei",
        0,
        vec![
            ("threshold", serde_json::json!({"mode": "MANUAL", "manualValue": 1.0})),
            ("objectFilter", serde_json::json!({"imageWidth": 64, "imageHeight": 64})),
        ],
    );
    let membrane = common::threshold_pipeline(
        "membrane",
        0,
        vec![
            ("threshold", serde_json::json!({"mode": "MANUAL", "manualValue": 1.0})),
            ("objectFilter", serde_json::json!({"imageWidth": 64, "imageHeight": 64})),
            ("intersecting", serde_json::json!({"otherPipelines": ["nuclei"], "minOverlapFraction": 0.0})),
        ],
    );

    let settings = common::settings_with(64, vec![nuclei, membrane]);
    let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = runtime.block_on(common::memory_store());
    let ctx = common::context("intersection", settings, vec!["image-a".into()], source, store);

    let controller = JobController::start(ctx).expect("settings validate");
    controller.join();
    let state = controller.state();

    assert_eq!(state.phase, Phase::Finished);
    assert!(state.errors.is_empty(), "unexpected errors: {:?}", state.errors);
    assert_eq!(state.total_units, 2);
}
