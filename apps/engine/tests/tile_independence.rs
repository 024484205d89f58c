mod common;

use imagec_engine::{JobController, Phase};
use imagec_infra_planesource::SyntheticPlaneSource;

/// Tiling a 1024x1024 plane into 256px tiles fans a pipeline out into
/// multiple WorkUnits (§4.2); each tile is processed independently and the
/// run still reaches Finished with every unit accounted for.
#[test]
fn tiled_plane_processes_every_tile_independently() {
    let pipeline = common::threshold_pipeline(
        "nuclei",
        0,
        vec![
            ("threshold", serde_json::json!({"mode": "MANUAL", "manualValue": 1.0})),
            ("objectFilter", serde_json::json!({"imageWidth": 256, "imageHeight": 256})),
        ],
    );
    let settings = common::settings_with(256, vec![pipeline]);
    let source = SyntheticPlaneSource::new(1024, 1024, 1, 1, 1, 256);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = runtime.block_on(common::memory_store());
    let ctx = common::context("tiled", settings, vec!["image-a".into()], source, store);

    let controller = JobController::start(ctx).expect("settings validate");
    controller.join();
    let state = controller.state();

    assert_eq!(state.phase, Phase::Finished);
    assert!(state.errors.is_empty(), "unexpected errors: {:?}", state.errors);
    // 1024 / 256 = 4 tiles per axis.
    assert_eq!(state.total_units, 16);
    assert_eq!(state.finished_units, 16);
}
