mod common;

use imagec_engine::{JobController, Phase};
use imagec_infra_planesource::SyntheticPlaneSource;

/// A one-step threshold+filter pipeline against a single 64x64 tile run to
/// completion and leaves a committed object row set behind.
#[test]
fn single_channel_threshold_run_finishes() {
    let pipeline = common::threshold_pipeline(
        "nuclei",
        0,
        vec![
            ("threshold", serde_json::json!({"mode": "MANUAL", "manualValue": 1.0})),
            ("objectFilter", serde_json::json!({"imageWidth": 64, "imageHeight": 64})),
        ],
    );
    let settings = common::settings_with(64, vec![pipeline]);
    let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = runtime.block_on(common::memory_store());
    let ctx = common::context("single-channel", settings, vec!["image-a".into()], source, store.clone());

    let controller = JobController::start(ctx).expect("settings validate");
    controller.join();
    let state = controller.state();

    assert_eq!(state.phase, Phase::Finished);
    assert!(state.errors.is_empty(), "unexpected errors: {:?}", state.errors);
    assert_eq!(state.finished_images, 1);

    let connection = store.connection().unwrap();
    let count: i64 = runtime.block_on(async {
        let mut rows = connection.query("SELECT COUNT(*) FROM image", ()).await.unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    });
    assert_eq!(count, 1);
}
