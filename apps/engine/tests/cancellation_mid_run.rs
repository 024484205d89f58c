mod common;

use imagec_engine::{JobController, Phase};
use imagec_infra_planesource::SyntheticPlaneSource;

/// `stop()` is cooperative (§5): the run either finishes before the flag is
/// observed, or stops with fewer images committed than were queued. Either
/// way the terminal phase is never `Failed` and no error is recorded for
/// the cancellation itself.
#[test]
fn stop_after_start_yields_a_consistent_partial_or_complete_run() {
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
    let images: Vec<String> = (0..100).map(|i| format!("image-{i}")).collect();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = runtime.block_on(common::memory_store());
    let ctx = common::context("cancellation", settings, images, source, store.clone());

    let controller = JobController::start(ctx).expect("settings validate");
    controller.stop();
    controller.join();
    let state = controller.state();

    assert!(matches!(state.phase, Phase::Finished | Phase::Stopped));
    assert!(state.finished_images <= state.total_images);
    assert!(state.errors.iter().all(|e| !e.contains("CANCELLED")));

    let connection = store.connection().unwrap();
    let committed_images: i64 = runtime.block_on(async {
        let mut rows = connection.query("SELECT COUNT(*) FROM image", ()).await.unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    });
    assert_eq!(committed_images as u64, state.finished_images.saturating_sub(state.errors.len() as u64));
}
