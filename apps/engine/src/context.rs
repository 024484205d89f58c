use std::collections::HashMap;
use std::sync::Arc;

use imagec_domain_commands::Segmenter;
use imagec_domain_settings::AnalyzeSettings;
use imagec_infra_planesource::PlaneSource;
use imagec_infra_store::StoreClient;

/// A `Segmenter` is not `Clone`, and every `WorkUnit` that hits a
/// `classifyByMask` step needs its own owned instance, so pipelines that use
/// it are registered with a factory rather than a value.
pub type SegmenterFactory = Arc<dyn Fn() -> Box<dyn Segmenter> + Send + Sync>;

/// Everything one `start()` call needs, gathered explicitly instead of read
/// from process-global state (§9: "scope all mutable state to a JobContext
/// value passed explicitly").
pub struct JobContext {
    pub job_name: String,
    pub settings: AnalyzeSettings,
    /// Absolute paths of the images this run processes, in the order they
    /// are queued. Plate/group rows are derived from `settings` (§6.2's
    /// `projectSettings.plate`/`address` and `groupBy`), not carried per
    /// image — this engine's settings surface describes one plate/well per
    /// run, with `images` standing in for that well's fields of view.
    pub images: Vec<String>,
    pub plane_source: Arc<dyn PlaneSource>,
    pub store: StoreClient,
    pub segmenters: HashMap<String, SegmenterFactory>,
}

impl JobContext {
    pub fn new(
        job_name: impl Into<String>,
        settings: AnalyzeSettings,
        images: Vec<String>,
        plane_source: Arc<dyn PlaneSource>,
        store: StoreClient,
    ) -> Self {
        Self { job_name: job_name.into(), settings, images, plane_source, store, segmenters: HashMap::new() }
    }

    pub fn with_segmenter(mut self, pipeline_uid: impl Into<String>, factory: SegmenterFactory) -> Self {
        self.segmenters.insert(pipeline_uid.into(), factory);
        self
    }
}
