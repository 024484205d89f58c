//! Demo binary (§6.6): runs one job against a `SyntheticPlaneSource` and a
//! libsql-backed store, printing progress until the run reaches a terminal
//! phase. Concrete image decoders and a GUI/CLI front-end are out of scope
//! (§1); this binary exists to exercise the Job Controller end to end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use imagec_domain_settings::AnalyzeSettings;
use imagec_engine::{JobContext, JobController, Phase};
use imagec_infra_planesource::SyntheticPlaneSource;
use imagec_infra_store::StoreClient;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "imagec-engine", about = "Runs one analyze job against a synthetic plane source")]
struct Args {
    /// Path to an `.icproj`-style JSON file holding an `AnalyzeSettings` tree.
    #[arg(long)]
    settings: String,

    /// Logical image identifiers to queue; the synthetic source ignores
    /// their content and keys every image off the path string alone.
    #[arg(long, default_value = "demo-image-1")]
    image: Vec<String>,

    #[arg(long, default_value = "demo-run")]
    job_name: String,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    imagec_telemetry::init_tracing("imagec_engine");

    let args = Args::parse();

    let db_path = std::env::var("IMAGEC_DB_PATH").unwrap_or_else(|_| ":memory:".to_string());

    let settings_text = std::fs::read_to_string(&args.settings)
        .with_context(|| format!("reading settings file {}", args.settings))?;
    let settings: AnalyzeSettings =
        serde_json::from_str(&settings_text).context("parsing AnalyzeSettings JSON")?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let store = runtime.block_on(StoreClient::connect(&db_path, None)).context("connecting to the store")?;
    drop(runtime);

    let tile = settings.image_setup.image_tile_settings;
    let plane_source = Arc::new(SyntheticPlaneSource::new(2048, 2048, 1, 1, 3, tile.tile_width.max(tile.tile_height)));

    let ctx = JobContext::new(args.job_name, settings, args.image, plane_source, store);
    let controller = JobController::start(ctx).context("starting the job")?;

    loop {
        let state = controller.state();
        info!(
            phase = ?state.phase,
            finished_units = state.finished_units,
            total_units = state.total_units,
            finished_images = state.finished_images,
            total_images = state.total_images,
            "progress"
        );
        match state.phase {
            Phase::Finished | Phase::Stopped | Phase::Failed => break,
            _ => std::thread::sleep(Duration::from_millis(200)),
        }
    }

    controller.join();
    let state = controller.state();
    for error in &state.errors {
        tracing::warn!("{error}");
    }

    if matches!(state.phase, Phase::Failed) {
        std::process::exit(1);
    }
    Ok(())
}
