use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use imagec_core_executor::execute_work_unit;
use imagec_core_measure::{reduce_intensity, MeasurementKey, Statistic};
use imagec_core_planner::{
    estimated_bytes_per_thread, pipeline_depth_factor, plan_image, thread_count, WorkUnit,
};
use imagec_domain_atom::{ClassCompatibility, ObjectAtom};
use imagec_domain_model::{ImageId, Object};
use imagec_domain_settings::validate as validate_settings;
use imagec_infra_planesource::PixelSize;
use imagec_infra_store::{AnalyzeRepository, HierarchyRepository, ImageBatch};

use crate::context::JobContext;
use crate::error::ControllerError;
use crate::memory::free_ram_bytes;
use crate::progress::{Phase, Progress, ProgressSnapshot};

/// A snapshot of `JobController::state()` (§6.5).
#[derive(Debug, Clone)]
pub struct JobState {
    pub phase: Phase,
    pub finished_units: u64,
    pub total_units: u64,
    pub finished_images: u64,
    pub total_images: u64,
    pub errors: Vec<String>,
}

/// Top-level run lifecycle (§4.7). One `JobController` owns one run's
/// `runId`/`analyzeId`, its own dedicated `rayon::ThreadPool`, and a
/// cooperative cancellation flag; nothing here is global, so several
/// controllers (e.g. a batch run and a concurrent preview) can coexist.
pub struct JobController {
    run_id: Uuid,
    analyze_id: Uuid,
    cancel: Arc<AtomicBool>,
    progress: Arc<Progress>,
    errors: Arc<Mutex<Vec<String>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl JobController {
    /// Validates settings, issues `runId`/`analyzeId`, sizes the thread
    /// pool from the Work Planner's fan-out formula, and spawns the worker
    /// thread that drives the run to completion (§4.7).
    #[instrument(skip(ctx))]
    pub fn start(ctx: JobContext) -> Result<Self, ControllerError> {
        if ctx.settings.pipelines.is_empty() {
            return Err(imagec_domain_settings::SettingsError::NoPipelines.into());
        }
        imagec_core_planner::validate(&ctx.settings)?;

        let run_id = Uuid::new_v4();
        let analyze_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(Progress::new());
        progress.set_phase(Phase::Running);
        let errors = Arc::new(Mutex::new(Vec::new()));

        let depth_factor = ctx.settings.pipelines.iter().map(pipeline_depth_factor).max().unwrap_or(1);
        let tile = ctx.settings.image_setup.image_tile_settings;
        let per_thread = estimated_bytes_per_thread(tile.tile_width, tile.tile_height, 4, depth_factor);
        let cpu_cores = num_cpus::get();
        let threads = thread_count(free_ram_bytes(), per_thread, cpu_cores);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("imagec-worker-{i}"))
            .build()
            .expect("thread pool sizes are always >= 1");

        info!(run_id = %run_id, analyze_id = %analyze_id, threads, "job starting");

        let worker_cancel = cancel.clone();
        let worker_progress = progress.clone();
        let worker_errors = errors.clone();
        let handle = std::thread::Builder::new()
            .name("imagec-job-controller".into())
            .spawn(move || {
                run_job(ctx, pool, worker_cancel, worker_progress.clone(), worker_errors, run_id, analyze_id);
            })
            .expect("failed to spawn job controller worker thread");

        Ok(Self { run_id, analyze_id, cancel, progress, errors, handle: Mutex::new(Some(handle)) })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn analyze_id(&self) -> Uuid {
        self.analyze_id
    }

    /// Requests cooperative cancellation (§5); workers observe the flag
    /// between WorkUnits and between pipelines within an image.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> JobState {
        let ProgressSnapshot { phase, finished_units, total_units, finished_images, total_images } =
            self.progress.snapshot();
        JobState {
            phase,
            finished_units,
            total_units,
            finished_images,
            total_images,
            errors: self.errors.lock().expect("errors mutex poisoned").clone(),
        }
    }

    /// Blocks until the worker thread has driven the run to a terminal
    /// phase. Not part of the external API (§6.5 is callback/poll-based);
    /// exists for the demo binary and integration tests.
    pub fn join(&self) {
        if let Some(handle) = self.handle.lock().expect("handle mutex poisoned").take() {
            let _ = handle.join();
        }
    }
}

fn parse_well_address(address: &str) -> (i64, i64) {
    let mut well_y: i64 = 0;
    let mut rest = address;
    for (index, ch) in address.char_indices() {
        if ch.is_ascii_alphabetic() {
            well_y = well_y * 26 + i64::from(ch.to_ascii_uppercase() as u8 - b'A' + 1);
            rest = &address[index + ch.len_utf8()..];
        } else {
            break;
        }
    }
    let well_x: i64 = rest.parse().unwrap_or(0);
    (well_x, well_y.saturating_sub(1))
}

fn tile_nr(tile: imagec_domain_model::TileId) -> i64 {
    (i64::from(tile.tile_y) << 32) | i64::from(tile.tile_x)
}

fn run_job(
    ctx: JobContext,
    pool: ThreadPool,
    cancel: Arc<AtomicBool>,
    progress: Arc<Progress>,
    errors: Arc<Mutex<Vec<String>>>,
    run_id: Uuid,
    analyze_id: Uuid,
) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build the job controller's store runtime");

    progress.set_total_images(ctx.images.len() as u64);
    let compat = ClassCompatibility::from_pairs(ctx.settings.project_settings.tracking_compatibility.iter().copied());
    let plate_id = ctx.settings.project_settings.plate.clone();
    let (well_x, well_y) = parse_well_address(&ctx.settings.project_settings.address);
    let pixel_size =
        PixelSize { value: ctx.settings.pipeline_setup.pixel_size_fallback, unit: ctx.settings.pipeline_setup.real_sizes_unit };

    let created_at = chrono::Utc::now().to_rfc3339();
    let settings_json = serde_json::to_string(&ctx.settings).expect("AnalyzeSettings always serializes");
    let begin_result = runtime.block_on(async {
        let connection = ctx.store.connection()?;
        AnalyzeRepository::new(&connection)
            .begin(&analyze_id.to_string(), &run_id.to_string(), &ctx.job_name, &created_at, &settings_json)
            .await?;
        HierarchyRepository::new(&connection).ensure_plate(&plate_id, &analyze_id.to_string(), "").await
    });
    if let Err(err) = begin_result {
        warn!(run_id = %run_id, %err, "RESULT_WRITE_FAILED opening the run");
        errors.lock().expect("errors mutex poisoned").push(format!("RESULT_WRITE_FAILED: {err}"));
        progress.set_phase(Phase::Failed);
        return;
    }

    for image_path in &ctx.images {
        if cancel.load(Ordering::SeqCst) {
            info!(run_id = %run_id, "cancellation observed before the next image");
            progress.set_phase(Phase::Stopped);
            return;
        }

        match process_image(
            &ctx,
            &pool,
            &runtime,
            &cancel,
            &progress,
            &compat,
            image_path,
            &run_id,
            &plate_id,
            well_x,
            well_y,
            pixel_size,
        ) {
            ImageOutcome::Committed => progress.increment_finished_images(),
            ImageOutcome::Invalid(message) => {
                errors.lock().expect("errors mutex poisoned").push(message);
                progress.increment_finished_images();
            }
            ImageOutcome::Cancelled => {
                info!(run_id = %run_id, image = %image_path, "cancellation observed before commit");
                progress.set_phase(Phase::Stopped);
                return;
            }
            ImageOutcome::Fatal(message) => {
                warn!(run_id = %run_id, image = %image_path, %message, "RESULT_WRITE_FAILED");
                errors.lock().expect("errors mutex poisoned").push(message);
                progress.set_phase(Phase::Failed);
                return;
            }
        }
    }

    progress.set_phase(Phase::Finished);
}

enum ImageOutcome {
    Committed,
    Invalid(String),
    Cancelled,
    Fatal(String),
}

#[allow(clippy::too_many_arguments)]
fn process_image(
    ctx: &JobContext,
    pool: &ThreadPool,
    runtime: &tokio::runtime::Runtime,
    cancel: &Arc<AtomicBool>,
    progress: &Progress,
    compat: &ClassCompatibility,
    image_path: &str,
    run_id: &Uuid,
    plate_id: &str,
    well_x: i64,
    well_y: i64,
    pixel_size: PixelSize,
) -> ImageOutcome {
    let image_id = ImageId::derive(&run_id.to_string(), image_path);

    let inventory = match ctx.plane_source.enumerate(image_path) {
        Ok(inventory) => inventory,
        Err(err) => return ImageOutcome::Invalid(format!("DECODE_ERROR: {image_path}: {err}")),
    };
    let Some(series) = inventory.series(0) else {
        return ImageOutcome::Invalid(format!("PLANE_OUT_OF_RANGE: {image_path}: no series 0 in inventory"));
    };

    if let Err(err) = validate_settings(&ctx.settings, series.c_count) {
        return ImageOutcome::Invalid(format!("SETTINGS_INVALID: {image_path}: {err}"));
    }

    let units = match plan_image(&ctx.settings, &inventory) {
        Ok(units) => units,
        Err(err) => return ImageOutcome::Invalid(format!("SETTINGS_INVALID: {image_path}: {err}")),
    };
    progress.add_total_units(units.len() as u64);

    let mut atom = ObjectAtom::new();
    let mut cross_pipeline_objects: HashMap<String, Vec<Object>> = HashMap::new();

    for pipeline in &ctx.settings.pipelines {
        if pipeline.meta.disabled {
            continue;
        }
        if cancel.load(Ordering::SeqCst) {
            return ImageOutcome::Cancelled;
        }

        let pipeline_units: Vec<&WorkUnit> = units.iter().filter(|unit| unit.pipeline_uid == pipeline.meta.uid).collect();
        let segmenter_factory = ctx.segmenters.get(&pipeline.meta.uid);
        let z_range = 0..series.z_count.max(1);

        let results: Vec<Result<Vec<Object>, imagec_core_executor::ExecutorError>> = pool.install(|| {
            pipeline_units
                .par_iter()
                .map(|unit| {
                    let segmenter = segmenter_factory.map(|factory| factory());
                    execute_work_unit(pipeline, unit, z_range.clone(), ctx.plane_source.as_ref(), pixel_size, &cross_pipeline_objects, segmenter)
                })
                .collect()
        });

        let mut pipeline_objects = Vec::new();
        let mut failure = None;
        for result in results {
            progress.increment_finished_units();
            match result {
                Ok(objects) => pipeline_objects.extend(objects),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        atom.insert_pipeline_objects(pipeline.meta.uid.clone(), pipeline_objects.clone());
        cross_pipeline_objects.insert(pipeline.meta.uid.clone(), pipeline_objects);

        if let Some(err) = failure {
            let kind = match &err {
                imagec_core_executor::ExecutorError::TypeContractViolation { .. } => "TYPE_CONTRACT_VIOLATION",
                imagec_core_executor::ExecutorError::PlaneSource(_) => "DECODE_ERROR",
                _ => "SEGMENTATION_FAILED",
            };
            return ImageOutcome::Invalid(format!("{kind}: {image_path}: {err}"));
        }
    }

    atom.assign_tracking_ids(compat);
    let objects = atom.drain();

    let group_id = ctx.settings.project_settings.group_by.group_key(image_path).unwrap_or_else(|| "default".to_string());

    let persisted = runtime.block_on(persist_image(
        ctx,
        image_id,
        image_path,
        series.width,
        series.height,
        inventory.series.len() as u32,
        plate_id,
        &group_id,
        well_x,
        well_y,
        &objects,
        &units,
        cancel,
    ));

    match persisted {
        Ok(true) => ImageOutcome::Committed,
        Ok(false) => ImageOutcome::Cancelled,
        Err(err) => ImageOutcome::Fatal(format!("RESULT_WRITE_FAILED: {image_path}: {err}")),
    }
}

/// Returns `Ok(true)` on commit, `Ok(false)` when cancellation was observed
/// just before commit (the batch is rolled back instead; §5's "the sink's
/// beginAnalyze row is retained so that partial progress is visible").
#[allow(clippy::too_many_arguments)]
async fn persist_image(
    ctx: &JobContext,
    image_id: ImageId,
    image_path: &str,
    width: u32,
    height: u32,
    series_count: u32,
    plate_id: &str,
    group_id: &str,
    well_x: i64,
    well_y: i64,
    objects: &[Object],
    units: &[WorkUnit],
    cancel: &Arc<AtomicBool>,
) -> Result<bool, imagec_infra_store::SinkError> {
    let connection = ctx.store.connection()?;
    HierarchyRepository::new(&connection).ensure_group(group_id, plate_id, well_x, well_y, group_id).await?;

    let batch = ImageBatch::begin(&connection, image_id).await?;
    batch.ensure_image_row(group_id, image_path, width, height, series_count).await?;

    let mut planes: HashSet<(i32, u32, u32)> = HashSet::new();
    for unit in units {
        planes.insert((unit.plane.c_stack, unit.plane.z_stack, unit.plane.t_stack));
    }
    for (c_stack, z_stack, t_stack) in planes {
        let validity = objects
            .iter()
            .filter(|object| (object.plane.c_stack, object.plane.z_stack, object.plane.t_stack) == (c_stack, z_stack, t_stack))
            .fold(0u32, |acc, object| acc | object.validity.bits() as u32);
        batch.ensure_channel_row(c_stack, z_stack, t_stack, i64::from(validity), None).await?;
    }

    for object in objects {
        batch.append_object(object, tile_nr(object.tile)).await?;
    }

    let mut tiles: HashSet<(i32, imagec_domain_model::TileId)> = HashSet::new();
    for unit in units {
        tiles.insert((unit.plane.c_stack, unit.tile));
    }
    for (c_stack, tile) in tiles {
        let matching: Vec<&Object> = objects
            .iter()
            .filter(|object| {
                object.plane.c_stack == c_stack
                    && object.tile == tile
                    && object.validity.is_valid()
                    && object.intensity_by_channel.contains_key(&c_stack)
            })
            .collect();
        let count = matching.len() as u64;
        let avgs = matching.iter().filter_map(|object| object.intensity_by_channel.get(&c_stack)).map(|stats| stats.avg);
        let reduced = reduce_intensity(avgs);
        let base_key =
            MeasurementKey { measure_channel: c_stack.max(0) as u16, stats: Statistic::Avg, cross_channel_stack: -1, intersecting_channel: -1 };
        batch.append_image_stats(c_stack, tile_nr(tile), count, base_key, &reduced).await?;
    }

    if cancel.load(Ordering::SeqCst) {
        batch.rollback().await?;
        return Ok(false);
    }

    batch.commit().await?;
    Ok(true)
}
