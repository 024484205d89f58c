use imagec_domain_model::{PlaneId, TileId};
use imagec_domain_settings::{AnalyzeSettings, Pipeline, StackHandling};
use imagec_infra_planesource::{ImageInventory, SeriesInfo};

use crate::error::PlannerError;
use crate::unit::{WorkUnit, OBJECT_ID_BLOCK_SIZE};

/// Validates the parts of settings the planner itself depends on — tile
/// size and frame range — surfaced as `SETTINGS_INVALID` at
/// `Job Controller::start`, never a panic inside the planner (§4.2).
pub fn validate(settings: &AnalyzeSettings) -> Result<(), PlannerError> {
    let tile = settings.image_setup.image_tile_settings;
    if tile.tile_width == 0 || tile.tile_height == 0 {
        return Err(PlannerError::InvalidTileSize { width: tile.tile_width, height: tile.tile_height });
    }
    let range = settings.image_setup.t_stack_settings;
    if range.start_frame > range.end_frame {
        return Err(PlannerError::InvalidFrameRange { start: range.start_frame, end: range.end_frame });
    }
    Ok(())
}

/// Expands one image's settings + inventory into the totally ordered
/// `WorkUnit` sequence (§4.2). Only series 0 is planned — this engine's
/// settings surface carries no per-pipeline series selector, so every
/// pipeline runs against the image's primary series.
///
/// `ordinal` is threaded through every pipeline rather than restarted at
/// each one, so the `objectId` block each `WorkUnit` is assigned is
/// disjoint across the *whole image*, not just within one pipeline (§3.4
/// invariant I3: an objectId is unique across all of an image's pipelines).
pub fn plan_image(settings: &AnalyzeSettings, inventory: &ImageInventory) -> Result<Vec<WorkUnit>, PlannerError> {
    validate(settings)?;
    let series = inventory.series(0).ok_or(PlannerError::UnknownSeries { series_index: 0 })?;

    let mut units = Vec::new();
    let mut ordinal = 0u64;
    for pipeline in &settings.pipelines {
        if pipeline.meta.disabled {
            continue;
        }
        units.extend(plan_pipeline(settings, series, pipeline, &mut ordinal));
    }
    Ok(units)
}

fn plan_pipeline(settings: &AnalyzeSettings, series: &SeriesInfo, pipeline: &Pipeline, ordinal: &mut u64) -> Vec<WorkUnit> {
    let c_stack = pipeline.pipeline_setup.c_stack_index;
    let z_values = expand_z(settings, series, pipeline);
    let t_values = expand_t(settings, series, pipeline);
    let tiles = expand_tiles(series);

    let mut units = Vec::with_capacity(z_values.len() * t_values.len() * tiles.len());
    for &t in &t_values {
        for &z in &z_values {
            for &tile in &tiles {
                let plane = PlaneId::new(series.series_index, c_stack, z, t);
                units.push(WorkUnit {
                    pipeline_uid: pipeline.meta.uid.clone(),
                    plane,
                    tile,
                    object_id_start: *ordinal * OBJECT_ID_BLOCK_SIZE,
                });
                *ordinal += 1;
            }
        }
    }
    units
}

/// A pipeline with a z-projection consumes the whole z-range as one unit,
/// represented here by a single placeholder `z = 0` (the executor reads the
/// projection with `read_projection`, not `read`, so the value is never
/// used as a concrete z index in that case).
fn expand_z(_settings: &AnalyzeSettings, series: &SeriesInfo, pipeline: &Pipeline) -> Vec<u32> {
    use imagec_domain_model::ZProjection;
    if !matches!(pipeline.pipeline_setup.z_projection, ZProjection::None) {
        return vec![0];
    }
    match _settings.image_setup.z_stack_handling {
        StackHandling::EachOne => (0..series.z_count.max(1)).collect(),
        StackHandling::ExactOne => vec![pipeline.pipeline_setup.z_stack_index],
    }
}

fn expand_t(settings: &AnalyzeSettings, series: &SeriesInfo, pipeline: &Pipeline) -> Vec<u32> {
    match settings.image_setup.t_stack_handling {
        StackHandling::EachOne => {
            let end = settings.image_setup.t_stack_settings.end_frame.min(series.t_count.saturating_sub(1));
            let start = settings.image_setup.t_stack_settings.start_frame.min(end);
            (start..=end).collect()
        }
        StackHandling::ExactOne => vec![pipeline.pipeline_setup.t_stack_index],
    }
}

/// Row-major tile grid: full rows (increasing `tile_x`) before moving to
/// the next `tile_y` (§4.2: "tiles are emitted in row-major order").
fn expand_tiles(series: &SeriesInfo) -> Vec<TileId> {
    let grid = series.tile_grid;
    let tiles_x = series.width.div_ceil(grid.tile_width).max(1);
    let tiles_y = series.height.div_ceil(grid.tile_height).max(1);

    let mut tiles = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for tile_y in 0..tiles_y {
        for tile_x in 0..tiles_x {
            tiles.push(TileId::new(tile_x, tile_y, grid.tile_width, grid.tile_height));
        }
    }
    tiles
}
