use imagec_domain_model::{DistanceRecord, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// For each object, finds the nearest object of each configured class in
/// another pipeline's object set on the same plane and records
/// center-center, center-surface (min/max) and surface-surface (min/max)
/// distances. Distances are reported in pixels unless `convertToRealUnits`
/// is set, in which case they are scaled by the image's pixel size.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceCommand {
    #[serde(rename = "otherPipelines")]
    pub other_pipelines: Vec<String>,
    #[serde(rename = "convertToRealUnits", default)]
    pub convert_to_real_units: bool,
}

fn center(bbox: &imagec_core_geometry::BoundingBox) -> (f64, f64) {
    (bbox.x as f64 + bbox.width as f64 / 2.0, bbox.y as f64 + bbox.height as f64 / 2.0)
}

fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn point_to_surface_min_max(point: (f64, f64), surface: &[(i32, i32)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = 0.0f64;
    for &(x, y) in surface {
        let d = euclidean(point, (x as f64, y as f64));
        min = min.min(d);
        max = max.max(d);
    }
    if surface.is_empty() {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

fn surface_to_surface_min_max(a: &[(i32, i32)], b: &[(i32, i32)]) -> (f64, f64) {
    if a.is_empty() || b.is_empty() {
        return (0.0, 0.0);
    }
    let mut min = f64::INFINITY;
    let mut max = 0.0f64;
    for &pa in a {
        for &pb in b {
            let d = euclidean((pa.0 as f64, pa.1 as f64), (pb.0 as f64, pb.1 as f64));
            min = min.min(d);
            max = max.max(d);
        }
    }
    (min, max)
}

impl Command for DistanceCommand {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Objects
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Unchanged
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let mut others = Vec::new();
        for pipeline_uid in &self.other_pipelines {
            if let Some(objects) = ctx.cross_pipeline_objects.get(pipeline_uid) {
                others.extend(objects.iter());
            }
        }

        let scale = if self.convert_to_real_units { ctx.pixel_size.value } else { 1.0 };

        let objects = ctx.require_objects_mut(self.name())?;
        for object in objects.iter_mut() {
            let self_center = center(&object.bounding_box);

            let mut nearest_by_class: std::collections::HashMap<_, (f64, DistanceRecord)> = Default::default();
            for other in &others {
                let other_center = center(&other.bounding_box);
                let center_to_center = euclidean(self_center, other_center);

                let is_better = match nearest_by_class.get(&other.class) {
                    Some((best_so_far, _)) => center_to_center < *best_so_far,
                    None => true,
                };
                if !is_better {
                    continue;
                }

                let (center_to_surface_min, center_to_surface_max) =
                    point_to_surface_min_max(self_center, &other.contour);
                let (surface_to_surface_min, surface_to_surface_max) =
                    surface_to_surface_min_max(&object.contour, &other.contour);

                let record = DistanceRecord {
                    center_to_center: center_to_center * scale,
                    center_to_surface_min: center_to_surface_min * scale,
                    center_to_surface_max: center_to_surface_max * scale,
                    surface_to_surface_min: surface_to_surface_min * scale,
                    surface_to_surface_max: surface_to_surface_max * scale,
                    from_id: object.object_id,
                    to_id: other.object_id,
                };
                nearest_by_class.insert(other.class, (center_to_center, record));
            }

            for (class, (_, record)) in nearest_by_class {
                object.distance_by_class.insert(class, record);
            }
        }
        Ok(())
    }
}
