use imagec_domain_model::SlotType;
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// For each object in the active pipeline, records the other pipelines'
/// objects that overlap it by at least `minOverlapFraction` of its own
/// area into `intersectingByClass`, keyed by the other object's class.
#[derive(Debug, Clone, Deserialize)]
pub struct IntersectingCommand {
    #[serde(rename = "otherPipelines")]
    pub other_pipelines: Vec<String>,
    #[serde(rename = "minOverlapFraction")]
    pub min_overlap_fraction: f64,
}

impl Command for IntersectingCommand {
    fn name(&self) -> &'static str {
        "intersecting"
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

        let objects = ctx.require_objects_mut(self.name())?;
        for object in objects.iter_mut() {
            let self_origin = (object.bounding_box.x, object.bounding_box.y);
            let self_area = object.mask.count_set().max(1);

            for other in &others {
                let other_origin = (other.bounding_box.x, other.bounding_box.y);
                let overlap = object.mask.intersection_count(self_origin, &other.mask, other_origin);
                let fraction = overlap as f64 / self_area as f64;
                if fraction >= self.min_overlap_fraction {
                    object.intersecting_by_class.entry(other.class).or_default().push(other.object_id);
                }
            }
        }
        Ok(())
    }
}
