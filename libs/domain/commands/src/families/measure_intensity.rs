use imagec_core_measure::stats::reduce_intensity;
use imagec_domain_model::{PlaneId, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// For each configured channel, reads that plane and records
/// `{sum, min, max, avg, median, stddev}` under each object's mask into
/// `intensityByChannel`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureIntensityCommand {
    #[serde(rename = "channels")]
    pub channels: Vec<i32>,
}

impl Command for MeasureIntensityCommand {
    fn name(&self) -> &'static str {
        "measureIntensity"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Objects
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Unchanged
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        for &channel in &self.channels {
            let plane = PlaneId { c_stack: channel, ..ctx.plane };
            let image = ctx.plane_source.read(plane, ctx.tile)?;

            let objects = ctx.require_objects_mut(self.name())?;
            for object in objects.iter_mut() {
                let origin = (object.bounding_box.x, object.bounding_box.y);
                let values = object.mask.iter_set_pixels().filter_map(|(x, y)| {
                    let gx = origin.0 + i64::from(x) - image.origin.0;
                    let gy = origin.1 + i64::from(y) - image.origin.1;
                    if gx < 0 || gy < 0 || gx >= i64::from(image.width) || gy >= i64::from(image.height) {
                        return None;
                    }
                    Some(image.get(gx as u32, gy as u32, 0) as f64)
                });
                let stats = reduce_intensity(values);
                object.intensity_by_channel.insert(channel, stats);
            }
        }
        Ok(())
    }
}
