use imagec_domain_model::SlotType;
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Reads another channel's plane at the same (z, t, tile) and subtracts it
/// pixel-wise from the active image, clamped at 0.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtractChannelCommand {
    #[serde(rename = "sourceChannel")]
    pub source_channel: i32,
}

impl Command for SubtractChannelCommand {
    fn name(&self) -> &'static str {
        "subtractChannel"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Image
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Image
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let plane = imagec_domain_model::PlaneId { c_stack: self.source_channel, ..ctx.plane };
        let subtrahend = ctx.plane_source.read(plane, ctx.tile)?;
        let image = ctx.require_image_mut(self.name())?;
        for channel in 0..image.channels {
            for y in 0..image.height {
                for x in 0..image.width {
                    let value = (image.get(x, y, channel) - subtrahend.get(x, y, 0)).max(0.0);
                    image.set(x, y, channel, value);
                }
            }
        }
        Ok(())
    }
}
