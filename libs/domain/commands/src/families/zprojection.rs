use imagec_domain_model::{Intermediate, SlotType, ZProjection};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Re-derives the active image from the source z-stack using a reducer,
/// independent of whatever image the chain currently holds. `zCount` is the
/// declared depth of the plane's channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ZProjectionCommand {
    pub reducer: ZProjection,
    #[serde(rename = "zCount")]
    pub z_count: u32,
}

impl Command for ZProjectionCommand {
    fn name(&self) -> &'static str {
        "zProjection"
    }

    fn input_type(&self) -> SlotType {
        SlotType::All
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Image
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let image = ctx.plane_source.read_projection(ctx.plane, 0..self.z_count, ctx.tile, self.reducer)?;
        ctx.slot = Intermediate::Image(image);
        Ok(())
    }
}
