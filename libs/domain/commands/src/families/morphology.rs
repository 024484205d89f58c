use imagec_core_geometry::Mask;
use imagec_domain_model::{BinaryMask, Intermediate, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MorphologyOp {
    Dilate,
    Erode,
    Open,
    Close,
}

/// Binary morphology with a disk structuring element of `radius` pixels,
/// repeated `iterations` times. `Open` and `Close` are erode-then-dilate and
/// dilate-then-erode respectively, each pair run once per iteration.
#[derive(Debug, Clone, Deserialize)]
pub struct MorphologyCommand {
    pub op: MorphologyOp,
    pub radius: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_iterations() -> u32 {
    1
}

fn disk_offsets(radius: u32) -> Vec<(i32, i32)> {
    let r = radius as i32;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

fn dilate(mask: &Mask, offsets: &[(i32, i32)]) -> Mask {
    let mut out = Mask::empty(mask.width(), mask.height());
    for (x, y) in mask.iter_set_pixels() {
        for (dx, dy) in offsets {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx >= 0 && ny >= 0 && nx < mask.width() as i32 && ny < mask.height() as i32 {
                out.set(nx as u32, ny as u32, true);
            }
        }
    }
    out
}

fn erode(mask: &Mask, offsets: &[(i32, i32)]) -> Mask {
    let mut out = Mask::empty(mask.width(), mask.height());
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            let all_set = offsets.iter().all(|(dx, dy)| {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                nx >= 0 && ny >= 0 && nx < mask.width() as i32 && ny < mask.height() as i32 && mask.get(nx as u32, ny as u32)
            });
            if all_set {
                out.set(x, y, true);
            }
        }
    }
    out
}

impl Command for MorphologyCommand {
    fn name(&self) -> &'static str {
        "morphology"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Binary
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Binary
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let offsets = disk_offsets(self.radius);
        let binary = ctx.require_binary(self.name())?;
        let mut mask = binary.mask.clone();
        let origin = binary.origin;

        for _ in 0..self.iterations.max(1) {
            mask = match self.op {
                MorphologyOp::Dilate => dilate(&mask, &offsets),
                MorphologyOp::Erode => erode(&mask, &offsets),
                MorphologyOp::Open => dilate(&erode(&mask, &offsets), &offsets),
                MorphologyOp::Close => erode(&dilate(&mask, &offsets), &offsets),
            };
        }

        ctx.slot = Intermediate::Binary(BinaryMask { mask, origin });
        Ok(())
    }
}
