use imagec_domain_model::{ImageBuffer, SlotType};

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Classic 3x3 Sobel edge-magnitude filter. Takes no parameters.
pub struct SobelCommand;

const GX: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const GY: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

impl Command for SobelCommand {
    fn name(&self) -> &'static str {
        "sobel"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Image
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Image
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let image = ctx.require_image_mut(self.name())?;
        let depth_max = image.depth_max();
        let source = image.clone();
        for channel in 0..source.channels {
            for y in 0..source.height {
                for x in 0..source.width {
                    let mut gx = 0.0f32;
                    let mut gy = 0.0f32;
                    for (ky, row) in GX.iter().enumerate() {
                        for (kx, weight) in row.iter().enumerate() {
                            let sx = (x as i32 + kx as i32 - 1).clamp(0, source.width as i32 - 1) as u32;
                            let sy = (y as i32 + ky as i32 - 1).clamp(0, source.height as i32 - 1) as u32;
                            let pixel = source.get(sx, sy, channel);
                            gx += pixel * weight;
                            gy += pixel * GY[ky][kx];
                        }
                    }
                    let magnitude = (gx * gx + gy * gy).sqrt().min(depth_max);
                    image.set(x, y, channel, magnitude);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use imagec_domain_model::PixelDepth;

    use super::*;

    #[test]
    fn flat_image_has_zero_edges() {
        let mut image = ImageBuffer::new(4, 4, PixelDepth::U8, 1, (0, 0));
        for y in 0..4 {
            for x in 0..4 {
                image.set(x, y, 0, 50.0);
            }
        }
        let source = image.clone();
        let depth_max = image.depth_max();
        for y in 0..4 {
            for x in 0..4 {
                let mut gx = 0.0f32;
                let mut gy = 0.0f32;
                for (ky, row) in GX.iter().enumerate() {
                    for (kx, weight) in row.iter().enumerate() {
                        let sx = (x as i32 + kx as i32 - 1).clamp(0, 3) as u32;
                        let sy = (y as i32 + ky as i32 - 1).clamp(0, 3) as u32;
                        let pixel = source.get(sx, sy, 0);
                        gx += pixel * weight;
                        gy += pixel * GY[ky][kx];
                    }
                }
                let magnitude = (gx * gx + gy * gy).sqrt().min(depth_max);
                assert_eq!(magnitude, 0.0);
            }
        }
    }
}
