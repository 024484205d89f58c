use imagec_domain_model::{ImageBuffer, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Background subtraction via a rolling ball of radius `radius` pixels: the
/// background surface is the grayscale morphological opening (erosion then
/// dilation) of the image under a disk structuring element of that radius,
/// which a ball of the same radius would trace rolling under the surface.
/// Result saturates at 0.
#[derive(Debug, Clone, Deserialize)]
pub struct RollingBallCommand {
    pub radius: u32,
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

fn grayscale_erode(image: &ImageBuffer, offsets: &[(i32, i32)]) -> ImageBuffer {
    morphology_pass(image, offsets, f32::min, f32::INFINITY)
}

fn grayscale_dilate(image: &ImageBuffer, offsets: &[(i32, i32)]) -> ImageBuffer {
    morphology_pass(image, offsets, f32::max, f32::NEG_INFINITY)
}

fn morphology_pass(image: &ImageBuffer, offsets: &[(i32, i32)], fold: fn(f32, f32) -> f32, seed: f32) -> ImageBuffer {
    let mut out = ImageBuffer::new(image.width, image.height, image.depth, image.channels, image.origin);
    for channel in 0..image.channels {
        for y in 0..image.height {
            for x in 0..image.width {
                let mut value = seed;
                for (dx, dy) in offsets {
                    let sx = (x as i32 + dx).clamp(0, image.width as i32 - 1) as u32;
                    let sy = (y as i32 + dy).clamp(0, image.height as i32 - 1) as u32;
                    value = fold(value, image.get(sx, sy, channel));
                }
                out.set(x, y, channel, value);
            }
        }
    }
    out
}

impl Command for RollingBallCommand {
    fn name(&self) -> &'static str {
        "rollingBallBackground"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Image
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Image
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let offsets = disk_offsets(self.radius);
        let image = ctx.require_image_mut(self.name())?;
        let background = grayscale_dilate(&grayscale_erode(image, &offsets), &offsets);
        for channel in 0..image.channels {
            for y in 0..image.height {
                for x in 0..image.width {
                    let value = (image.get(x, y, channel) - background.get(x, y, channel)).max(0.0);
                    image.set(x, y, channel, value);
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
    fn flat_background_is_fully_removed() {
        let mut image = ImageBuffer::new(8, 8, PixelDepth::U16, 1, (0, 0));
        for y in 0..8 {
            for x in 0..8 {
                image.set(x, y, 0, 100.0);
            }
        }
        let offsets = disk_offsets(2);
        let background = grayscale_dilate(&grayscale_erode(&image, &offsets), &offsets);
        assert_eq!(background.get(4, 4, 0), 100.0);
    }

    #[test]
    fn a_bright_spot_survives_as_foreground() {
        let mut image = ImageBuffer::new(16, 16, PixelDepth::U16, 1, (0, 0));
        for y in 0..16 {
            for x in 0..16 {
                image.set(x, y, 0, 20.0);
            }
        }
        image.set(8, 8, 0, 220.0);
        let offsets = disk_offsets(3);
        let background = grayscale_dilate(&grayscale_erode(&image, &offsets), &offsets);
        assert!(image.get(8, 8, 0) - background.get(8, 8, 0) > 0.0);
    }
}
