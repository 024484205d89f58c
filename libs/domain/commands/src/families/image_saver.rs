use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imagec_domain_model::{Intermediate, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Writes a control image: the active buffer's pixels normalized to 8-bit
/// grayscale, with each object's contour overlaid in its class color.
/// Path layout follows
/// `<runDir>/<analyzeId>/control_images/<imageFileName>/<imageFileName>_<cStack>_<tileNr>.png`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSaverCommand {
    #[serde(rename = "runDir")]
    pub run_dir: String,
    #[serde(rename = "analyzeId")]
    pub analyze_id: String,
    #[serde(rename = "imageFileName")]
    pub image_file_name: String,
    #[serde(rename = "tileNr")]
    pub tile_nr: u32,
    #[serde(rename = "classColors", default)]
    pub class_colors: std::collections::HashMap<u16, (u8, u8, u8)>,
}

impl ImageSaverCommand {
    fn output_path(&self, c_stack: i32) -> PathBuf {
        PathBuf::from(&self.run_dir)
            .join(&self.analyze_id)
            .join("control_images")
            .join(&self.image_file_name)
            .join(format!("{}_{}_{}.png", self.image_file_name, c_stack, self.tile_nr))
    }
}

impl Command for ImageSaverCommand {
    fn name(&self) -> &'static str {
        "imageSaver"
    }

    fn input_type(&self) -> SlotType {
        SlotType::ImageOrBinary
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Unchanged
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let fallback_color = self.class_colors.get(&0).copied().unwrap_or((255, 0, 0));

        let canvas = match &ctx.slot {
            Intermediate::Image(image) => {
                let depth_max = image.depth_max();
                let mut canvas = RgbImage::new(image.width, image.height);
                for y in 0..image.height {
                    for x in 0..image.width {
                        let gray = ((image.get(x, y, 0) / depth_max) * 255.0).clamp(0.0, 255.0) as u8;
                        canvas.put_pixel(x, y, Rgb([gray, gray, gray]));
                    }
                }
                canvas
            }
            Intermediate::Binary(binary) => {
                let mut canvas = RgbImage::new(binary.mask.width(), binary.mask.height());
                for (x, y) in binary.mask.iter_set_pixels() {
                    canvas.put_pixel(x, y, Rgb([fallback_color.0, fallback_color.1, fallback_color.2]));
                }
                canvas
            }
            other => {
                return Err(CommandError::SlotMismatch {
                    command: self.name(),
                    expected: SlotType::ImageOrBinary,
                    found: other.kind_name(),
                })
            }
        };

        let path = self.output_path(ctx.plane.c_stack);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        canvas.save(&path)?;
        Ok(())
    }
}
