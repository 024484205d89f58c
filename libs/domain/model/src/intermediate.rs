use imagec_core_geometry::Mask;
use serde::{Deserialize, Serialize};

use crate::object::Object;

/// Pixel bit depth of a source plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelDepth {
    U8,
    U16,
    F32,
}

impl PixelDepth {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelDepth::U8 => 1,
            PixelDepth::U16 => 2,
            PixelDepth::F32 => 4,
        }
    }
}

/// Z-stack reducer used by `readProjection` and the Z-Projection command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZProjection {
    None,
    Max,
    Min,
    Avg,
    Middle,
}

/// 2-D pixel array carried between pipeline steps.
///
/// Pixels are always held internally as `f32` regardless of the declared
/// source `depth`, so every command operates on one numeric representation;
/// `depth` records what the values were saturated/rounded from (and back to,
/// when a command like `AVG` projection rounds to source depth) rather than
/// how they are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub depth: PixelDepth,
    /// 1 for grayscale, 3 for RGB; pixels are interleaved per-channel.
    pub channels: u8,
    /// Offset of this buffer's (0,0) pixel in full-image coordinates.
    pub origin: (i64, i64),
    pixels: Vec<f32>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32, depth: PixelDepth, channels: u8, origin: (i64, i64)) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self { width, height, depth, channels, origin, pixels: vec![0.0; len] }
    }

    #[inline]
    fn index(&self, x: u32, y: u32, channel: u8) -> usize {
        let pixel = y as usize * self.width as usize + x as usize;
        pixel * self.channels as usize + channel as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: u8) -> f32 {
        self.pixels[self.index(x, y, channel)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, channel: u8, value: f32) {
        let idx = self.index(x, y, channel);
        self.pixels[idx] = value;
    }

    /// Maximum representable value for this buffer's declared depth, used to
    /// saturate after arithmetic such as background subtraction.
    pub fn depth_max(&self) -> f32 {
        match self.depth {
            PixelDepth::U8 => u8::MAX as f32,
            PixelDepth::U16 => u16::MAX as f32,
            PixelDepth::F32 => f32::MAX,
        }
    }

    /// Pixels in row-major order for a single channel, fixing the
    /// accumulation order of measurement reductions.
    pub fn iter_channel(&self, channel: u8) -> impl Iterator<Item = f32> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| self.get(x, y, channel)))
    }
}

/// Binary mask, same dimensions as its source `ImageBuffer`, produced by
/// thresholding or AI segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryMask {
    pub mask: Mask,
    pub origin: (i64, i64),
}

/// 1-D array of counts keyed by intensity bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<u64>,
}

impl Histogram {
    pub fn new(bin_count: usize) -> Self {
        Self { bins: vec![0; bin_count] }
    }

    pub fn record(&mut self, bin: usize) {
        if let Some(count) = self.bins.get_mut(bin) {
            *count += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// The one active value occupying the executor's slot at a given point in
/// the command chain.
#[derive(Debug, Clone)]
pub enum Intermediate {
    Image(ImageBuffer),
    Binary(BinaryMask),
    Objects(Vec<Object>),
    Histogram(Histogram),
}

/// A command's declared input-type contract. `ImageOrBinary` accepts either
/// an `Image` or `Binary` slot; `All` accepts any non-empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    All,
    Image,
    Binary,
    Objects,
    ImageOrBinary,
}

impl Intermediate {
    pub fn matches(&self, declared: SlotType) -> bool {
        match (declared, self) {
            (SlotType::All, _) => true,
            (SlotType::Image, Intermediate::Image(_)) => true,
            (SlotType::Binary, Intermediate::Binary(_)) => true,
            (SlotType::Objects, Intermediate::Objects(_)) => true,
            (SlotType::ImageOrBinary, Intermediate::Image(_) | Intermediate::Binary(_)) => true,
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Intermediate::Image(_) => "IMAGE",
            Intermediate::Binary(_) => "BINARY",
            Intermediate::Objects(_) => "OBJECTS",
            Intermediate::Histogram(_) => "HISTOGRAM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_buffer_round_trips_a_pixel() {
        let mut buf = ImageBuffer::new(4, 4, PixelDepth::U16, 1, (0, 0));
        buf.set(2, 1, 0, 1234.0);
        assert_eq!(buf.get(2, 1, 0), 1234.0);
    }

    #[test]
    fn slot_type_image_or_binary_accepts_both() {
        let image = Intermediate::Image(ImageBuffer::new(1, 1, PixelDepth::U8, 1, (0, 0)));
        let binary = Intermediate::Binary(BinaryMask { mask: Mask::empty(1, 1), origin: (0, 0) });
        assert!(image.matches(SlotType::ImageOrBinary));
        assert!(binary.matches(SlotType::ImageOrBinary));
        assert!(!image.matches(SlotType::Objects));
    }

    #[test]
    fn histogram_ignores_out_of_range_bins() {
        let mut histogram = Histogram::new(4);
        histogram.record(2);
        histogram.record(99);
        assert_eq!(histogram.total(), 1);
    }
}
