use imagec_core_measure::projection::reduce_z_stack;
use imagec_domain_model::{ImageBuffer, PixelDepth, PlaneId, TileId, Units, ZProjection};

use crate::errors::PlaneSourceError;
use crate::inventory::{ImageInventory, OmeInfo, SeriesInfo, TileGrid};
use crate::PlaneSource;

/// A deterministic, procedurally-generated image source. Stands in for the
/// out-of-scope BioFormats/TIFF decoders in tests: every pixel value is a
/// pure function of its coordinate, so assertions about executor/command
/// behavior never depend on real image fixtures.
pub struct SyntheticPlaneSource {
    series: Vec<SeriesInfo>,
    pixel_size: f64,
    unit: Units,
}

impl SyntheticPlaneSource {
    pub fn new(width: u32, height: u32, z_count: u32, t_count: u32, c_count: u32, tile_size: u32) -> Self {
        let tile_grid = TileGrid { series_index: 0, tile_width: tile_size, tile_height: tile_size };
        let series =
            vec![SeriesInfo { series_index: 0, width, height, z_count, t_count, c_count, pyramid_levels: 1, tile_grid }];
        Self { series, pixel_size: 0.325, unit: Units::Micrometer }
    }

    fn generate_plane(&self, plane: PlaneId, tile: TileId) -> Result<ImageBuffer, PlaneSourceError> {
        let series = self.series.first().ok_or(PlaneSourceError::PlaneOutOfRange(plane))?;
        let c = plane.c_stack.max(0) as u32;
        if c >= series.c_count || plane.z_stack >= series.z_count || plane.t_stack >= series.t_count {
            return Err(PlaneSourceError::PlaneOutOfRange(plane));
        }

        let origin = tile.origin();
        let mut buffer = ImageBuffer::new(tile.tile_width, tile.tile_height, PixelDepth::U16, 1, origin);
        for y in 0..tile.tile_height {
            for x in 0..tile.tile_width {
                let gx = origin.0 as u32 + x;
                let gy = origin.1 as u32 + y;
                let value = synthetic_intensity(gx, gy, c, plane.z_stack, plane.t_stack);
                buffer.set(x, y, 0, value);
            }
        }
        Ok(buffer)
    }
}

/// A bounded, deterministic pseudo-intensity: a sum of coordinate-derived
/// terms folded into `[0, u16::MAX]`, never a real optical model.
fn synthetic_intensity(x: u32, y: u32, c: u32, z: u32, t: u32) -> f32 {
    let raw = (x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ c.wrapping_mul(997) ^ z.wrapping_mul(101) ^ t.wrapping_mul(53))
        % u16::MAX as u32;
    raw as f32
}

impl PlaneSource for SyntheticPlaneSource {
    fn enumerate(&self, _image_path: &str) -> Result<ImageInventory, PlaneSourceError> {
        Ok(ImageInventory { series: self.series.clone() })
    }

    fn read(&self, plane: PlaneId, tile: TileId) -> Result<ImageBuffer, PlaneSourceError> {
        self.generate_plane(plane, tile)
    }

    fn read_projection(
        &self,
        plane: PlaneId,
        z_range: std::ops::Range<u32>,
        tile: TileId,
        kind: ZProjection,
    ) -> Result<ImageBuffer, PlaneSourceError> {
        if matches!(kind, ZProjection::None) {
            return self.generate_plane(plane, tile);
        }

        let mut planes = Vec::new();
        for z in z_range {
            planes.push(self.generate_plane(PlaneId { z_stack: z, ..plane }, tile)?);
        }
        reduce_z_stack(&planes, kind).ok_or(PlaneSourceError::PlaneOutOfRange(plane))
    }

    fn ome(&self, series_index: u32) -> Result<OmeInfo, PlaneSourceError> {
        let series = self
            .series
            .iter()
            .find(|s| s.series_index == series_index)
            .ok_or(PlaneSourceError::PlaneOutOfRange(PlaneId::new(series_index, -1, 0, 0)))?;
        Ok(OmeInfo {
            width: series.width,
            height: series.height,
            pixel_size_x: self.pixel_size,
            pixel_size_y: self.pixel_size,
            unit: self.unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_deterministic_for_the_same_coordinate() {
        let source = SyntheticPlaneSource::new(512, 512, 3, 1, 2, 512);
        let plane = PlaneId::new(0, 0, 1, 0);
        let tile = TileId::whole_plane(512, 512);
        let a = source.read(plane, tile).unwrap();
        let b = source.read(plane, tile).unwrap();
        assert_eq!(a.get(10, 10, 0), b.get(10, 10, 0));
    }

    #[test]
    fn out_of_range_channel_is_rejected() {
        let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);
        let plane = PlaneId::new(0, 5, 0, 0);
        let tile = TileId::whole_plane(64, 64);
        assert!(matches!(source.read(plane, tile), Err(PlaneSourceError::PlaneOutOfRange(_))));
    }

    #[test]
    fn avg_projection_differs_from_a_single_plane_in_general() {
        let source = SyntheticPlaneSource::new(64, 64, 4, 1, 1, 64);
        let plane = PlaneId::new(0, 0, 0, 0);
        let tile = TileId::whole_plane(64, 64);
        let projected = source.read_projection(plane, 0..4, tile, ZProjection::Avg).unwrap();
        assert_eq!(projected.width, 64);
    }
}
