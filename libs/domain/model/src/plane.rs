use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Coordinate of a 2-D plane inside a multi-dimensional image.
///
/// `c_stack` is `-1` when a pipeline is channel-agnostic and has not yet been
/// specialized to a concrete channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneId {
    pub series_index: u32,
    pub c_stack: i32,
    pub z_stack: u32,
    pub t_stack: u32,
}

impl PlaneId {
    pub fn new(series_index: u32, c_stack: i32, z_stack: u32, t_stack: u32) -> Self {
        Self { series_index, c_stack, z_stack, t_stack }
    }

    pub fn is_channel_specialized(&self) -> bool {
        self.c_stack >= 0
    }
}

/// A rectangular sub-region of a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub tile_x: u32,
    pub tile_y: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl TileId {
    pub fn new(tile_x: u32, tile_y: u32, tile_width: u32, tile_height: u32) -> Self {
        Self { tile_x, tile_y, tile_width, tile_height }
    }

    /// The single tile covering an entire plane smaller than the configured
    /// tile size.
    pub fn whole_plane(image_width: u32, image_height: u32) -> Self {
        Self { tile_x: 0, tile_y: 0, tile_width: image_width, tile_height: image_height }
    }

    /// Origin of this tile in full-image pixel coordinates.
    pub fn origin(&self) -> (i64, i64) {
        (i64::from(self.tile_x) * i64::from(self.tile_width), i64::from(self.tile_y) * i64::from(self.tile_height))
    }
}

/// A 64-bit hash of `(runId, absolutePath)`, stable across restarts for the
/// same inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl ImageId {
    pub fn derive(run_id: &str, absolute_path: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(run_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(absolute_path.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }
}
