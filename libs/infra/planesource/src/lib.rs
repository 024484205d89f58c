//! Plane Source (C1): abstraction over a multi-dimensional image.
//!
//! The engine never decodes a concrete file format itself — it only
//! consumes whatever implements `PlaneSource`. Concrete OME/BioFormats/TIFF
//! decoders are out of scope; `SyntheticPlaneSource` is a deterministic
//! procedurally-generated test double standing in for them.

pub mod errors;
pub mod inventory;
pub mod synthetic;

use imagec_domain_model::{ImageBuffer, PlaneId, TileId, Units, ZProjection};

pub use errors::PlaneSourceError;
pub use inventory::{ImageInventory, OmeInfo, SeriesInfo, TileGrid};
pub use synthetic::SyntheticPlaneSource;

/// Read-only capability over a multi-dimensional image. Implementations
/// must be `Send + Sync` so a `PlaneSource` can be shared across worker
/// threads without locking.
pub trait PlaneSource: Send + Sync {
    fn enumerate(&self, image_path: &str) -> Result<ImageInventory, PlaneSourceError>;

    fn read(&self, plane: PlaneId, tile: TileId) -> Result<ImageBuffer, PlaneSourceError>;

    /// Collapses a z-range to 2-D using the given reducer; `z_range` is
    /// `[start, end)`.
    fn read_projection(
        &self,
        plane: PlaneId,
        z_range: std::ops::Range<u32>,
        tile: TileId,
        kind: ZProjection,
    ) -> Result<ImageBuffer, PlaneSourceError>;

    fn ome(&self, series_index: u32) -> Result<OmeInfo, PlaneSourceError>;
}

/// Physical pixel size in a fixed unit, as reported by a source's OME
/// metadata (or a user-configured fallback when absent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    pub value: f64,
    pub unit: Units,
}
