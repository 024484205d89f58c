//! Typed data model shared by every pipeline stage.
//!
//! This crate carries no behavior beyond what follows directly from its
//! invariants: plane coordinates (`plane`), the typed intermediate slots that
//! flow through a command chain (`intermediate`), the classification set
//! (`classification`), physical units (`units`), and the `Object` record
//! itself (`object`). The executor, the command library, and the object atom
//! all build on these types rather than inventing their own.

pub mod classification;
pub mod intermediate;
pub mod object;
pub mod plane;
pub mod units;

pub use classification::{ClassId, Classification, ClassificationSet};
pub use intermediate::{
    BinaryMask, Histogram, ImageBuffer, Intermediate, PixelDepth, SlotType, ZProjection,
};
pub use object::{DistanceRecord, IntensityStats, Object, ObjectId, Validity};
pub use plane::{ImageId, PlaneId, TileId};
pub use units::Units;
