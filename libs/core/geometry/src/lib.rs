//! Pure 2-D geometry primitives.
//!
//! Nothing here knows about planes, channels, or pipelines — that belongs to
//! `imagec-domain-model`. This crate only deals with pixel grids, bits, and
//! integer rectangles, so it can be exercised with plain unit tests and
//! reused from the object atom, the command library, and the executor.

mod bounding_box;
mod connected_components;
mod contour;
mod mask;

pub use bounding_box::BoundingBox;
pub use connected_components::{label_components, Connectivity};
pub use contour::trace_outer_contour;
pub use mask::Mask;
