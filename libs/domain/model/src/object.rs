use std::collections::HashMap;

use bitflags::bitflags;
use imagec_core_geometry::{BoundingBox, Mask};
use serde::{Deserialize, Serialize};

use crate::classification::ClassId;
use crate::plane::{PlaneId, TileId};

/// 64-bit object identifier, unique within (image, pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

bitflags! {
    /// Fault bits set by object-filter predicates and by the executor itself.
    /// An object is valid iff no bit here is set — there is deliberately no
    /// dedicated `VALID` bit; validity is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Validity: u8 {
        const MANUAL_OUT_OF_RANGE_SIZE = 1 << 0;
        const MANUAL_OUT_OF_RANGE_CIRCULARITY = 1 << 1;
        const MANUAL_OUT_OF_RANGE_INTENSITY = 1 << 2;
        const AT_EDGE = 1 << 3;
        const NO_CENTER_OF_MASS = 1 << 4;
        const FILTERED_BY_RULE = 1 << 5;
    }
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self.is_empty()
    }
}

impl Default for Validity {
    fn default() -> Self {
        Validity::empty()
    }
}

/// Per-channel intensity summary recorded by the Measure Intensity command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
    pub stddev: f64,
}

/// Geometric distance between two objects, recorded by the Distance command.
/// Values are in pixels unless a pixel-size conversion has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub center_to_center: f64,
    pub center_to_surface_min: f64,
    pub center_to_surface_max: f64,
    pub surface_to_surface_min: f64,
    pub surface_to_surface_max: f64,
    pub from_id: ObjectId,
    pub to_id: ObjectId,
}

/// A region of interest produced by segmentation and carried through the
/// rest of a pipeline's command chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub class: ClassId,
    pub object_id: ObjectId,
    pub origin_object_id: ObjectId,
    pub parent_object_id: Option<ObjectId>,
    pub tracking_id: Option<u64>,
    pub plane: PlaneId,
    pub tile: TileId,
    pub bounding_box: BoundingBox,
    pub mask: Mask,
    pub contour: Vec<(i32, i32)>,
    pub confidence: f32,
    pub validity: Validity,
    pub intensity_by_channel: HashMap<i32, IntensityStats>,
    pub intersecting_by_class: HashMap<ClassId, Vec<ObjectId>>,
    pub distance_by_class: HashMap<ClassId, DistanceRecord>,
}

impl Object {
    /// Invariant 1 (§3.4): the mask must be sized to the bounding box and
    /// must contain at least one set pixel.
    pub fn has_well_formed_mask(&self) -> bool {
        self.mask.width() == self.bounding_box.width
            && self.mask.height() == self.bounding_box.height
            && !self.mask.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.origin_object_id == self.object_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_with_mask(mask: Mask, bounding_box: BoundingBox) -> Object {
        Object {
            class: ClassId(0),
            object_id: ObjectId(1),
            origin_object_id: ObjectId(1),
            parent_object_id: None,
            tracking_id: None,
            plane: PlaneId::new(0, 0, 0, 0),
            tile: TileId::whole_plane(512, 512),
            bounding_box,
            mask,
            contour: vec![],
            confidence: 1.0,
            validity: Validity::empty(),
            intensity_by_channel: HashMap::new(),
            intersecting_by_class: HashMap::new(),
            distance_by_class: HashMap::new(),
        }
    }

    #[test]
    fn validity_empty_means_valid() {
        assert!(Validity::empty().is_valid());
        assert!(!Validity::AT_EDGE.is_valid());
    }

    #[test]
    fn root_object_equals_its_own_origin() {
        let object = object_with_mask(Mask::empty(1, 1), BoundingBox::new(0, 0, 1, 1));
        assert!(object.is_root());
    }

    #[test]
    fn empty_mask_fails_well_formed_check() {
        let object = object_with_mask(Mask::empty(4, 4), BoundingBox::new(0, 0, 4, 4));
        assert!(!object.has_well_formed_mask());
    }

    #[test]
    fn mismatched_bounding_box_fails_well_formed_check() {
        let mut mask = Mask::empty(4, 4);
        mask.set(0, 0, true);
        let object = object_with_mask(mask, BoundingBox::new(0, 0, 5, 5));
        assert!(!object.has_well_formed_mask());
    }
}
