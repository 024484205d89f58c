use std::collections::HashMap;

use imagec_domain_model::{BinaryMask, ClassId, ImageBuffer, Intermediate, Object, ObjectId, PlaneId, SlotType, TileId};
use imagec_infra_planesource::{PixelSize, PlaneSource};

use crate::error::CommandError;

/// Everything a command needs to act on one `WorkUnit`: the active slot, a
/// read-only handle to the source image, the object ids already minted
/// within this (image, pipeline), and the other pipelines' object sets on
/// the same plane (for cross-channel commands).
pub struct ExecutionContext<'a> {
    pub slot: Intermediate,
    pub plane_source: &'a dyn PlaneSource,
    pub plane: PlaneId,
    pub tile: TileId,
    pub pixel_size: PixelSize,
    pub default_class: ClassId,
    next_object_id: u64,
    pub cross_pipeline_objects: &'a HashMap<String, Vec<Object>>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        slot: Intermediate,
        plane_source: &'a dyn PlaneSource,
        plane: PlaneId,
        tile: TileId,
        pixel_size: PixelSize,
        default_class: ClassId,
        first_object_id: u64,
        cross_pipeline_objects: &'a HashMap<String, Vec<Object>>,
    ) -> Self {
        Self {
            slot,
            plane_source,
            plane,
            tile,
            pixel_size,
            default_class,
            next_object_id: first_object_id,
            cross_pipeline_objects,
        }
    }

    /// Mints the next monotonically increasing object id for this
    /// (image, pipeline); the executor seeds the starting value from the
    /// planner's per-tile object id range.
    pub fn allocate_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    pub fn next_object_id(&self) -> u64 {
        self.next_object_id
    }

    pub fn require_image(&self, command: &'static str) -> Result<&ImageBuffer, CommandError> {
        match &self.slot {
            Intermediate::Image(image) => Ok(image),
            other => Err(CommandError::SlotMismatch { command, expected: SlotType::Image, found: other.kind_name() }),
        }
    }

    pub fn require_image_mut(&mut self, command: &'static str) -> Result<&mut ImageBuffer, CommandError> {
        match &mut self.slot {
            Intermediate::Image(image) => Ok(image),
            other => Err(CommandError::SlotMismatch { command, expected: SlotType::Image, found: other.kind_name() }),
        }
    }

    pub fn require_binary(&self, command: &'static str) -> Result<&BinaryMask, CommandError> {
        match &self.slot {
            Intermediate::Binary(mask) => Ok(mask),
            other => Err(CommandError::SlotMismatch { command, expected: SlotType::Binary, found: other.kind_name() }),
        }
    }

    pub fn require_objects(&self, command: &'static str) -> Result<&Vec<Object>, CommandError> {
        match &self.slot {
            Intermediate::Objects(objects) => Ok(objects),
            other => {
                Err(CommandError::SlotMismatch { command, expected: SlotType::Objects, found: other.kind_name() })
            }
        }
    }

    pub fn require_objects_mut(&mut self, command: &'static str) -> Result<&mut Vec<Object>, CommandError> {
        match &mut self.slot {
            Intermediate::Objects(objects) => Ok(objects),
            other => {
                Err(CommandError::SlotMismatch { command, expected: SlotType::Objects, found: other.kind_name() })
            }
        }
    }
}
