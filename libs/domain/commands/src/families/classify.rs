use imagec_core_geometry::{trace_outer_contour, Mask};
use imagec_domain_model::{ClassId, ImageBuffer, Intermediate, Object, SlotType, Validity};

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Capability that maps an `ImageBuffer` directly to instance masks, each
/// with its own class and confidence — the AI segmentation path, as opposed
/// to Threshold's single-class mask. Out-of-scope model-loading and
/// inference backends implement this; the command library only consumes it.
pub trait Segmenter: Send + Sync {
    fn segment(&self, image: &ImageBuffer) -> Vec<SegmenterInstance>;
}

pub struct SegmenterInstance {
    pub mask: Mask,
    pub origin: (i64, i64),
    pub class: ClassId,
    pub confidence: f32,
}

/// Converts a `Segmenter`'s instance masks straight into an `ObjectList`,
/// bypassing connected-components labeling since the segmenter already
/// produced one mask per instance.
pub struct ClassifyByMaskCommand {
    segmenter: Box<dyn Segmenter>,
}

impl ClassifyByMaskCommand {
    pub fn new(segmenter: Box<dyn Segmenter>) -> Self {
        Self { segmenter }
    }
}

impl Command for ClassifyByMaskCommand {
    fn name(&self) -> &'static str {
        "classifyByMask"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Image
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Objects
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let image = ctx.require_image(self.name())?;
        let instances = self.segmenter.segment(image);

        let mut objects = Vec::with_capacity(instances.len());
        for instance in instances {
            let bounding_box = imagec_core_geometry::BoundingBox::new(
                instance.origin.0,
                instance.origin.1,
                instance.mask.width(),
                instance.mask.height(),
            );
            let contour_local = trace_outer_contour(&instance.mask);
            let contour = contour_local
                .into_iter()
                .map(|(x, y)| (x + bounding_box.x as i32, y + bounding_box.y as i32))
                .collect();
            let object_id = ctx.allocate_object_id();
            objects.push(Object {
                class: instance.class,
                object_id,
                origin_object_id: object_id,
                parent_object_id: None,
                tracking_id: None,
                plane: ctx.plane,
                tile: ctx.tile,
                bounding_box,
                mask: instance.mask,
                contour,
                confidence: instance.confidence,
                validity: Validity::empty(),
                intensity_by_channel: Default::default(),
                intersecting_by_class: Default::default(),
                distance_by_class: Default::default(),
            });
        }

        ctx.slot = Intermediate::Objects(objects);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use imagec_domain_model::{ImageBuffer, PixelDepth, PlaneId, TileId};
    use imagec_infra_planesource::{PixelSize, SyntheticPlaneSource};

    use super::*;

    struct StubSegmenter {
        instances: Vec<(Mask, (i64, i64))>,
    }

    impl Segmenter for StubSegmenter {
        fn segment(&self, _image: &ImageBuffer) -> Vec<SegmenterInstance> {
            self.instances
                .iter()
                .map(|(mask, origin)| SegmenterInstance { mask: mask.clone(), origin: *origin, class: ClassId(0), confidence: 1.0 })
                .collect()
        }
    }

    #[test]
    fn contour_is_translated_into_full_image_coordinates_like_bounding_box() {
        let mut mask = Mask::empty(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                mask.set(x, y, true);
            }
        }
        let segmenter = StubSegmenter { instances: vec![(mask, (100, 200))] };
        let command = ClassifyByMaskCommand::new(Box::new(segmenter));

        let source = SyntheticPlaneSource::new(512, 512, 1, 1, 1, 512);
        let cross = HashMap::new();
        let image = ImageBuffer::new(5, 5, PixelDepth::U16, 1, (0, 0));
        let mut ctx = ExecutionContext::new(
            Intermediate::Image(image),
            &source,
            PlaneId::new(0, 0, 0, 0),
            TileId::whole_plane(512, 512),
            PixelSize { value: 1.0, unit: imagec_domain_model::Units::Micrometer },
            ClassId(0),
            0,
            &cross,
        );

        command.execute(&mut ctx).unwrap();

        let objects = ctx.require_objects(command.name()).unwrap();
        assert_eq!(objects.len(), 1);
        let object = &objects[0];
        assert_eq!(object.bounding_box.x, 100);
        assert_eq!(object.bounding_box.y, 200);
        // The contour must land in the same full-image space as bounding_box,
        // not mask-local coordinates, so every (x, y) stays within the box.
        for &(x, y) in &object.contour {
            assert!(x >= 100 && x < 105, "contour x {x} outside translated bounding box");
            assert!(y >= 200 && y < 205, "contour y {y} outside translated bounding box");
        }
    }
}

