use imagec_domain_model::{SlotType, Validity};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

/// Evaluates per-object predicates and sets the matching `Validity` bit.
/// Objects are never dropped — only flagged — so downstream commands still
/// see the full object set.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectFilterCommand {
    #[serde(rename = "minSize", default)]
    pub min_size: Option<u64>,
    #[serde(rename = "maxSize", default)]
    pub max_size: Option<u64>,
    #[serde(rename = "minCircularity", default)]
    pub min_circularity: Option<f64>,
    #[serde(rename = "excludeAtEdge", default)]
    pub exclude_at_edge: bool,
    #[serde(rename = "imageWidth")]
    pub image_width: u32,
    #[serde(rename = "imageHeight")]
    pub image_height: u32,
}

fn circularity(area: u64, perimeter: usize) -> f64 {
    if perimeter == 0 {
        return 0.0;
    }
    4.0 * std::f64::consts::PI * area as f64 / (perimeter as f64 * perimeter as f64)
}

impl Command for ObjectFilterCommand {
    fn name(&self) -> &'static str {
        "objectFilter"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Objects
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Unchanged
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let objects = ctx.require_objects_mut(self.name())?;
        for object in objects.iter_mut() {
            let area = object.mask.count_set();
            let perimeter = object.contour.len();

            if let Some(min) = self.min_size {
                if area < min {
                    object.validity |= Validity::MANUAL_OUT_OF_RANGE_SIZE;
                }
            }
            if let Some(max) = self.max_size {
                if area > max {
                    object.validity |= Validity::MANUAL_OUT_OF_RANGE_SIZE;
                }
            }
            if let Some(min_circ) = self.min_circularity {
                if circularity(area, perimeter) < min_circ {
                    object.validity |= Validity::MANUAL_OUT_OF_RANGE_CIRCULARITY;
                }
            }
            if object.bounding_box.touches_edge(self.image_width, self.image_height) {
                object.validity |= Validity::AT_EDGE;
                if self.exclude_at_edge {
                    object.validity |= Validity::FILTERED_BY_RULE;
                }
            }
            if area == 0 {
                object.validity |= Validity::NO_CENTER_OF_MASS;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use imagec_domain_model::{ClassId, Intermediate, ObjectId, PlaneId, TileId};
    use imagec_infra_planesource::{PixelSize, SyntheticPlaneSource};

    use super::*;

    fn ctx<'a>(objects: Vec<imagec_domain_model::Object>, source: &'a SyntheticPlaneSource, cross: &'a HashMap<String, Vec<imagec_domain_model::Object>>) -> ExecutionContext<'a> {
        ExecutionContext::new(
            Intermediate::Objects(objects),
            source,
            PlaneId::new(0, 0, 0, 0),
            TileId::whole_plane(512, 512),
            PixelSize { value: 1.0, unit: imagec_domain_model::Units::Micrometer },
            ClassId(0),
            2,
            cross,
        )
    }

    fn object(area_side: u32) -> imagec_domain_model::Object {
        let mut mask = imagec_core_geometry::Mask::empty(area_side, area_side);
        for y in 0..area_side {
            for x in 0..area_side {
                mask.set(x, y, true);
            }
        }
        imagec_domain_model::Object {
            class: ClassId(0),
            object_id: ObjectId(1),
            origin_object_id: ObjectId(1),
            parent_object_id: None,
            tracking_id: None,
            plane: PlaneId::new(0, 0, 0, 0),
            tile: TileId::whole_plane(512, 512),
            bounding_box: imagec_core_geometry::BoundingBox::new(200, 200, area_side, area_side),
            mask,
            contour: vec![(0, 0); (area_side * 4).max(1) as usize],
            confidence: 1.0,
            validity: Validity::empty(),
            intensity_by_channel: Default::default(),
            intersecting_by_class: Default::default(),
            distance_by_class: Default::default(),
        }
    }

    #[test]
    fn undersized_object_is_flagged_but_kept() {
        let command = ObjectFilterCommand {
            min_size: Some(1000),
            max_size: None,
            min_circularity: None,
            exclude_at_edge: false,
            image_width: 512,
            image_height: 512,
        };
        let source = SyntheticPlaneSource::new(512, 512, 1, 1, 1, 512);
        let cross = HashMap::new();
        let mut context = ctx(vec![object(5)], &source, &cross);
        command.execute(&mut context).unwrap();

        let objects = context.require_objects(command.name()).unwrap();
        assert_eq!(objects.len(), 1);
        assert!(objects[0].validity.contains(Validity::MANUAL_OUT_OF_RANGE_SIZE));
        assert!(!objects[0].validity.is_valid());
    }

    #[test]
    fn edge_object_gets_at_edge_bit() {
        let command = ObjectFilterCommand {
            min_size: None,
            max_size: None,
            min_circularity: None,
            exclude_at_edge: true,
            image_width: 512,
            image_height: 512,
        };
        let mut edge_object = object(5);
        edge_object.bounding_box = imagec_core_geometry::BoundingBox::new(0, 10, 5, 5);
        let source = SyntheticPlaneSource::new(512, 512, 1, 1, 1, 512);
        let cross = HashMap::new();
        let mut context = ctx(vec![edge_object], &source, &cross);
        command.execute(&mut context).unwrap();

        let objects = context.require_objects(command.name()).unwrap();
        assert!(objects[0].validity.contains(Validity::AT_EDGE));
        assert!(objects[0].validity.contains(Validity::FILTERED_BY_RULE));
    }
}
