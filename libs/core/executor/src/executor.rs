use std::collections::HashMap;
use std::ops::Range;

use imagec_core_planner::WorkUnit;
use imagec_domain_commands::families::classify::ClassifyByMaskCommand;
use imagec_domain_commands::{parse_step, Command, ExecutionContext, Segmenter};
use imagec_domain_model::{Intermediate, Object, SlotType};
use imagec_domain_settings::Pipeline;
use imagec_infra_planesource::{PixelSize, PlaneSource};

use crate::error::ExecutorError;
use crate::segmentation::binary_to_objects;

/// Parses a pipeline's opaque steps into the concrete command chain,
/// special-casing `classifyByMask` (§4.4): it wraps a runtime `Segmenter`
/// and so cannot be built from `params` alone.
pub(crate) fn build_commands(
    pipeline: &Pipeline,
    mut segmenter: Option<Box<dyn Segmenter>>,
) -> Result<Vec<Box<dyn Command>>, ExecutorError> {
    let mut commands = Vec::with_capacity(pipeline.pipeline_steps.len());
    for (index, step) in pipeline.pipeline_steps.iter().enumerate() {
        if step.kind == "classifyByMask" {
            let segmenter = segmenter
                .take()
                .ok_or_else(|| ExecutorError::MissingSegmenter { pipeline: pipeline.meta.uid.clone(), command_index: index })?;
            commands.push(Box::new(ClassifyByMaskCommand::new(segmenter)) as Box<dyn Command>);
            continue;
        }
        let command = parse_step(step).map_err(|source| ExecutorError::InvalidStep {
            pipeline: pipeline.meta.uid.clone(),
            command_index: index,
            kind: step.kind.clone(),
            source,
        })?;
        commands.push(command);
    }
    Ok(commands)
}

/// Validates the slot-type contract for one command, converting a completed
/// `BinaryMask` into an `ObjectList` first when the command ahead declares
/// `Objects` as its input (§4.3), then runs it.
pub(crate) fn apply_step(
    ctx: &mut ExecutionContext<'_>,
    command: &dyn Command,
    index: usize,
    pipeline_uid: &str,
) -> Result<(), ExecutorError> {
    if command.input_type() == SlotType::Objects {
        if let Intermediate::Binary(_) = ctx.slot {
            binary_to_objects(ctx);
        }
    }

    if !ctx.slot.matches(command.input_type()) {
        return Err(ExecutorError::TypeContractViolation {
            pipeline: pipeline_uid.to_string(),
            command_index: index,
            expected: command.input_type(),
            observed: ctx.slot.kind_name(),
        });
    }

    command
        .execute(ctx)
        .map_err(|source| ExecutorError::Command { pipeline: pipeline_uid.to_string(), command_index: index, source })
}

/// Walks the whole command chain against one context.
pub fn run_chain(ctx: &mut ExecutionContext<'_>, commands: &[Box<dyn Command>], pipeline_uid: &str) -> Result<(), ExecutorError> {
    for (index, command) in commands.iter().enumerate() {
        apply_step(ctx, command.as_ref(), index, pipeline_uid)?;
    }
    Ok(())
}

/// Executes one `WorkUnit` end-to-end into the in-flight `ObjectList` of
/// (image, pipeline) (§4.3). The initial slot is the `ImageBuffer` read by
/// `read_projection` using the pipeline's declared z-projection; `z_range`
/// is the full z-extent of the image, used only when that projection
/// actually reduces a stack (`ZProjection::None` ignores it).
pub fn execute_work_unit(
    pipeline: &Pipeline,
    work_unit: &WorkUnit,
    z_range: Range<u32>,
    plane_source: &dyn PlaneSource,
    pixel_size: PixelSize,
    cross_pipeline_objects: &HashMap<String, Vec<Object>>,
    segmenter: Option<Box<dyn Segmenter>>,
) -> Result<Vec<Object>, ExecutorError> {
    let commands = build_commands(pipeline, segmenter)?;

    let initial = plane_source.read_projection(
        work_unit.plane,
        z_range,
        work_unit.tile,
        pipeline.pipeline_setup.z_projection,
    )?;

    let mut ctx = ExecutionContext::new(
        Intermediate::Image(initial),
        plane_source,
        work_unit.plane,
        work_unit.tile,
        pixel_size,
        pipeline.pipeline_setup.default_class_id,
        work_unit.object_id_start,
        cross_pipeline_objects,
    );

    run_chain(&mut ctx, &commands, &pipeline.meta.uid)?;

    // A chain that ends on a segmentation step with no downstream `Objects`
    // consumer still must surface its objects to the caller.
    if let Intermediate::Binary(_) = ctx.slot {
        binary_to_objects(&mut ctx);
    }

    Ok(match ctx.slot {
        Intermediate::Objects(objects) => objects,
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use imagec_domain_model::{ClassId, PlaneId, TileId, Units, ZProjection};
    use imagec_domain_settings::{PipelineMeta, PipelineSetup, PipelineStep};
    use imagec_infra_planesource::SyntheticPlaneSource;

    use super::*;

    fn pipeline(steps: Vec<(&str, serde_json::Value)>) -> Pipeline {
        Pipeline {
            meta: PipelineMeta {
                uid: "nuclei".into(),
                name: "nuclei".into(),
                disabled: false,
                locked: false,
                notes: String::new(),
                history: vec![],
            },
            pipeline_setup: PipelineSetup {
                c_stack_index: 0,
                z_projection: ZProjection::None,
                z_stack_index: 0,
                t_stack_index: 0,
                default_class_id: ClassId(0),
            },
            pipeline_steps: steps.into_iter().map(|(kind, params)| PipelineStep { kind: kind.into(), params }).collect(),
        }
    }

    #[test]
    fn threshold_then_object_filter_produces_objects_without_an_explicit_conversion_step() {
        let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);
        let p = pipeline(vec![
            ("threshold", serde_json::json!({"mode": "MANUAL", "manualValue": 1.0})),
            ("objectFilter", serde_json::json!({"imageWidth": 64, "imageHeight": 64})),
        ]);
        let work_unit = WorkUnit { pipeline_uid: "nuclei".into(), plane: PlaneId::new(0, 0, 0, 0), tile: TileId::whole_plane(64, 64), object_id_start: 0 };
        let cross = HashMap::new();
        let pixel_size = PixelSize { value: 1.0, unit: Units::Micrometer };

        let objects = execute_work_unit(&p, &work_unit, 0..1, &source, pixel_size, &cross, None).unwrap();
        // Thresholding at the lowest manual level keeps nearly every pixel set,
        // so the tile comes back as one blob spanning the whole frame.
        assert_eq!(objects.len(), 1);
        assert!(objects[0].validity.contains(imagec_domain_model::Validity::AT_EDGE));
    }

    #[test]
    fn a_type_mismatch_is_reported_with_the_pipeline_and_command_index() {
        let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);
        let p = pipeline(vec![("objectFilter", serde_json::json!({"imageWidth": 64, "imageHeight": 64}))]);
        let work_unit = WorkUnit { pipeline_uid: "nuclei".into(), plane: PlaneId::new(0, 0, 0, 0), tile: TileId::whole_plane(64, 64), object_id_start: 0 };
        let cross = HashMap::new();
        let pixel_size = PixelSize { value: 1.0, unit: Units::Micrometer };

        let err = execute_work_unit(&p, &work_unit, 0..1, &source, pixel_size, &cross, None).unwrap_err();
        match err {
            ExecutorError::TypeContractViolation { pipeline, command_index, .. } => {
                assert_eq!(pipeline, "nuclei");
                assert_eq!(command_index, 0);
            }
            other => panic!("expected TypeContractViolation, got {other:?}"),
        }
    }

    #[test]
    fn classify_by_mask_without_a_segmenter_is_rejected_before_any_plane_is_read() {
        let source = SyntheticPlaneSource::new(64, 64, 1, 1, 1, 64);
        let p = pipeline(vec![("classifyByMask", serde_json::json!({}))]);
        let work_unit = WorkUnit { pipeline_uid: "nuclei".into(), plane: PlaneId::new(0, 0, 0, 0), tile: TileId::whole_plane(64, 64), object_id_start: 0 };
        let cross = HashMap::new();
        let pixel_size = PixelSize { value: 1.0, unit: Units::Micrometer };

        let err = execute_work_unit(&p, &work_unit, 0..1, &source, pixel_size, &cross, None).unwrap_err();
        assert!(matches!(err, ExecutorError::MissingSegmenter { .. }));
    }
}
