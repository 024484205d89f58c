use std::collections::HashMap;
use std::ops::Range;

use imagec_domain_commands::{ExecutionContext, Segmenter};
use imagec_domain_model::{ImageBuffer, Intermediate, Object, PlaneId, TileId};
use imagec_domain_settings::Pipeline;
use imagec_infra_planesource::{PixelSize, PlaneSource};

use crate::error::ExecutorError;
use crate::executor::{apply_step, build_commands};

/// Result of one preview run (§4.8): the final `ObjectList` plus the most
/// recent `ImageBuffer` seen in the chain, for the live editor's overlay —
/// the same intermediates a batch run produces, just collected in memory
/// instead of routed to the Result Sink.
pub struct PreviewResult {
    pub objects: Vec<Object>,
    pub last_image: Option<ImageBuffer>,
}

/// Runs a single synchronous `WorkUnit` through the same command chain and
/// slot-contract enforcement as batch execution, with no persistence and no
/// thread pool (§4.8). `object_id_start` is almost always `0`: preview runs
/// are not part of a committed (image, pipeline) object-id range.
#[allow(clippy::too_many_arguments)]
pub fn run_preview(
    pipeline: &Pipeline,
    plane: PlaneId,
    tile: TileId,
    z_range: Range<u32>,
    object_id_start: u64,
    plane_source: &dyn PlaneSource,
    pixel_size: PixelSize,
    cross_pipeline_objects: &HashMap<String, Vec<Object>>,
    segmenter: Option<Box<dyn Segmenter>>,
) -> Result<PreviewResult, ExecutorError> {
    let commands = build_commands(pipeline, segmenter)?;

    let initial = plane_source.read_projection(plane, z_range, tile, pipeline.pipeline_setup.z_projection)?;
    let mut last_image = Some(initial.clone());

    let mut ctx = ExecutionContext::new(
        Intermediate::Image(initial),
        plane_source,
        plane,
        tile,
        pixel_size,
        pipeline.pipeline_setup.default_class_id,
        object_id_start,
        cross_pipeline_objects,
    );

    for (index, command) in commands.iter().enumerate() {
        apply_step(&mut ctx, command.as_ref(), index, &pipeline.meta.uid)?;
        if let Intermediate::Image(image) = &ctx.slot {
            last_image = Some(image.clone());
        }
    }

    let objects = match ctx.slot {
        Intermediate::Objects(objects) => objects,
        _ => Vec::new(),
    };

    Ok(PreviewResult { objects, last_image })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use imagec_domain_model::{ClassId, Units, ZProjection};
    use imagec_domain_settings::{PipelineMeta, PipelineSetup, PipelineStep};
    use imagec_infra_planesource::SyntheticPlaneSource;

    use super::*;

    #[test]
    fn a_blur_only_pipeline_previews_the_edited_image_with_no_objects() {
        let source = SyntheticPlaneSource::new(32, 32, 1, 1, 1, 32);
        let pipeline = Pipeline {
            meta: PipelineMeta { uid: "p".into(), name: "p".into(), disabled: false, locked: false, notes: String::new(), history: vec![] },
            pipeline_setup: PipelineSetup { c_stack_index: 0, z_projection: ZProjection::None, z_stack_index: 0, t_stack_index: 0, default_class_id: ClassId(0) },
            pipeline_steps: vec![PipelineStep { kind: "blur".into(), params: serde_json::json!({"kernelSize": 3, "repeat": 1}) }],
        };
        let cross = HashMap::new();
        let result = run_preview(
            &pipeline,
            PlaneId::new(0, 0, 0, 0),
            TileId::whole_plane(32, 32),
            0..1,
            0,
            &source,
            PixelSize { value: 1.0, unit: Units::Micrometer },
            &cross,
            None,
        )
        .unwrap();

        assert!(result.objects.is_empty());
        assert!(result.last_image.is_some());
    }
}
