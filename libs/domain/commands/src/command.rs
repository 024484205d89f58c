use imagec_domain_model::SlotType;
use imagec_domain_settings::PipelineStep;

use crate::context::ExecutionContext;
use crate::error::CommandError;
use crate::families;

/// What a command leaves in the slot after it runs. `Unchanged` covers
/// commands that mutate the `Objects` slot in place (measure, intersecting,
/// distance, object filter) rather than replacing its contents wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutput {
    Image,
    Binary,
    Objects,
    Unchanged,
}

/// One step of a pipeline's command chain: a pure function from the active
/// slot (plus read-only context) to a new slot value.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn input_type(&self) -> SlotType;
    fn output_type(&self) -> CommandOutput;
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError>;
}

/// Parses one opaque [`PipelineStep`] into a concrete command. `kind` is
/// matched case-sensitively against the names below; `params` is decoded
/// with `serde_json` into each command's own parameter struct.
pub fn parse_step(step: &PipelineStep) -> Result<Box<dyn Command>, CommandError> {
    let params = step.params.clone();
    let invalid = |reason: String| CommandError::InvalidParams { command: "parse_step", reason };

    match step.kind.as_str() {
        "zProjection" => Ok(Box::new(
            serde_json::from_value::<families::zprojection::ZProjectionCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "blur" => Ok(Box::new(
            serde_json::from_value::<families::blur::BlurCommand>(params).map_err(|e| invalid(e.to_string()))?,
        )),
        "rollingBallBackground" => Ok(Box::new(
            serde_json::from_value::<families::rolling_ball::RollingBallCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "subtractChannel" => Ok(Box::new(
            serde_json::from_value::<families::subtract_channel::SubtractChannelCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "sobel" => Ok(Box::new(families::sobel::SobelCommand)),
        "threshold" => Ok(Box::new(
            serde_json::from_value::<families::threshold::ThresholdCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "morphology" => Ok(Box::new(
            serde_json::from_value::<families::morphology::MorphologyCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "objectFilter" => Ok(Box::new(
            serde_json::from_value::<families::object_filter::ObjectFilterCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "measureIntensity" => Ok(Box::new(
            serde_json::from_value::<families::measure_intensity::MeasureIntensityCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "intersecting" => Ok(Box::new(
            serde_json::from_value::<families::intersecting::IntersectingCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "distance" => Ok(Box::new(
            serde_json::from_value::<families::distance::DistanceCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "imageSaver" => Ok(Box::new(
            serde_json::from_value::<families::image_saver::ImageSaverCommand>(params)
                .map_err(|e| invalid(e.to_string()))?,
        )),
        "classifyByMask" => Err(invalid(
            "classifyByMask wraps a runtime Segmenter and cannot be built from params alone; \
             the executor must construct families::classify::ClassifyByMaskCommand directly"
                .to_string(),
        )),
        other => Err(CommandError::UnknownKind(other.to_string())),
    }
}
