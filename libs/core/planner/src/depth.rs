use imagec_domain_settings::Pipeline;

/// Static walk of a pipeline's command chain computing the maximum number
/// of simultaneously live `ImageBuffer`s it requires (§4.2, §4.3). Most
/// commands replace their input in place (factor 1); a few momentarily hold
/// a second buffer alongside the active one.
pub fn pipeline_depth_factor(pipeline: &Pipeline) -> u32 {
    let mut factor = 1;
    for step in &pipeline.pipeline_steps {
        let step_factor = match step.kind.as_str() {
            // Holds the active buffer and the other channel's buffer at
            // the same time while computing the clamped difference.
            "subtractChannel" => 2,
            // Erode-then-dilate (or the reverse) keeps the pre-pass result
            // alive alongside the in-progress second pass.
            "rollingBallBackground" | "morphology" => 2,
            _ => 1,
        };
        factor = factor.max(step_factor);
    }
    factor
}
