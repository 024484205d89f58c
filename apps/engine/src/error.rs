use thiserror::Error;

use imagec_core_planner::PlannerError;
use imagec_domain_settings::SettingsError;

/// Failures raised by `JobController::start` itself, before any worker
/// thread is spawned (§7). Per-image failures (`DECODE_ERROR`,
/// `TYPE_CONTRACT_VIOLATION`, `SEGMENTATION_FAILED`, `RESULT_WRITE_FAILED`,
/// ...) are recovered at the image boundary and recorded as `state.errors`
/// entries instead.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("SETTINGS_INVALID: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Planner(#[from] PlannerError),
}
