use thiserror::Error;

/// Raised by planner construction; surfaced by the Job Controller as
/// `SETTINGS_INVALID` before any work is issued, never a planner-internal
/// panic (§4.2).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlannerError {
    #[error("SETTINGS_INVALID: tile size must be positive, got {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("SETTINGS_INVALID: t-stack range start {start} is after end {end}")]
    InvalidFrameRange { start: u32, end: u32 },

    #[error("SETTINGS_INVALID: the image inventory has no series {series_index}")]
    UnknownSeries { series_index: u32 },
}
