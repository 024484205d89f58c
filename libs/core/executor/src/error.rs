use imagec_domain_model::SlotType;
use thiserror::Error;

/// Errors from walking one pipeline's command chain for a single `WorkUnit`
/// (§4.3). Carries the pipeline `uid` and the offending command's index in
/// the chain so a failure can be pinned down without re-running anything.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(
        "{pipeline}[{command_index}]: expected {expected:?} slot, found {observed}"
    )]
    TypeContractViolation { pipeline: String, command_index: usize, expected: SlotType, observed: &'static str },

    #[error("{pipeline}[{command_index}]: classifyByMask requires a Segmenter but none was supplied")]
    MissingSegmenter { pipeline: String, command_index: usize },

    #[error("{pipeline}[{command_index}]: {source}")]
    Command { pipeline: String, command_index: usize, #[source] source: imagec_domain_commands::CommandError },

    #[error("{0}")]
    PlaneSource(#[from] imagec_infra_planesource::PlaneSourceError),

    #[error("{pipeline}: failed to parse step {command_index} ({kind}): {source}")]
    InvalidStep { pipeline: String, command_index: usize, kind: String, source: imagec_domain_commands::CommandError },
}
