use imagec_domain_model::SlotType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{command}: expected {expected:?} slot, found {found}")]
    SlotMismatch { command: &'static str, expected: SlotType, found: &'static str },

    #[error("{command}: {reason}")]
    Failed { command: &'static str, reason: String },

    #[error("unknown command kind '{0}'")]
    UnknownKind(String),

    #[error("{command}: invalid params: {reason}")]
    InvalidParams { command: &'static str, reason: String },

    #[error("plane read failed: {0}")]
    PlaneSource(#[from] imagec_infra_planesource::PlaneSourceError),

    #[error("control image write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("control image encode failed: {0}")]
    Image(#[from] image::ImageError),
}
