use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaneSourceError {
    #[error("PLANE_OUT_OF_RANGE: {0:?} has no data at the requested coordinate")]
    PlaneOutOfRange(imagec_domain_model::PlaneId),

    #[error("DECODE_ERROR: {0}")]
    DecodeError(String),
}
