use thiserror::Error;

/// Leaf error type for the Result Sink. Every fallible persistence operation
/// returns one of these; `apps/engine` wraps them with `anyhow` at the
/// Job Controller boundary.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("schema migration failed: {0}")]
    Schema(String),

    #[error("query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("batch for image {image_id} was committed or rolled back twice")]
    BatchAlreadyClosed { image_id: u64 },

    #[error("analyze {analyze_id} was already started")]
    AnalyzeAlreadyStarted { analyze_id: String },
}
