//! Pipeline Executor (C3) and Preview Path (C8): walks one pipeline's
//! command chain for a single `WorkUnit`, enforcing the slot-type contract
//! between commands and owning the one conversion no command performs
//! itself — turning a completed `BinaryMask` into an `ObjectList`.

mod error;
mod executor;
mod preview;
mod segmentation;

pub use error::ExecutorError;
pub use executor::{execute_work_unit, run_chain};
pub use preview::{run_preview, PreviewResult};
