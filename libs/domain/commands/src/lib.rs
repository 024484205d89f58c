//! Command Library (C4): the pure, trait-object-dispatched command chain
//! every pipeline executes.
//!
//! Every command implements [`Command`], declares the slot type it requires
//! on input and what it leaves on output, and is built from a pipeline's
//! opaque [`imagec_domain_settings::PipelineStep`] by [`command::parse_step`].

pub mod command;
pub mod context;
pub mod error;
pub mod families;

pub use command::{parse_step, Command, CommandOutput};
pub use context::ExecutionContext;
pub use error::CommandError;
pub use families::classify::Segmenter;
