//! Job Controller (C7): top-level run lifecycle, a dedicated worker thread
//! pool, per-image error recovery, and run/analyze id issuance.
//!
//! The library crate carries no process-global state; every run is
//! constructed from an explicit [`JobContext`] and driven by its own
//! [`JobController`], so a batch run and a concurrent preview never share
//! mutable state.

mod context;
mod controller;
mod error;
mod memory;
mod progress;

pub use context::{JobContext, SegmenterFactory};
pub use controller::{JobController, JobState};
pub use error::ControllerError;
pub use progress::Phase;
