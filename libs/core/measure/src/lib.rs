//! Statistical reductions and the measurement-key bit packing shared by the
//! Measure Intensity command and the Result Sink.

pub mod key;
pub mod projection;
pub mod stats;

pub use key::{MeasurementKey, Statistic};
pub use stats::reduce_intensity;
