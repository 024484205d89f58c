pub mod blur;
pub mod classify;
pub mod distance;
pub mod image_saver;
pub mod intersecting;
pub mod measure_intensity;
pub mod morphology;
pub mod object_filter;
pub mod rolling_ball;
pub mod sobel;
pub mod subtract_channel;
pub mod threshold;
pub mod zprojection;
