pub mod data;
pub mod resample;

pub use data::{Gradients, TractographyData};
pub use resample::{resample_dwi, fibonacci_sphere, B0_THRESHOLD, DEFAULT_SPHERE_DIRECTIONS};
