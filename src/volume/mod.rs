pub mod volume4d;
pub mod manager;

pub use volume4d::Volume4D;
pub use manager::{VolumeManager, DwiVolumeManager};
