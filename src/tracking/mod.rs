pub mod tracker;

pub use tracker::{track, Streamline, TrackingConfig};
