pub mod error;
pub mod math;
pub mod activation;
pub mod init;
pub mod layers;
pub mod volume;
pub mod model;
pub mod loss;
pub mod tracking;
pub mod neurotools;
pub mod viz;

// Convenience re-exports
pub use error::{Result, TractError};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use init::{WeightsInitializer, UniformInitializer};
pub use layers::{Layer, LayerRegression};
pub use volume::{Volume4D, VolumeManager, DwiVolumeManager};
pub use model::{Ffnn, FfnnRegression, Hyperparameters, States};
pub use loss::{Loss, L2Distance};
pub use tracking::{track, Streamline, TrackingConfig};
pub use neurotools::{TractographyData, Gradients, resample_dwi};
