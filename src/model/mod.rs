pub mod hyperparameters;
pub mod ffnn;
pub mod ffnn_regression;

pub use hyperparameters::Hyperparameters;
pub use ffnn::Ffnn;
pub use ffnn_regression::{FfnnRegression, States};
