pub mod dense;
pub mod regression;

pub use dense::Layer;
pub use regression::LayerRegression;
