pub mod initializer;

pub use initializer::{
    WeightsInitializer,
    UniformInitializer,
    GaussianInitializer,
    HeInitializer,
    XavierInitializer,
    ZerosInitializer,
};
