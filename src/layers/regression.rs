use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::init::WeightsInitializer;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// Linear output layer (identity activation) producing the regression target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRegression {
    inner: Layer,
}

impl LayerRegression {
    pub fn new(input_size: usize, output_size: usize) -> LayerRegression {
        LayerRegression {
            inner: Layer::new(input_size, output_size, ActivationFunction::Identity),
        }
    }

    pub fn input_size(&self) -> usize {
        self.inner.input_size
    }

    pub fn output_size(&self) -> usize {
        self.inner.size
    }

    pub fn initialize(&mut self, initializer: &mut dyn WeightsInitializer) {
        self.inner.initialize(initializer);
    }

    pub fn fprop(&self, input: &Matrix) -> Result<Matrix> {
        self.inner.fprop(input)
    }

    pub fn parameters(&self) -> [&Matrix; 2] {
        self.inner.parameters()
    }

    pub fn set_parameters(&mut self, weights: Matrix, biases: Matrix) -> Result<()> {
        self.inner.set_parameters(weights, biases)
    }
}
