use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, TractError};
use crate::init::WeightsInitializer;
use crate::math::matrix::Matrix;

/// Fully connected layer: `act(x · W + b)` applied to a batch of row vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub input_size: usize,
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Creates a layer with zeroed parameters; call `initialize` before use.
    pub fn new(input_size: usize, size: usize, activation: ActivationFunction) -> Layer {
        Layer {
            input_size,
            size,
            weights: Matrix::zeros(input_size, size),
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    /// Draws the weights from `initializer`; biases are reset to zero.
    pub fn initialize(&mut self, initializer: &mut dyn WeightsInitializer) {
        self.weights = initializer.generate(self.input_size, self.size);
        self.biases = Matrix::zeros(1, self.size);
    }

    /// Forward pass over a `(batch, input_size)` matrix.
    pub fn fprop(&self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size {
            return Err(TractError::shape(
                "Layer::fprop",
                &[input.rows, self.input_size],
                &input.shape(),
            ));
        }
        let z = input.dot(&self.weights)?.add_row(&self.biases)?;
        Ok(z.map(|x| self.activator.function(x)))
    }

    /// Parameters in `[weights, biases]` order.
    pub fn parameters(&self) -> [&Matrix; 2] {
        [&self.weights, &self.biases]
    }

    pub fn set_parameters(&mut self, weights: Matrix, biases: Matrix) -> Result<()> {
        if weights.shape() != self.weights.shape() {
            return Err(TractError::shape("Layer weights", &self.weights.shape(), &weights.shape()));
        }
        if biases.shape() != self.biases.shape() {
            return Err(TractError::shape("Layer biases", &self.biases.shape(), &biases.shape()));
        }
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }
}
