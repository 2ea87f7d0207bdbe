use crate::activation::activation::ActivationFunction;
use crate::error::{Result, TractError};
use crate::init::WeightsInitializer;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::model::hyperparameters::Hyperparameters;

/// Stack of dense hidden layers sharing one activation function.
#[derive(Debug, Clone)]
pub struct Ffnn {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub activation: ActivationFunction,
    pub layers: Vec<Layer>,
}

impl Ffnn {
    pub fn new(
        input_size: usize,
        hidden_sizes: Vec<usize>,
        activation: ActivationFunction,
    ) -> Result<Ffnn> {
        if hidden_sizes.is_empty() {
            return Err(TractError::config("at least one hidden layer is required"));
        }
        if input_size == 0 || hidden_sizes.contains(&0) {
            return Err(TractError::config("layer sizes must be positive"));
        }

        let layers = std::iter::once(input_size)
            .chain(hidden_sizes.iter().copied())
            .zip(hidden_sizes.iter().copied())
            .map(|(fan_in, size)| Layer::new(fan_in, size, activation))
            .collect();

        Ok(Ffnn { input_size, hidden_sizes, activation, layers })
    }

    pub fn initialize(&mut self, initializer: &mut dyn WeightsInitializer) {
        for layer in &mut self.layers {
            layer.initialize(initializer);
        }
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, |l| l.size)
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            input_size: self.input_size,
            hidden_sizes: self.hidden_sizes.clone(),
            activation: self.activation,
            output_size: None,
        }
    }

    /// Parameters of every layer, each as `[weights, biases]`, input to output.
    pub fn parameters(&self) -> Vec<&Matrix> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    /// Replaces parameters from an iterator yielding `weights, biases` pairs
    /// in `parameters()` order. Consumes exactly two items per layer.
    pub fn set_parameters<I>(&mut self, params: &mut I) -> Result<()>
    where
        I: Iterator<Item = Matrix>,
    {
        for layer in &mut self.layers {
            let (w, b) = params
                .next()
                .zip(params.next())
                .ok_or(TractError::Empty("not enough parameters for hidden layers"))?;
            layer.set_parameters(w, b)?;
        }
        Ok(())
    }

    /// Forward pass; returns the output of every hidden layer.
    pub fn fprop(&self, input: &Matrix) -> Result<Vec<Matrix>> {
        let mut outputs: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let out = layer.fprop(outputs.last().unwrap_or(input))?;
            outputs.push(out);
        }
        Ok(outputs)
    }
}
