use log::{debug, info};
use std::path::Path;

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, TractError};
use crate::init::{UniformInitializer, WeightsInitializer};
use crate::layers::regression::LayerRegression;
use crate::math::matrix::Matrix;
use crate::model::ffnn::Ffnn;
use crate::model::hyperparameters::Hyperparameters;
use crate::volume::manager::VolumeManager;

pub const HYPERPARAMS_FILE: &str = "hyperparams.json";
pub const PARAMS_FILE: &str = "params.json";

/// Per-layer hidden arrays threaded through successive generator calls.
pub type States = Vec<Matrix>;

/// A feed-forward network whose input is the diffusion signal sampled at
/// streamline coordinates, with a linear regression layer on top that
/// predicts the direction to follow.
#[derive(Debug, Clone)]
pub struct FfnnRegression<V> {
    volume_manager: V,
    ffnn: Ffnn,
    output_size: usize,
    layer_regression: LayerRegression,
}

impl<V: VolumeManager> FfnnRegression<V> {
    /// # Arguments
    /// - `volume_manager` — evaluates the diffusion signal at coordinates
    /// - `input_size`     — width of the signal vector at each coordinate
    /// - `hidden_sizes`   — units of each hidden layer
    /// - `output_size`    — units of the regression layer
    /// - `activation`     — activation of the hidden layers
    pub fn new(
        volume_manager: V,
        input_size: usize,
        hidden_sizes: Vec<usize>,
        output_size: usize,
        activation: ActivationFunction,
    ) -> Result<Self> {
        if output_size == 0 {
            return Err(TractError::config("output_size must be positive"));
        }
        let ffnn = Ffnn::new(input_size, hidden_sizes, activation)?;
        let layer_regression = LayerRegression::new(ffnn.output_size(), output_size);
        Ok(FfnnRegression { volume_manager, ffnn, output_size, layer_regression })
    }

    /// Rebuilds an (uninitialized) model from a hyperparameter mapping.
    pub fn from_hyperparameters(volume_manager: V, hyperparameters: &Hyperparameters) -> Result<Self> {
        let output_size = hyperparameters
            .output_size
            .ok_or_else(|| TractError::config("hyperparameters are missing `output_size`"))?;
        Self::new(
            volume_manager,
            hyperparameters.input_size,
            hyperparameters.hidden_sizes.clone(),
            output_size,
            hyperparameters.activation,
        )
    }

    pub fn initialize(&mut self, weights_initializer: &mut dyn WeightsInitializer) {
        self.ffnn.initialize(weights_initializer);
        self.layer_regression.initialize(weights_initializer);
    }

    /// Initializes with `UniformInitializer::new(1234)`.
    pub fn initialize_default(&mut self) {
        self.initialize(&mut UniformInitializer::default());
    }

    pub fn volume_manager(&self) -> &V {
        &self.volume_manager
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        let mut hyperparameters = self.ffnn.hyperparameters();
        hyperparameters.output_size = Some(self.output_size);
        hyperparameters
    }

    /// Hidden-layer parameters followed by the regression layer's `[W, b]`.
    pub fn parameters(&self) -> Vec<&Matrix> {
        let mut params = self.ffnn.parameters();
        params.extend(self.layer_regression.parameters());
        params
    }

    pub fn set_parameters(&mut self, params: Vec<Matrix>) -> Result<()> {
        let expected = self.parameters().len();
        if params.len() != expected {
            return Err(TractError::shape("FfnnRegression::set_parameters", &[expected], &[params.len()]));
        }

        let mut params = params.into_iter();
        self.ffnn.set_parameters(&mut params)?;
        let (w, b) = params
            .next()
            .zip(params.next())
            .ok_or(TractError::Empty("not enough parameters for the regression layer"))?;
        self.layer_regression.set_parameters(w, b)
    }

    /// Forward pass from `(batch, 4)` coordinates `(x, y, z, subject_id)`.
    ///
    /// Returns the output of every hidden layer followed by the regression
    /// output of shape `(batch, output_size)`.
    pub fn fprop(&self, coords: &Matrix) -> Result<Vec<Matrix>> {
        let data_at_coords = self.volume_manager.eval_at_coords(coords)?;
        let mut layer_outputs = self.ffnn.fprop(&data_at_coords)?;

        let last = layer_outputs.last().ok_or(TractError::Empty("hidden layer outputs"))?;
        let regression_out = self.layer_regression.fprop(last)?;
        layer_outputs.push(regression_out);
        Ok(layer_outputs)
    }

    /// Regression output only.
    pub fn predict(&self, coords: &Matrix) -> Result<Matrix> {
        self.fprop(coords)?
            .pop()
            .ok_or(TractError::Empty("model outputs"))
    }

    /// Builds a step function returning the direction to follow from each
    /// position of the batch, using the diffusion data of `subject_id`.
    ///
    /// The generator takes `(batch, 3)` positions and the current states and
    /// returns `(batch, output_size)` directions with the states untouched,
    /// since this model is not recurrent.
    pub fn make_sequence_generator(
        &self,
        subject_id: usize,
    ) -> impl Fn(&Matrix, States) -> Result<(Matrix, States)> + '_ {
        move |x_t: &Matrix, states: States| {
            if x_t.cols != 3 {
                return Err(TractError::shape("sequence generator", &[x_t.rows, 3], &x_t.shape()));
            }
            // Append the subject id after the 3D coordinates.
            let coords = x_t.with_column(subject_id as f64);
            let next_x_t = self.predict(&coords)?;
            Ok((next_x_t, states))
        }
    }

    /// Writes `hyperparams.json` and `params.json` into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.hyperparameters().save_json(dir.join(HYPERPARAMS_FILE))?;

        let file = std::fs::File::create(dir.join(PARAMS_FILE))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &self.parameters())?;
        info!("Saved model to {}", dir.display());
        Ok(())
    }

    /// Restores a model previously written by `save`.
    pub fn load(dir: impl AsRef<Path>, volume_manager: V) -> Result<Self> {
        let dir = dir.as_ref();
        let hyperparameters = Hyperparameters::load_json(dir.join(HYPERPARAMS_FILE))?;
        debug!("Loaded hyperparameters: {:?}", hyperparameters);

        let mut model = Self::from_hyperparameters(volume_manager, &hyperparameters)?;
        let file = std::fs::File::open(dir.join(PARAMS_FILE))?;
        let params: Vec<Matrix> = serde_json::from_reader(std::io::BufReader::new(file))?;
        model.set_parameters(params)?;
        info!("Loaded model from {}", dir.display());
        Ok(model)
    }
}
