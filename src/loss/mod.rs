pub mod l2distance;

use std::collections::HashMap;

use crate::error::{Result, TractError};
use crate::math::matrix::Matrix;

pub use l2distance::{l2distance, L2Distance};

/// A per-sample loss evaluated on a batch of model outputs.
pub trait Loss {
    /// Loss of every sample (row) of the batch.
    fn compute_losses(&mut self, model_output: &Matrix, targets: &Matrix) -> Result<Vec<f64>>;

    /// Extra state updates the loss wants applied alongside the parameters,
    /// keyed by name. Stateless losses return an empty map.
    fn updates(&self) -> HashMap<String, Matrix>;

    fn mean_loss(&mut self, model_output: &Matrix, targets: &Matrix) -> Result<f64> {
        let losses = self.compute_losses(model_output, targets)?;
        if losses.is_empty() {
            return Err(TractError::Empty("loss batch"));
        }
        Ok(losses.iter().sum::<f64>() / losses.len() as f64)
    }
}
