use std::collections::HashMap;

use crate::error::{Result, TractError};
use crate::loss::Loss;
use crate::math::matrix::Matrix;

pub const DEFAULT_EPS: f64 = 1e-6;

/// `sqrt(sum((a - b)^2) + eps)`, or the norm of `a` alone when `b` is `None`.
pub fn l2distance(a: &[f64], b: Option<&[f64]>, eps: f64) -> f64 {
    let sq: f64 = match b {
        Some(b) => a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum(),
        None => a.iter().map(|x| x * x).sum(),
    };
    (sq + eps).sqrt()
}

/// Per-sample L2 distance between a regression output and its target vector.
///
/// With `normalize_output` the predictions are first scaled to unit length,
/// which makes the loss depend only on the predicted direction.
#[derive(Debug, Clone)]
pub struct L2Distance {
    pub normalize_output: bool,
    pub eps: f64,
    /// Predictions as scored by the last `compute_losses` call.
    pub samples: Option<Matrix>,
}

impl L2Distance {
    pub fn new(normalize_output: bool) -> Self {
        Self::with_eps(normalize_output, DEFAULT_EPS)
    }

    pub fn with_eps(normalize_output: bool, eps: f64) -> Self {
        L2Distance { normalize_output, eps, samples: None }
    }
}

impl Default for L2Distance {
    fn default() -> Self {
        L2Distance::new(false)
    }
}

impl Loss for L2Distance {
    fn compute_losses(&mut self, model_output: &Matrix, targets: &Matrix) -> Result<Vec<f64>> {
        if model_output.shape() != targets.shape() {
            return Err(TractError::shape("L2Distance", &model_output.shape(), &targets.shape()));
        }

        let mut regression_outputs = model_output.clone();
        if self.normalize_output {
            for row in &mut regression_outputs.data {
                let norm = l2distance(row, None, self.eps);
                row.iter_mut().for_each(|x| *x /= norm);
            }
        }

        let losses = regression_outputs
            .data
            .iter()
            .zip(&targets.data)
            .map(|(p, t)| l2distance(p, Some(t), self.eps))
            .collect();

        self.samples = Some(regression_outputs);
        Ok(losses)
    }

    fn updates(&self) -> HashMap<String, Matrix> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn distance_between_vectors() {
        let mut loss = L2Distance::with_eps(false, 0.0);
        let out = Matrix::from_rows(vec![vec![3.0, 4.0, 0.0], vec![1.0, 1.0, 1.0]]).unwrap();
        let tgt = Matrix::from_rows(vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]]).unwrap();

        let losses = loss.compute_losses(&out, &tgt).unwrap();
        assert_approx_eq!(losses[0], 5.0, 1e-12);
        assert_approx_eq!(losses[1], 0.0, 1e-12);
    }

    #[test]
    fn eps_keeps_zero_distance_positive() {
        let mut loss = L2Distance::new(false);
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let losses = loss.compute_losses(&m, &m).unwrap();
        assert_approx_eq!(losses[0], DEFAULT_EPS.sqrt(), 1e-12);
    }

    #[test]
    fn normalized_output_only_scores_direction() {
        let mut loss = L2Distance::new(true);
        let out = Matrix::from_rows(vec![vec![0.0, 10.0, 0.0]]).unwrap();
        let tgt = Matrix::from_rows(vec![vec![0.0, 1.0, 0.0]]).unwrap();

        let losses = loss.compute_losses(&out, &tgt).unwrap();
        assert!(losses[0] < 1e-2);

        let samples = loss.samples.as_ref().unwrap();
        assert_approx_eq!(samples.row_norms()[0], 1.0, 1e-6);
    }

    #[test]
    fn rejects_mismatched_targets() {
        let mut loss = L2Distance::default();
        assert!(loss.compute_losses(&Matrix::zeros(2, 3), &Matrix::zeros(3, 3)).is_err());
    }

    #[test]
    fn has_no_updates() {
        assert!(L2Distance::default().updates().is_empty());
    }

    #[test]
    fn mean_loss_averages_samples() {
        let mut loss = L2Distance::with_eps(false, 0.0);
        let out = Matrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 1.0]]).unwrap();
        let tgt = Matrix::zeros(2, 2);
        assert_approx_eq!(loss.mean_loss(&out, &tgt).unwrap(), 3.0, 1e-12);
    }
}
