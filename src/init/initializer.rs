use rand::prelude::*;
use rand::rngs::StdRng;
use std::f64::consts::PI;

use crate::math::matrix::Matrix;

/// Strategy used to fill a weight matrix of shape `(fan_in, fan_out)`.
///
/// Seeded initializers draw from a single generator across calls, so two fresh
/// initializers with the same seed fill the same architecture identically.
pub trait WeightsInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix;
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    // Draw two independent uniform samples in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn fill<F>(rows: usize, cols: usize, mut sample: F) -> Matrix
where
    F: FnMut() -> f64,
{
    let mut res = Matrix::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            res.data[i][j] = sample();
        }
    }
    res
}

/// Glorot-uniform initialization: U(-b, b) with b = sqrt(6 / (fan_in + fan_out)).
#[derive(Debug, Clone)]
pub struct UniformInitializer {
    seed: u64,
    rng: StdRng,
}

impl UniformInitializer {
    pub fn new(seed: u64) -> Self {
        UniformInitializer { seed, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for UniformInitializer {
    fn default() -> Self {
        UniformInitializer::new(1234)
    }
}

impl WeightsInitializer for UniformInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix {
        let bound = (6.0 / (rows + cols).max(1) as f64).sqrt();
        let rng = &mut self.rng;
        fill(rows, cols, || rng.gen_range(-bound..=bound))
    }
}

/// Samples from N(0, std^2).
#[derive(Debug, Clone)]
pub struct GaussianInitializer {
    std: f64,
    rng: StdRng,
}

impl GaussianInitializer {
    pub fn new(seed: u64, std: f64) -> Self {
        GaussianInitializer { std, rng: StdRng::seed_from_u64(seed) }
    }
}

impl WeightsInitializer for GaussianInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix {
        let std = self.std;
        let rng = &mut self.rng;
        fill(rows, cols, || sample_standard_normal(rng) * std)
    }
}

/// He initialization: samples from N(0, sqrt(2 / fan_in)).
///
/// Recommended before ReLU layers. The variance 2/fan_in accounts for
/// the fact that ReLU zeroes half of its inputs on average.
#[derive(Debug, Clone)]
pub struct HeInitializer {
    rng: StdRng,
}

impl HeInitializer {
    pub fn new(seed: u64) -> Self {
        HeInitializer { rng: StdRng::seed_from_u64(seed) }
    }
}

impl WeightsInitializer for HeInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix {
        let std_dev = (2.0 / rows.max(1) as f64).sqrt();
        let rng = &mut self.rng;
        fill(rows, cols, || sample_standard_normal(rng) * std_dev)
    }
}

/// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / fan_in)).
///
/// Recommended before Sigmoid/Tanh/Identity layers.
#[derive(Debug, Clone)]
pub struct XavierInitializer {
    rng: StdRng,
}

impl XavierInitializer {
    pub fn new(seed: u64) -> Self {
        XavierInitializer { rng: StdRng::seed_from_u64(seed) }
    }
}

impl WeightsInitializer for XavierInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix {
        let std_dev = (1.0 / rows.max(1) as f64).sqrt();
        let rng = &mut self.rng;
        fill(rows, cols, || sample_standard_normal(rng) * std_dev)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZerosInitializer;

impl WeightsInitializer for ZerosInitializer {
    fn generate(&mut self, rows: usize, cols: usize) -> Matrix {
        Matrix::zeros(rows, cols)
    }
}
