use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::error::{Result, TractError};
use crate::math::matrix::Matrix;
use crate::model::ffnn_regression::States;

/// A fiber path as an ordered list of voxel-space points.
pub type Streamline = Vec<[f64; 3]>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Distance travelled per step, in voxels.
    pub step_size: f64,
    pub max_steps: usize,
    /// Streamlines stop once the predicted direction is shorter than this.
    pub min_direction_norm: f64,
    /// Streamlines stop before leaving `[0, bound]` on any axis.
    pub bounds: Option<[f64; 3]>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            step_size: 0.5,
            max_steps: 500,
            min_direction_norm: 1e-6,
            bounds: None,
        }
    }
}

fn inside(p: &[f64; 3], bounds: Option<[f64; 3]>) -> bool {
    match bounds {
        Some(b) => p.iter().zip(b).all(|(&x, hi)| (0.0..=hi).contains(&x)),
        None => p.iter().all(|x| x.is_finite()),
    }
}

fn keep_rows(m: &Matrix, keep: &[bool]) -> Result<Matrix> {
    if m.rows != keep.len() {
        return Err(TractError::shape("tracking state", &[keep.len(), m.cols], &m.shape()));
    }
    let data: Vec<Vec<f64>> = m
        .data
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(r, _)| r.clone())
        .collect();
    Ok(Matrix { rows: data.len(), cols: m.cols, data })
}

/// Grows one streamline per seed by repeatedly querying `generator`.
///
/// `generator` has the shape returned by
/// `FfnnRegression::make_sequence_generator`. Only still-growing streamlines
/// are sent at each step; rows of the state matrices that belong to stopped
/// streamlines are dropped so every state keeps the batch size.
pub fn track<G>(
    generator: G,
    seeds: &[[f64; 3]],
    initial_states: States,
    config: &TrackingConfig,
) -> Result<Vec<Streamline>>
where
    G: Fn(&Matrix, States) -> Result<(Matrix, States)>,
{
    if config.step_size <= 0.0 || !config.step_size.is_finite() {
        return Err(TractError::config("step_size must be a positive number"));
    }

    let mut streamlines: Vec<Streamline> = seeds.iter().map(|s| vec![*s]).collect();
    let mut active: Vec<usize> = (0..seeds.len()).collect();
    let mut states = initial_states;

    for step in 0..config.max_steps {
        if active.is_empty() {
            debug!("All streamlines stopped after {} step(s)", step);
            break;
        }

        let positions = Matrix::from_rows(
            active
                .iter()
                .map(|&i| streamlines[i].last().map_or_else(Vec::new, |p| p.to_vec()))
                .collect(),
        )?;

        let (directions, new_states) = generator(&positions, states)?;
        if directions.rows != active.len() || directions.cols != 3 {
            return Err(TractError::shape("track", &[active.len(), 3], &directions.shape()));
        }

        let mut keep = vec![false; active.len()];
        for (k, (&i, dir)) in active.iter().zip(&directions.data).enumerate() {
            let norm = dir.iter().map(|d| d * d).sum::<f64>().sqrt();
            if !(norm >= config.min_direction_norm) {
                continue;
            }

            let Some(last) = streamlines[i].last().copied() else { continue };
            let scale = config.step_size / norm;
            let next = [
                last[0] + dir[0] * scale,
                last[1] + dir[1] * scale,
                last[2] + dir[2] * scale,
            ];
            if inside(&next, config.bounds) {
                streamlines[i].push(next);
                keep[k] = true;
            }
        }

        states = new_states
            .iter()
            .map(|s| keep_rows(s, &keep))
            .collect::<Result<States>>()?;
        active = active
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(&i, _)| i)
            .collect();
    }

    let points: usize = streamlines.iter().map(Vec::len).sum();
    info!("Tracked {} streamline(s), {} point(s)", streamlines.len(), points);
    Ok(streamlines)
}
