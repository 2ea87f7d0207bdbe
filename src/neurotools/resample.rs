use log::debug;
use std::f64::consts::PI;

use crate::error::{Result, TractError};
use crate::volume::volume4d::Volume4D;

/// Volumes acquired with a b-value below this are treated as b0 images.
pub const B0_THRESHOLD: f64 = 10.0;

pub const DEFAULT_SPHERE_DIRECTIONS: usize = 100;

/// Angular width (radians) of the kernel used to spread acquired directions
/// over the target sphere.
const KERNEL_WIDTH: f64 = 0.35;

/// `n` near-uniform unit vectors on the sphere (Fibonacci lattice).
pub fn fibonacci_sphere(n: usize) -> Vec<[f64; 3]> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f64;
            [r * theta.cos(), r * theta.sin(), z]
        })
        .collect()
}

fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    (n > 1e-12).then(|| [v[0] / n, v[1] / n, v[2] / n])
}

/// Resamples a DWI acquisition onto a fixed sphere of `n_directions`.
///
/// Every diffusion-weighted channel is divided by the voxel's mean b0 signal,
/// then each sphere direction takes a kernel-weighted average of the acquired
/// directions (antipodally symmetric, so `g` and `-g` count the same). Voxels
/// without b0 signal come out as zeros. The result has the same spatial grid
/// and `n_directions` channels, so subjects with different gradient tables
/// become comparable.
pub fn resample_dwi(
    dwi: &Volume4D,
    bvals: &[f64],
    bvecs: &[[f64; 3]],
    n_directions: usize,
) -> Result<Volume4D> {
    let n_channels = dwi.channels();
    if bvals.len() != n_channels || bvecs.len() != n_channels {
        return Err(TractError::shape("resample_dwi", &[n_channels, n_channels], &[bvals.len(), bvecs.len()]));
    }
    if n_directions == 0 {
        return Err(TractError::config("resampling needs at least one direction"));
    }

    let b0_idx: Vec<usize> = (0..n_channels).filter(|&i| bvals[i] < B0_THRESHOLD).collect();
    if b0_idx.is_empty() {
        return Err(TractError::config("DWI has no b0 volume"));
    }

    let mut dw_idx = Vec::new();
    let mut dw_dirs = Vec::new();
    for i in (0..n_channels).filter(|&i| bvals[i] >= B0_THRESHOLD) {
        let dir = normalize(bvecs[i])
            .ok_or_else(|| TractError::config(format!("gradient {} has a null direction", i)))?;
        dw_idx.push(i);
        dw_dirs.push(dir);
    }
    if dw_idx.is_empty() {
        return Err(TractError::config("DWI has no diffusion-weighted volume"));
    }

    // weights[j][k]: contribution of acquired direction k to sphere direction j.
    let sphere = fibonacci_sphere(n_directions);
    let weights: Vec<Vec<f64>> = sphere
        .iter()
        .map(|d| {
            let raw: Vec<f64> = dw_dirs
                .iter()
                .map(|g| {
                    let cos = (d[0] * g[0] + d[1] * g[1] + d[2] * g[2]).abs().min(1.0);
                    let angle = cos.acos();
                    (-(angle * angle) / (2.0 * KERNEL_WIDTH * KERNEL_WIDTH)).exp()
                })
                .collect();
            let total: f64 = raw.iter().sum();
            raw.into_iter().map(|w| w / total).collect()
        })
        .collect();

    debug!(
        "Resampling {} b0 + {} weighted volume(s) onto {} direction(s)",
        b0_idx.len(),
        dw_idx.len(),
        n_directions
    );

    let [nx, ny, nz, _] = dwi.dims();
    let mut out = Volume4D::zeros([nx, ny, nz, n_directions]);
    let mut attenuation = vec![0.0; dw_idx.len()];
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let voxel = dwi.voxel(x, y, z);
                let b0 = b0_idx.iter().map(|&i| voxel[i] as f64).sum::<f64>() / b0_idx.len() as f64;
                if b0 <= 0.0 {
                    continue;
                }
                for (a, &i) in attenuation.iter_mut().zip(&dw_idx) {
                    *a = voxel[i] as f64 / b0;
                }

                let dst = out.voxel_mut(x, y, z);
                for (o, w) in dst.iter_mut().zip(&weights) {
                    *o = w.iter().zip(&attenuation).map(|(w, a)| w * a).sum::<f64>() as f32;
                }
            }
        }
    }
    Ok(out)
}
