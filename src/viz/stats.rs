use crate::error::{Result, TractError};
use crate::volume::volume4d::Volume4D;

/// Scale applied to the standard deviation when drawing error bands.
pub const STD_SCALE: f64 = 0.1;

/// Per-channel signal statistics over the voxels that carry any signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStats {
    pub means: Vec<f64>,
    /// Population standard deviation, multiplied by the requested scale.
    pub stds: Vec<f64>,
    pub n_voxels: usize,
}

impl ChannelStats {
    /// Statistics over voxels whose channel sum is non-zero.
    pub fn over_nonzero_voxels(volume: &Volume4D, std_scale: f64) -> Result<ChannelStats> {
        let nc = volume.channels();
        let mut sum = vec![0.0f64; nc];
        let mut sum_sq = vec![0.0f64; nc];
        let mut n = 0usize;

        for voxel in volume.voxels().filter(|v| v.iter().sum::<f32>() != 0.0) {
            for ((s, q), &v) in sum.iter_mut().zip(sum_sq.iter_mut()).zip(voxel) {
                let v = v as f64;
                *s += v;
                *q += v * v;
            }
            n += 1;
        }

        if n == 0 {
            return Err(TractError::Empty("volume has no non-zero voxel"));
        }

        let n_f = n as f64;
        let means: Vec<f64> = sum.iter().map(|s| s / n_f).collect();
        let stds = sum_sq
            .iter()
            .zip(&means)
            .map(|(q, m)| (q / n_f - m * m).max(0.0).sqrt() * std_scale)
            .collect();

        Ok(ChannelStats { means, stds, n_voxels: n })
    }
}
