use serde::{Serialize, Deserialize};

use crate::error::{Result, TractError};

/// Multi-channel 3D grid: `dims = [nx, ny, nz, channels]`, channels contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VolumeData")]
pub struct Volume4D {
    dims: [usize; 4],
    data: Vec<f32>,
}

#[derive(Deserialize)]
struct VolumeData {
    dims: [usize; 4],
    data: Vec<f32>,
}

impl TryFrom<VolumeData> for Volume4D {
    type Error = TractError;

    fn try_from(raw: VolumeData) -> Result<Volume4D> {
        Volume4D::new(raw.dims, raw.data)
    }
}

impl Volume4D {
    pub fn new(dims: [usize; 4], data: Vec<f32>) -> Result<Volume4D> {
        let expected = dims.iter().product::<usize>();
        if data.len() != expected {
            return Err(TractError::shape("Volume4D::new", &[expected], &[data.len()]));
        }
        Ok(Volume4D { dims, data })
    }

    pub fn zeros(dims: [usize; 4]) -> Volume4D {
        Volume4D { dims, data: vec![0.0; dims.iter().product()] }
    }

    /// Builds a volume by evaluating `f(x, y, z)` for every voxel; `f` must
    /// return exactly `channels` values.
    pub fn from_fn<F>(dims: [usize; 4], mut f: F) -> Result<Volume4D>
    where
        F: FnMut(usize, usize, usize) -> Vec<f32>,
    {
        let [nx, ny, nz, nc] = dims;
        let mut data = Vec::with_capacity(nx * ny * nz * nc);
        for x in 0..nx {
            for y in 0..ny {
                for z in 0..nz {
                    let v = f(x, y, z);
                    if v.len() != nc {
                        return Err(TractError::shape("Volume4D::from_fn", &[nc], &[v.len()]));
                    }
                    data.extend(v);
                }
            }
        }
        Ok(Volume4D { dims, data })
    }

    pub fn dims(&self) -> [usize; 4] {
        self.dims
    }

    pub fn spatial_dims(&self) -> [usize; 3] {
        [self.dims[0], self.dims[1], self.dims[2]]
    }

    pub fn channels(&self) -> usize {
        self.dims[3]
    }

    pub fn n_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        ((x * self.dims[1] + y) * self.dims[2] + z) * self.dims[3]
    }

    /// Channel vector at an integer voxel. Panics when out of bounds.
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> &[f32] {
        let start = self.offset(x, y, z);
        &self.data[start..start + self.dims[3]]
    }

    pub fn voxel_mut(&mut self, x: usize, y: usize, z: usize) -> &mut [f32] {
        let start = self.offset(x, y, z);
        let nc = self.dims[3];
        &mut self.data[start..start + nc]
    }

    /// Iterates over every voxel's channel vector in x-major order.
    pub fn voxels(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.dims[3].max(1))
    }

    /// Trilinear interpolation at a continuous voxel coordinate.
    ///
    /// Coordinates are clamped to `[0, n - 1]` along each axis, so points
    /// outside the grid take the value of the nearest border.
    pub fn interpolate(&self, point: [f64; 3], out: &mut [f64]) {
        let nc = self.dims[3];
        debug_assert_eq!(out.len(), nc);
        out.iter_mut().for_each(|v| *v = 0.0);
        if self.n_voxels() == 0 {
            return;
        }

        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut frac = [0f64; 3];
        for axis in 0..3 {
            let max = (self.dims[axis] - 1) as f64;
            let p = if point[axis].is_nan() { 0.0 } else { point[axis].clamp(0.0, max) };
            let f = p.floor();
            lo[axis] = f as usize;
            hi[axis] = (lo[axis] + 1).min(self.dims[axis] - 1);
            frac[axis] = p - f;
        }

        for corner in 0..8 {
            let pick = |axis: usize| corner >> axis & 1 == 1;
            let mut w = 1.0;
            let mut idx = [0usize; 3];
            for axis in 0..3 {
                if pick(axis) {
                    w *= frac[axis];
                    idx[axis] = hi[axis];
                } else {
                    w *= 1.0 - frac[axis];
                    idx[axis] = lo[axis];
                }
            }
            if w == 0.0 {
                continue;
            }
            for (o, &v) in out.iter_mut().zip(self.voxel(idx[0], idx[1], idx[2])) {
                *o += w * v as f64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ramp() -> Volume4D {
        Volume4D::from_fn([3, 3, 3, 2], |x, y, z| {
            vec![(x + 10 * y + 100 * z) as f32, 1.0]
        }).unwrap()
    }

    #[test]
    fn new_checks_length() {
        assert!(Volume4D::new([2, 2, 2, 1], vec![0.0; 7]).is_err());
        assert!(Volume4D::new([2, 2, 2, 1], vec![0.0; 8]).is_ok());
    }

    #[test]
    fn deserializing_checks_length() {
        let ok: Volume4D = serde_json::from_str(r#"{"dims":[1,1,2,1],"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.voxel(0, 0, 1), &[2.0]);
        assert!(serde_json::from_str::<Volume4D>(r#"{"dims":[2,2,2,2],"data":[1.0,1.0]}"#).is_err());
    }

    #[test]
    fn interpolate_hits_grid_points_exactly() {
        let vol = ramp();
        let mut out = [0.0; 2];
        vol.interpolate([2.0, 1.0, 0.0], &mut out);
        assert_approx_eq!(out[0], 12.0, 1e-9);
        assert_approx_eq!(out[1], 1.0, 1e-9);
    }

    #[test]
    fn interpolate_is_linear_between_voxels() {
        let vol = ramp();
        let mut out = [0.0; 2];
        vol.interpolate([0.5, 0.25, 1.5], &mut out);
        assert_approx_eq!(out[0], 0.5 + 2.5 + 150.0, 1e-9);
        assert_approx_eq!(out[1], 1.0, 1e-9);
    }

    #[test]
    fn interpolate_clamps_outside_points() {
        let vol = ramp();
        let mut out = [0.0; 2];
        vol.interpolate([-4.0, 9.0, 2.0], &mut out);
        assert_approx_eq!(out[0], 0.0 + 20.0 + 200.0, 1e-9);
    }
}
