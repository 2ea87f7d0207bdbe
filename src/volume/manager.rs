use log::debug;

use crate::error::{Result, TractError};
use crate::math::matrix::Matrix;
use crate::volume::volume4d::Volume4D;

/// Evaluates diffusion signal at continuous coordinates.
///
/// `coords` has shape `(batch, 4)`: voxel-space `(x, y, z)` followed by the
/// subject id stored as a float. The result has shape `(batch, data_dimension())`.
pub trait VolumeManager {
    fn data_dimension(&self) -> usize;

    fn eval_at_coords(&self, coords: &Matrix) -> Result<Matrix>;
}

impl<V: VolumeManager + ?Sized> VolumeManager for &V {
    fn data_dimension(&self) -> usize {
        (**self).data_dimension()
    }

    fn eval_at_coords(&self, coords: &Matrix) -> Result<Matrix> {
        (**self).eval_at_coords(coords)
    }
}

/// Holds one DWI volume per subject and samples them by trilinear interpolation.
#[derive(Debug, Clone, Default)]
pub struct DwiVolumeManager {
    volumes: Vec<Volume4D>,
}

impl DwiVolumeManager {
    pub fn new() -> Self {
        DwiVolumeManager { volumes: Vec::new() }
    }

    /// Adds a subject volume and returns its subject id.
    pub fn register(&mut self, volume: Volume4D) -> Result<usize> {
        if let Some(first) = self.volumes.first() {
            if first.channels() != volume.channels() {
                return Err(TractError::shape(
                    "DwiVolumeManager::register",
                    &[first.channels()],
                    &[volume.channels()],
                ));
            }
        }
        self.volumes.push(volume);
        let id = self.volumes.len() - 1;
        debug!("Registered subject {} with dims {:?}", id, self.volumes[id].dims());
        Ok(id)
    }

    pub fn volume(&self, subject_id: usize) -> Option<&Volume4D> {
        self.volumes.get(subject_id)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    fn subject(&self, raw: f64) -> Result<&Volume4D> {
        let id = raw.round();
        if id < 0.0 || !id.is_finite() {
            return Err(TractError::UnknownSubject { id: id as i64, available: self.volumes.len() });
        }
        self.volumes.get(id as usize).ok_or(TractError::UnknownSubject {
            id: id as i64,
            available: self.volumes.len(),
        })
    }
}

impl VolumeManager for DwiVolumeManager {
    fn data_dimension(&self) -> usize {
        self.volumes.first().map_or(0, Volume4D::channels)
    }

    fn eval_at_coords(&self, coords: &Matrix) -> Result<Matrix> {
        if coords.cols != 4 {
            return Err(TractError::shape("eval_at_coords", &[coords.rows, 4], &coords.shape()));
        }

        let mut out = Matrix::zeros(coords.rows, self.data_dimension());
        for (row, dst) in coords.data.iter().zip(out.data.iter_mut()) {
            let volume = self.subject(row[3])?;
            volume.interpolate([row[0], row[1], row[2]], dst);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f32, channels: usize) -> Volume4D {
        Volume4D::from_fn([2, 2, 2, channels], |_, _, _| vec![value; channels]).unwrap()
    }

    #[test]
    fn dispatches_on_subject_column() {
        let mut manager = DwiVolumeManager::new();
        assert_eq!(manager.register(constant(1.0, 3)).unwrap(), 0);
        assert_eq!(manager.register(constant(5.0, 3)).unwrap(), 1);

        let coords = Matrix::from_rows(vec![
            vec![0.5, 0.5, 0.5, 0.0],
            vec![0.5, 0.5, 0.5, 1.0],
        ]).unwrap();
        let out = manager.eval_at_coords(&coords).unwrap();
        assert_eq!(out.data, vec![vec![1.0; 3], vec![5.0; 3]]);
    }

    #[test]
    fn rejects_unknown_subject() {
        let mut manager = DwiVolumeManager::new();
        manager.register(constant(1.0, 3)).unwrap();
        let coords = Matrix::from_rows(vec![vec![0.0, 0.0, 0.0, 3.0]]).unwrap();
        assert!(matches!(
            manager.eval_at_coords(&coords),
            Err(TractError::UnknownSubject { id: 3, available: 1 })
        ));
    }

    #[test]
    fn rejects_mismatched_channel_counts() {
        let mut manager = DwiVolumeManager::new();
        manager.register(constant(1.0, 3)).unwrap();
        assert!(manager.register(constant(1.0, 4)).is_err());
    }

    #[test]
    fn rejects_coords_without_subject_column() {
        let mut manager = DwiVolumeManager::new();
        manager.register(constant(1.0, 3)).unwrap();
        assert!(manager.eval_at_coords(&Matrix::zeros(2, 3)).is_err());
    }
}
