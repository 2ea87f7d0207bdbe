use log::debug;
use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::error::{Result, TractError};
use crate::volume::volume4d::Volume4D;

/// Diffusion encoding of every acquired volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradients {
    pub bvals: Vec<f64>,
    pub bvecs: Vec<[f64; 3]>,
}

/// One subject: raw DWI signal plus its gradient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractographyData {
    pub signal: Volume4D,
    pub gradients: Gradients,
}

impl TractographyData {
    pub fn new(signal: Volume4D, gradients: Gradients) -> Result<TractographyData> {
        let data = TractographyData { signal, gradients };
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<()> {
        let n = self.signal.channels();
        if self.gradients.bvals.len() != n || self.gradients.bvecs.len() != n {
            return Err(TractError::shape(
                "TractographyData gradients",
                &[n, n],
                &[self.gradients.bvals.len(), self.gradients.bvecs.len()],
            ));
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<TractographyData> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let data: TractographyData = serde_json::from_reader(std::io::BufReader::new(file))?;
        data.validate()?;
        debug!("Loaded {} with signal dims {:?}", path.display(), data.signal.dims());
        Ok(data)
    }
}
