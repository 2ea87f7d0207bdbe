use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::activation::activation::ActivationFunction;
use crate::error::Result;

/// Flat, serializable description of a model architecture.
///
/// Together with the parameter list this is everything needed to rebuild a
/// model. `output_size` is only present for models with a regression head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    /// Stored by name, e.g. `"tanh"`.
    pub activation: ActivationFunction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_size: Option<usize>,
}

impl Hyperparameters {
    /// Serializes the hyperparameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Hyperparameters> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_a_flat_mapping() {
        let hp = Hyperparameters {
            input_size: 100,
            hidden_sizes: vec![500, 500],
            activation: ActivationFunction::Tanh,
            output_size: Some(3),
        };
        let value = serde_json::to_value(&hp).unwrap();
        assert_eq!(value["activation"], "tanh");
        assert_eq!(value["output_size"], 3);
        assert_eq!(value["hidden_sizes"], serde_json::json!([500, 500]));

        let back: Hyperparameters = serde_json::from_value(value).unwrap();
        assert_eq!(back, hp);
    }

    #[test]
    fn output_size_is_optional() {
        let hp: Hyperparameters = serde_json::from_str(
            r#"{"input_size": 4, "hidden_sizes": [8], "activation": "relu"}"#,
        ).unwrap();
        assert_eq!(hp.output_size, None);
        assert!(!serde_json::to_string(&hp).unwrap().contains("output_size"));
    }
}
