//! Error types shared by the model, loss, volume and visualization code.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Two operands disagree on their (rows, cols) or (x, y, z, channels) shape.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Unknown activation function: {0:?}")]
    UnknownActivation(String),

    #[error("Unknown subject id {id} ({available} volume(s) loaded)")]
    UnknownSubject { id: i64, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Empty input: {0}")]
    Empty(&'static str),
}

impl TractError {
    pub fn shape(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        TractError::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        TractError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TractError>;
