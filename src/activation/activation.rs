use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};
use std::fmt;
use std::str::FromStr;

use crate::error::TractError;

/// Element-wise activation used by the hidden layers.
///
/// Stored in the hyperparameters by name (see `name()` / `FromStr`), so the
/// serialized form is a plain string such as `"tanh"` or `"relu"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    /// Fixed slope of 0.01 on the negative side.
    LeakyReLU,
    Elu,
    Gelu,
    Swish,
    Softplus,
}

const LEAKY_SLOPE: f64 = 0.01;

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU => if x > 0.0 { x } else { LEAKY_SLOPE * x },
            ActivationFunction::Elu => {
                if x > 0.0 { x } else { E.powf(x) - 1.0 }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
            // ln(1 + e^x), stable for large |x|
            ActivationFunction::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
        }
    }

    /// Name used in serialized hyperparameters.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Identity => "identity",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::LeakyReLU => "leaky_relu",
            ActivationFunction::Elu => "elu",
            ActivationFunction::Gelu => "gelu",
            ActivationFunction::Swish => "swish",
            ActivationFunction::Softplus => "softplus",
        }
    }
}

impl FromStr for ActivationFunction {
    type Err = TractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let act = match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => ActivationFunction::Sigmoid,
            "relu" => ActivationFunction::ReLU,
            "identity" | "linear" => ActivationFunction::Identity,
            "tanh" => ActivationFunction::Tanh,
            "leaky_relu" | "leakyrelu" => ActivationFunction::LeakyReLU,
            "elu" => ActivationFunction::Elu,
            "gelu" => ActivationFunction::Gelu,
            "swish" | "silu" => ActivationFunction::Swish,
            "softplus" => ActivationFunction::Softplus,
            _ => return Err(TractError::UnknownActivation(s.to_string())),
        };
        Ok(act)
    }
}

impl TryFrom<String> for ActivationFunction {
    type Error = TractError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ActivationFunction> for String {
    fn from(act: ActivationFunction) -> String {
        act.name().to_string()
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn names_parse_back() {
        for act in [
            ActivationFunction::Sigmoid,
            ActivationFunction::ReLU,
            ActivationFunction::Identity,
            ActivationFunction::Tanh,
            ActivationFunction::LeakyReLU,
            ActivationFunction::Elu,
            ActivationFunction::Gelu,
            ActivationFunction::Swish,
            ActivationFunction::Softplus,
        ] {
            assert_eq!(act.name().parse::<ActivationFunction>().unwrap(), act);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            "maxout".parse::<ActivationFunction>(),
            Err(TractError::UnknownActivation(_))
        ));
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&ActivationFunction::Tanh).unwrap();
        assert_eq!(json, "\"tanh\"");
        let back: ActivationFunction = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(back, ActivationFunction::ReLU);
    }

    #[test]
    fn values() {
        assert_approx_eq!(ActivationFunction::Sigmoid.function(0.0), 0.5, 1e-12);
        assert_approx_eq!(ActivationFunction::ReLU.function(-3.0), 0.0, 1e-12);
        assert_approx_eq!(ActivationFunction::LeakyReLU.function(-2.0), -0.02, 1e-12);
        assert_approx_eq!(ActivationFunction::Softplus.function(0.0), 2f64.ln(), 1e-12);
        assert_approx_eq!(ActivationFunction::Softplus.function(50.0), 50.0, 1e-9);
    }
}
