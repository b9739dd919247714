//! Prediction result as reported by the service

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;

/// Binary churn classification. On the wire `0` is stay and `1` is churn;
/// any other number is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Stay,
    Churn,
    Unrecognized(Number),
}

impl Prediction {
    pub fn from_wire(value: Number) -> Self {
        match value.as_f64() {
            Some(v) if v == 0.0 => Prediction::Stay,
            Some(v) if v == 1.0 => Prediction::Churn,
            _ => Prediction::Unrecognized(value),
        }
    }

    pub fn to_wire(&self) -> Number {
        match self {
            Prediction::Stay => Number::from(0u8),
            Prediction::Churn => Number::from(1u8),
            Prediction::Unrecognized(value) => value.clone(),
        }
    }

    /// Short label used in history listings
    pub fn label(&self) -> &'static str {
        match self {
            Prediction::Stay => "Stay",
            Prediction::Churn => "Churn",
            Prediction::Unrecognized(_) => "Unrecognized",
        }
    }

    pub fn is_churn(&self) -> bool {
        matches!(self, Prediction::Churn)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Stay => write!(f, "This customer is likely to STAY."),
            Prediction::Churn => write!(f, "This customer is likely to CHURN."),
            Prediction::Unrecognized(value) => {
                write!(f, "The service returned an unrecognized prediction: {value}")
            }
        }
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Number::deserialize(deserializer).map(Prediction::from_wire)
    }
}
