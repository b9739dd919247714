//! Wire bodies exchanged with the prediction service

use churn_core::EncodedVector;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// `{"features": [number, ...]}` in schema order
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest<'a> {
    pub features: &'a EncodedVector,
}

/// `{"prediction": number}`; any other fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub prediction: Number,
}
