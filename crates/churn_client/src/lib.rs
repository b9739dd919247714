//! Churn Prediction Client
//!
//! Talks to the remote prediction service and loads the client configuration:
//! - `client`: `POST <base>/predict` implementation of [`PredictionService`]
//! - `config`: Defaults, optional TOML file and environment overrides
//! - `errors`: Client construction and configuration errors
//! - `types`: Wire request/response bodies

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

pub use client::HttpPredictionClient;
pub use config::{ClientConfig, ConfigManager, ConfigSource};
pub use errors::{ClientError, ConfigError};
pub use types::{PredictRequest, PredictResponse};

/// Re-export the core session types the client plugs into
pub use churn_core::{
    EncodedVector, FeatureSchema, HistoryLog, Prediction, PredictionFailed, PredictionService,
    PredictionSession,
};
