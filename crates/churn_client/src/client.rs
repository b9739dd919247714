//! Prediction service client

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::types::{PredictRequest, PredictResponse};
use async_trait::async_trait;
use churn_core::{EncodedVector, Prediction, PredictionFailed, PredictionService};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client for `POST <base>/predict`. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    config: ClientConfig,
    predict_url: Url,
    client: reqwest::Client,
}

impl HttpPredictionClient {
    /// Create a new client. Fails only on an unusable base address.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let predict_url = Self::build_predict_url(&config.api_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            predict_url,
            client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    fn build_predict_url(base: &str) -> Result<Url, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: base.to_string(),
            reason,
        };

        let trimmed = base.trim().trim_end_matches('/');
        let url =
            Url::parse(&format!("{trimmed}/predict")).map_err(|e| invalid(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, features: &EncodedVector) -> Result<Prediction, PredictionFailed> {
        debug!(url = %self.predict_url, features = features.len(), "posting features");

        let response = self
            .client
            .post(self.predict_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&PredictRequest { features })
            .send()
            .await
            .map_err(|e| PredictionFailed::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionFailed::status(status.as_u16(), body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PredictionFailed::transport(e.to_string()))?;
        let parsed: PredictResponse = serde_json::from_slice(&body)?;
        let prediction = Prediction::from_wire(parsed.prediction);

        info!(
            status = status.as_u16(),
            prediction = prediction.label(),
            "prediction service replied"
        );
        Ok(prediction)
    }
}
