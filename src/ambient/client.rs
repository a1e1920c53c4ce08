use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::AmbientConfig;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to Ambient failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ambient returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to decode Ambient response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Ambient returned no data points")]
    EmptyResponse,
    #[error("field {0} is missing from the latest data point")]
    MissingField(String),
}

/// One record of an Ambient channel: `d1`..`d8` plus the `created` timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl DataPoint {
    /// Numeric value of `field`. Numeric strings are accepted; null, absent
    /// and non-finite values are not.
    pub fn value(&self, field: &str) -> Option<f64> {
        let value = match self.fields.get(field)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn require(&self, field: &str) -> Result<f64, FetchError> {
        self.value(field)
            .ok_or_else(|| FetchError::MissingField(field.to_string()))
    }
}

/// Source of the most recent sensor record.
#[allow(async_fn_in_trait)]
pub trait SensorSource {
    async fn latest(&self) -> Result<DataPoint, FetchError>;
}

/// Read-only client for the Ambient channel data API
pub struct AmbientClient {
    client: reqwest::Client,
    base_url: String,
    channel_id: String,
    read_key: String,
}

impl AmbientClient {
    pub fn new(config: &AmbientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(concat!("ambient-alert/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone(),
            read_key: config.read_key.clone(),
        })
    }

    pub fn data_url(&self) -> String {
        format!("{}/api/v2/channels/{}/data", self.base_url, self.channel_id)
    }

    /// Fetch the `n` most recent data points, newest first
    pub async fn read(&self, n: usize) -> Result<Vec<DataPoint>, FetchError> {
        let n = n.to_string();
        let response = self
            .client
            .get(self.data_url())
            .query(&[("readKey", self.read_key.as_str()), ("n", n.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        // the read key travels in the query string; keep it out of error messages
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;
        parse_data_points(&body)
    }
}

impl SensorSource for AmbientClient {
    async fn latest(&self) -> Result<DataPoint, FetchError> {
        self.read(1)
            .await?
            .into_iter()
            .next()
            .ok_or(FetchError::EmptyResponse)
    }
}

pub fn parse_data_points(body: &str) -> Result<Vec<DataPoint>, FetchError> {
    Ok(serde_json::from_str(body)?)
}
