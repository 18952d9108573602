use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use lens_core::RawVerdict;

const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("network error: {0}")]
    Network(String),
    #[error("classification service error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClassifyError {
    /// The provider's own text, used for phrase categorization upstream.
    pub fn provider_message(&self) -> &str {
        match self {
            ClassifyError::Network(message) => message,
            ClassifyError::Api { message, .. } => message,
            ClassifyError::Parse(message) => message,
        }
    }
}

/// Opaque classification service: canonical encoded image in, verdict out.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, photo_data_uri: &str) -> Result<RawVerdict, ClassifyError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest<'a> {
    photo_data_uri: &'a str,
}

pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteClassifier {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(CLASSIFY_TIMEOUT)
            .build()
            .map_err(|err| ClassifyError::Network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, photo_data_uri: &str) -> Result<RawVerdict, ClassifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { photo_data_uri });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|err| ClassifyError::Network(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "classification rejected");
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<RawVerdict>()
            .await
            .map_err(|err| ClassifyError::Parse(err.to_string()))
    }
}
