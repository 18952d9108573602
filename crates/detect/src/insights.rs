use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lens_core::UsageHistoryEntry;

const INSIGHT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("network error: {0}")]
    Network(String),
    #[error("insight service error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

/// Opaque summarizer: scan history in, natural-language usage summary out.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn usage_insights(
        &self,
        subject_id: &str,
        history: &[UsageHistoryEntry],
    ) -> Result<String, InsightError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsightRequest<'a> {
    subject_id: &'a str,
    history: &'a [UsageHistoryEntry],
}

#[derive(Deserialize)]
struct InsightResponse {
    insights: String,
}

pub struct RemoteInsightGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteInsightGenerator {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(INSIGHT_TIMEOUT)
            .build()
            .map_err(|err| InsightError::Network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl InsightGenerator for RemoteInsightGenerator {
    async fn usage_insights(
        &self,
        subject_id: &str,
        history: &[UsageHistoryEntry],
    ) -> Result<String, InsightError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InsightRequest {
                subject_id,
                history,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|err| InsightError::Network(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp
            .json::<InsightResponse>()
            .await
            .map_err(|err| InsightError::Parse(err.to_string()))?;
        Ok(body.insights)
    }
}
