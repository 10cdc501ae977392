//! Metaculus API Integration
//! Fetches the raw question snapshot: one GET, bounded timeout, no retries.

use reqwest::Client;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::TrackerError;

pub struct MetaculusClient {
    client: Client,
    url: String,
}

impl MetaculusClient {
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TrackerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.question_url(),
        })
    }

    /// GET the question and parse the body as JSON
    pub async fn fetch_question(&self) -> Result<Value, TrackerError> {
        debug!(url = %self.url, "requesting question snapshot");
        let started = Instant::now();

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TrackerError::from_transport(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "question request rejected");
            return Err(TrackerError::HttpStatus {
                status,
                url: self.url.clone(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::from_transport(&self.url, e))?;

        info!(
            %status,
            body_len = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "question snapshot received"
        );

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %body.chars().take(200).collect::<String>(),
                "question JSON parse failed"
            );
            TrackerError::JsonParse(e)
        })
    }
}
