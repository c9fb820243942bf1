//! Hugging Face Inference HTTP client
//!
//! One POST per classification:
//! `POST {endpoint}/{model}` with body `{"inputs": "<text>"}` and a bearer token.

use std::time::Duration;

use super::{adapter, dto};
use crate::enrichment::domain::{ProviderFault, SentimentError};
use crate::model::SentimentScore;

/// Serverless inference root for the hf-inference provider.
pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models";

/// Binary sentiment model used unless configured otherwise.
pub const DEFAULT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";

/// Hugging Face text-classification client
pub struct HuggingFaceClient {
    api_token: String,
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HuggingFaceClient {
    /// Create a client for `model` on the default endpoint
    pub fn new(api_token: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(api_token, DEFAULT_ENDPOINT, model)
    }

    /// Create a client against a custom endpoint
    pub fn with_endpoint(
        api_token: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(60))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_token: api_token.into(),
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify `text`, returning candidates ordered by descending score
    pub async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError> {
        let response = self.send_request(text).await?;
        adapter::to_scores(response)
    }

    /// Send the HTTP request and parse the response
    async fn send_request(&self, text: &str) -> Result<dto::ClassificationResponse, ProviderFault> {
        let response = self
            .http_client
            .post(self.model_url())
            .bearer_auth(&self.api_token)
            .json(&dto::ClassificationRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let fault = ProviderFault::from_status(status);
            // Loading models answer 503 with an error body worth surfacing
            if let ProviderFault::Http { status, .. } = fault
                && let Ok(dto::ClassificationResponse::Error(err)) =
                    response.json::<dto::ClassificationResponse>().await
            {
                return Err(ProviderFault::Http {
                    status,
                    message: err.error,
                });
            }
            return Err(fault);
        }

        response
            .json::<dto::ClassificationResponse>()
            .await
            .map_err(|e| ProviderFault::Parse(e.to_string()))
    }

    fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }
}
