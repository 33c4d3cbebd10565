use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Serialize;
use std::time::Duration;

use crate::config::RemoteEmbeddingConfig;
use crate::error::{AskdeskError, Result};

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
}

/// Client for the Hugging Face Inference API feature-extraction pipeline.
///
/// The wire shape differs from the OpenAI endpoint: the model lives in the
/// URL path and the response is a bare array of vectors.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
}

impl HuggingFaceClient {
    pub fn new(config: &RemoteEmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskdeskError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = FeatureExtractionRequest {
            inputs: texts.to_vec(),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| AskdeskError::Embedding(format!("Invalid API key header: {e}")))?,
            );
        }

        let url = format!(
            "{}/pipeline/feature-extraction/{}",
            self.base_url, self.model
        );

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .headers(headers.clone())
                .json(&request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body: Vec<Vec<f32>> = resp.json().await.map_err(|e| {
                            AskdeskError::Embedding(format!("Failed to parse response: {e}"))
                        })?;
                        return Ok(body);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse().ok());
                        last_error = Some(AskdeskError::ApiRateLimit { retry_after });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(AskdeskError::ApiAuth(body));
                    }

                    // The Inference API returns 503 while a cold model loads;
                    // treat it like any other retryable server error.
                    if status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_error = Some(AskdeskError::Embedding(format!(
                            "Server error {status}: {body}"
                        )));
                        continue;
                    }

                    let body = resp.text().await.unwrap_or_default();
                    return Err(AskdeskError::Embedding(format!(
                        "API error {status}: {body}"
                    )));
                }
                Err(e) => {
                    last_error = Some(AskdeskError::Embedding(format!("Request failed: {e}")));
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AskdeskError::Embedding("Unknown error".to_string())))
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[text]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AskdeskError::Embedding("No embedding returned".to_string()))
    }
}
