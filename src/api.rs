use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct QueryRequest {
    #[serde(rename = "Request")]
    request: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

/// HTTP client for the assistant agent endpoint.
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    endpoint: String,
}

impl AssistantClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Send one user query and return the raw response text.
    ///
    /// The raw text still carries the section markers; callers run it
    /// through [`crate::parser::split_assistant_response`] before display.
    pub async fn query(&self, text: &str) -> Result<String> {
        let request = QueryRequest {
            request: text.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "assistant request rejected");
            return Err(anyhow!("Network response was not ok"));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.response)
    }
}
