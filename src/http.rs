use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::constants::{MAX_ERROR_BODY, USER_AGENT};
use crate::error::UpstreamError;

/// Shared HTTP client issuing single JSON GET requests to provider endpoints.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Arc<Client>,
}

impl HttpFetcher {
    /// Creates a fetcher with the crate's user agent
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

fn status_error(status: StatusCode, body: &str) -> UpstreamError {
    match status {
        StatusCode::UNAUTHORIZED => UpstreamError::Unauthorized,
        StatusCode::SERVICE_UNAVAILABLE => UpstreamError::Unavailable(status),
        _ => UpstreamError::Status {
            status,
            body: truncate_body(body),
        },
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
