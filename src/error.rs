use reqwest::StatusCode;
use thiserror::Error;

use crate::providers::ProviderId;

/// Errors surfaced by the weather tools.
///
/// Every failure reaches the MCP layer as one of these kinds so the transport
/// can tell bad input apart from an upstream outage.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Location '{0}' not found. Please check the spelling and try again.")]
    LocationNotFound(String),

    /// The upstream cause is rendered into the message, not chained as a source.
    #[error("{provider} request failed: {cause}")]
    Upstream {
        provider: ProviderId,
        cause: UpstreamError,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("location cache error: {0}")]
    Cache(#[from] std::io::Error),
}

impl WeatherError {
    pub fn upstream(provider: ProviderId, cause: UpstreamError) -> Self {
        Self::Upstream { provider, cause }
    }

    /// True when the caller supplied something the provider cannot serve.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::LocationNotFound(_))
    }
}

/// Failure talking to an upstream weather API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("invalid API key (status 401)")]
    Unauthorized,

    #[error("service is temporarily unavailable (status {0}), please try again later")]
    Unavailable(StatusCode),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

// Request URLs carry query credentials such as the AccuWeather `apikey`.
impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Unavailable(status) | Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::Malformed(_) => None,
        }
    }
}
