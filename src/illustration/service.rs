//! Image service: the outbound collaborator of the illustration manager.
//!
//! `HttpImageService` is a thin wrapper over `POST /generate_image`. The
//! `ImageService` trait is the seam that lets tests substitute a mock.

use std::time::Duration;

use super::config::IllustrationConfig;
use crate::wire::{ErrorBody, ErrorCode, GenerateImageRequest, GenerateImageResponse};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced on the illustration side.
///
/// `Display` is the human-readable text stored on a failed page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllustrationError {
    /// The trimmed prompt was empty. Never stored on a page.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// Transport failure or non-success response.
    #[error("{0}")]
    RequestFailed(String),

    /// The service answered successfully but without an image.
    #[error("No image returned")]
    NoImageReturned,

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for IllustrationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::RequestFailed(_) => "E_REQUEST_FAILED",
            Self::NoImageReturned => "E_NO_IMAGE",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::NoImageReturned)
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Async image generation seam. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageService: Send + Sync {
    /// Request images for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`IllustrationError::RequestFailed`] on transport errors,
    /// non-success statuses, or unreadable bodies.
    async fn generate(&self, request: &GenerateImageRequest) -> Result<GenerateImageResponse, IllustrationError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpImageService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpImageService {
    /// # Errors
    ///
    /// Returns [`IllustrationError::HttpClientBuild`] if the client fails to build.
    pub fn new(config: &IllustrationConfig) -> Result<Self, IllustrationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| IllustrationError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ImageService for HttpImageService {
    async fn generate(&self, request: &GenerateImageRequest) -> Result<GenerateImageResponse, IllustrationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| IllustrationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IllustrationError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(failure_from_body(status.as_u16(), &text));
        }

        parse_response(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(body: &str) -> Result<GenerateImageResponse, IllustrationError> {
    serde_json::from_str(body).map_err(|e| IllustrationError::RequestFailed(format!("invalid response body: {e}")))
}

/// The response body is the message: the `detail` of a backend error body,
/// otherwise the raw text. An empty body falls back to the status.
fn failure_from_body(status: u16, body: &str) -> IllustrationError {
    let body = body.trim();
    if body.is_empty() {
        return IllustrationError::RequestFailed(format!("HTTP {status}"));
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => IllustrationError::RequestFailed(err.detail),
        Err(_) => IllustrationError::RequestFailed(body.to_string()),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
