//! Image generation types: provider-neutral options, errors and trait.

use crate::wire::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by image generation providers.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The prompt was empty after trimming.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}: {body}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered without any image.
    #[error("No image generated")]
    NoImage,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ImageGenError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::NoImage => "E_NO_IMAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::NoImage | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Per-request generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub count: u32,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self { count: 1, aspect_ratio: None, image_size: None }
    }
}

// =============================================================================
// IMAGE GENERATOR TRAIT
// =============================================================================

/// Provider-neutral async trait for image generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate images for `prompt`, returned as `data:` URLs.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageGenError`] if the request fails or yields no image.
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<Vec<String>, ImageGenError>;

    /// Model identifier for logging.
    fn model(&self) -> &str;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
