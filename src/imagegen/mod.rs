//! Image generation: provider adapter behind `/generate_image`.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The [`ImageGenerator`] trait is the
//! seam the HTTP route depends on; [`GeminiClient`] is the only provider.

pub mod config;
pub mod gemini;
pub mod types;

pub use config::ImageGenConfig;
pub use gemini::GeminiClient;
pub use types::{ImageGenError, ImageGenerator, ImageOptions};

/// Build the configured provider from environment variables.
///
/// # Errors
///
/// Returns an error if the API key is missing or the HTTP client fails.
pub fn from_env() -> Result<GeminiClient, ImageGenError> {
    let config = ImageGenConfig::from_env()?;
    GeminiClient::new(config)
}
