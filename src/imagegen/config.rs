//! Image provider configuration parsed from environment variables.

use super::types::ImageGenError;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_IMAGE_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Upper bound on `number_of_images` accepted per request.
pub const DEFAULT_MAX_IMAGES_PER_REQUEST: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_images: u32,
    pub timeouts: ImageTimeouts,
}

impl ImageGenConfig {
    /// Build typed image provider config from environment variables.
    ///
    /// Required:
    /// - `GEMINI_API_KEY`
    ///
    /// Optional (blank counts as unset):
    /// - `IMAGE_MODEL`: default `gemini-3-pro-image-preview` (a `models/` prefix is accepted)
    /// - `GEMINI_BASE_URL`: default Generative Language API v1beta
    /// - `IMAGE_MAX_PER_REQUEST`: default 4
    /// - `IMAGE_REQUEST_TIMEOUT_SECS`: default 120
    /// - `IMAGE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ImageGenError::MissingApiKey`] when the key is unset or blank,
    /// and [`ImageGenError::ConfigParse`] for an unusable limit.
    pub fn from_env() -> Result<Self, ImageGenError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ImageGenError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .ok_or_else(|| ImageGenError::MissingApiKey { var: "GEMINI_API_KEY".into() })?;

        let model = normalize_model(&non_empty("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()));
        let base_url = non_empty("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let max_images = match non_empty("IMAGE_MAX_PER_REQUEST") {
            None => DEFAULT_MAX_IMAGES_PER_REQUEST,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ImageGenError::ConfigParse(format!(
                        "IMAGE_MAX_PER_REQUEST must be a positive integer, got '{raw}'"
                    )));
                }
            },
        };

        let timeouts = ImageTimeouts {
            request_secs: parse_u64(non_empty("IMAGE_REQUEST_TIMEOUT_SECS"), DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(non_empty("IMAGE_CONNECT_TIMEOUT_SECS"), DEFAULT_IMAGE_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, model, base_url, max_images, timeouts })
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

/// Accept both `models/foo` and `foo`.
fn normalize_model(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix("models/").unwrap_or(trimmed).to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
