//! Illustration client configuration parsed from environment variables.

use super::service::IllustrationError;
use crate::wire::{DEFAULT_ASPECT_RATIO, DEFAULT_IMAGE_SIZE, GenerateImageRequest};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8123";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// What to do with a completion that is not the latest request issued for
/// its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every completion in arrival order (last write wins).
    #[default]
    Apply,
    /// Drop completions superseded by a newer request for the same page.
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationConfig {
    pub backend_url: String,
    pub aspect_ratio: String,
    pub image_size: String,
    pub stale_policy: StalePolicy,
    pub timeouts: ClientTimeouts,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            stale_policy: StalePolicy::Apply,
            timeouts: ClientTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl IllustrationConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STORYBOARD_BACKEND_URL`: default `http://localhost:8123`
    /// - `STORYBOARD_ASPECT_RATIO`: default `16:9`
    /// - `STORYBOARD_IMAGE_SIZE`: default `1K`
    /// - `STORYBOARD_STALE_POLICY`: `apply` (default) or `discard`
    /// - `STORYBOARD_REQUEST_TIMEOUT_SECS`: default 180
    /// - `STORYBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`IllustrationError::ConfigParse`] for an unknown stale policy.
    pub fn from_env() -> Result<Self, IllustrationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`IllustrationError::ConfigParse`] for an unknown stale policy.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IllustrationError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = non_empty("STORYBOARD_BACKEND_URL")
            .unwrap_or(defaults.backend_url)
            .trim_end_matches('/')
            .to_string();
        let aspect_ratio = non_empty("STORYBOARD_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio);
        let image_size = non_empty("STORYBOARD_IMAGE_SIZE").unwrap_or(defaults.image_size);
        let stale_policy = parse_stale_policy(lookup("STORYBOARD_STALE_POLICY").as_deref())?;
        let timeouts = ClientTimeouts {
            request_secs: parse_u64(lookup("STORYBOARD_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("STORYBOARD_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { backend_url, aspect_ratio, image_size, stale_policy, timeouts })
    }

    /// Full URL of the generation endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/generate_image", self.backend_url.trim_end_matches('/'))
    }

    /// Request body for one image of `prompt`.
    #[must_use]
    pub fn request_for(&self, prompt: &str) -> GenerateImageRequest {
        GenerateImageRequest {
            prompt: prompt.to_string(),
            number_of_images: 1,
            aspect_ratio: Some(self.aspect_ratio.clone()),
            image_size: Some(self.image_size.clone()),
        }
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}

/// Parse a stale-completion policy name.
///
/// # Errors
///
/// Returns [`IllustrationError::ConfigParse`] for anything but `apply`/`discard`.
pub fn parse_stale_policy(raw: Option<&str>) -> Result<StalePolicy, IllustrationError> {
    match raw.map(str::trim).unwrap_or("apply") {
        "" | "apply" => Ok(StalePolicy::Apply),
        "discard" => Ok(StalePolicy::Discard),
        other => Err(IllustrationError::ConfigParse(format!(
            "unknown stale policy '{other}' (expected 'apply' or 'discard')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
