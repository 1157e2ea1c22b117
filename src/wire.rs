//! Wire types for the `/generate_image` endpoint.
//!
//! DESIGN
//! ======
//! Shared by the backend route and the illustration client so both sides
//! agree on one JSON shape. Optional fields let older callers omit the
//! image configuration and fall back to provider defaults.

use serde::{Deserialize, Serialize};

/// Default `aspect_ratio` sent when the caller leaves it unset.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";
/// Default `image_size` sent when the caller leaves it unset.
pub const DEFAULT_IMAGE_SIZE: &str = "1K";

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable machine-readable code attached to error responses.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same request may succeed.
    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// Body of `POST /generate_image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    #[serde(default = "default_number_of_images")]
    pub number_of_images: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

fn default_number_of_images() -> u32 {
    1
}

/// Successful response: one URL per generated image, usually `data:` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    #[serde(default)]
    pub images: Vec<String>,
}

/// Error body returned by the backend on any non-success status of
/// `/generate_image`, including rejected request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub code: String,
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
