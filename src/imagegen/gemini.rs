//! Gemini image generation client.
//!
//! Thin HTTP wrapper for `models/{model}:generateContent` with the IMAGE
//! response modality. One call usually yields one image, so a request for N
//! images makes up to N sequential calls and returns at most N. Pure request
//! building and response parsing for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ImageGenConfig;
use super::types::{ImageGenError, ImageGenerator, ImageOptions};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_images: u32,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`ImageGenError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: ImageGenConfig) -> Result<Self, ImageGenError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ImageGenError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key,
            model: config.model,
            base_url: config.base_url,
            max_images: config.max_images,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_one(&self, prompt: &str, options: &ImageOptions) -> Result<Vec<String>, ImageGenError> {
        let body = build_request(prompt, options);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ImageGenError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

#[async_trait::async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<Vec<String>, ImageGenError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ImageGenError::EmptyPrompt);
        }

        let count = options.count.clamp(1, self.max_images);
        let wanted = count as usize;
        let mut images = Vec::with_capacity(wanted);
        for attempt in 0..count {
            if images.len() >= wanted {
                break;
            }
            let batch = self.generate_one(prompt, options).await?;
            debug!(attempt, returned = batch.len(), "gemini: generateContent ok");
            images.extend(batch);
        }
        // A single response may carry several inline images.
        images.truncate(wanted);
        Ok(images)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// =============================================================================
// BUILDING / PARSING
// =============================================================================

fn build_request<'a>(prompt: &'a str, options: &'a ImageOptions) -> ApiRequest<'a> {
    let aspect_ratio = options.aspect_ratio.as_deref();
    let image_size = options.image_size.as_deref();
    let image_config =
        (aspect_ratio.is_some() || image_size.is_some()).then_some(ImageConfig { aspect_ratio, image_size });

    ApiRequest {
        contents: vec![RequestContent { role: "user", parts: vec![TextPart { text: prompt }] }],
        generation_config: GenerationConfig { response_modalities: vec!["IMAGE"], image_config },
    }
}

/// Collect every inline image part as a `data:` URL.
fn parse_response(json: &str) -> Result<Vec<String>, ImageGenError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ImageGenError::ApiParse(e.to_string()))?;

    let images: Vec<String> = api
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .filter(|data| !data.data.is_empty())
        .map(|data| format!("data:{};base64,{}", data.mime_type, data.data))
        .collect();

    if images.is_empty() {
        return Err(ImageGenError::NoImage);
    }
    Ok(images)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
