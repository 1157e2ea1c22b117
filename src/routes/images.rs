//! Image generation route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::{info, warn};

use crate::imagegen::{ImageGenError, ImageOptions};
use crate::state::AppState;
use crate::wire::{ErrorBody, ErrorCode, GenerateImageRequest, GenerateImageResponse};

/// Error response: status plus a `{detail, code}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, detail: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { detail: detail.into(), code: code.to_owned() } }
    }
}

impl From<ImageGenError> for ApiError {
    fn from(e: ImageGenError) -> Self {
        Self::new(gen_error_to_status(&e), e.error_code(), e.to_string())
    }
}

/// Malformed body, wrong content type or missing fields keep axum's status
/// but answer with the same `{detail, code}` body as every other failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "E_INVALID_REQUEST", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn gen_error_to_status(e: &ImageGenError) -> StatusCode {
    match e {
        ImageGenError::EmptyPrompt => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /generate_image`: generate images for a prompt.
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let Json(req) = payload?;

    let Some(generator) = state.generator.as_ref() else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "E_IMAGE_NOT_CONFIGURED",
            "image generation is not configured",
        ));
    };

    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(ImageGenError::EmptyPrompt.into());
    }

    let options = ImageOptions {
        count: req.number_of_images.max(1),
        aspect_ratio: req.aspect_ratio,
        image_size: req.image_size,
    };

    info!(prompt_len = prompt.len(), count = options.count, model = generator.model(), "image: generate");
    match generator.generate(prompt, &options).await {
        Ok(images) => {
            info!(returned = images.len(), "image: generated");
            Ok(Json(GenerateImageResponse { images }))
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "image: generation failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
