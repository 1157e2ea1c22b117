//! View projection: render-ready snapshot of one page.
//!
//! Pure: the same state and descriptor always produce the same view. A page
//! with no state yet renders as idle with no images.

use serde::Serialize;

use super::pages::PageDescriptor;
use super::state::{GeneratedImage, PageIllustrationState, PageKey, Status};

/// Loading indicator to draw for the image area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    None,
    /// Regenerating: dim the current image and spin over it.
    SpinnerOverImage,
    /// No image to show yet: "Generating image..." placeholder.
    Placeholder,
}

/// One selectable version in the history strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub index: usize,
    pub image_id: String,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub key: PageKey,
    pub page_id: i64,
    /// Draft prompt, or the page default when no state exists.
    pub text: String,
    pub status: Status,
    pub active_image: Option<GeneratedImage>,
    pub active_index: Option<usize>,
    pub overlay: Overlay,
    /// Failure text, only while the last request has failed.
    pub error: Option<String>,
    /// Empty unless there is more than one version to choose from.
    pub thumbnails: Vec<Thumbnail>,
    pub is_editing: bool,
    /// Regenerate is disabled while a request is in flight.
    pub can_regenerate: bool,
}

#[must_use]
pub fn project(key: &PageKey, state: Option<&PageIllustrationState>, page: &PageDescriptor) -> PageView {
    let Some(state) = state else {
        return PageView {
            key: key.clone(),
            page_id: page.id,
            text: page.detail.clone(),
            status: Status::Idle,
            active_image: None,
            active_index: None,
            overlay: Overlay::Placeholder,
            error: None,
            thumbnails: Vec::new(),
            is_editing: false,
            can_regenerate: true,
        };
    };

    let active_index = state.active_index();
    let active_image = state.active_image().cloned();
    let status = state.status();

    let overlay = match (&active_image, status) {
        (Some(_), Status::Pending) => Overlay::SpinnerOverImage,
        (Some(_), _) | (None, Status::Error) => Overlay::None,
        (None, _) => Overlay::Placeholder,
    };

    let error = if status == Status::Error {
        Some(state.error().unwrap_or_default().to_string())
    } else {
        None
    };

    let thumbnails = if state.images().len() > 1 {
        state
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| Thumbnail {
                index,
                image_id: image.image_id.clone(),
                url: image.url.clone(),
                active: Some(index) == active_index,
            })
            .collect()
    } else {
        Vec::new()
    };

    PageView {
        key: key.clone(),
        page_id: page.id,
        text: state.draft().to_string(),
        status,
        active_image,
        active_index,
        overlay,
        error,
        thumbnails,
        is_editing: state.is_editing(),
        can_regenerate: !state.is_pending(),
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
