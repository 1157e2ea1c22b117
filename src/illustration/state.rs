//! Per-page illustration state and its transitions.
//!
//! DESIGN
//! ======
//! `PageIllustrationState` is the state machine for one `PageKey`:
//!
//! ```text
//! idle ──► pending ──► done
//!             │  ▲        │
//!             ▼  └────────┤
//!           error ────────┘   (any status may re-enter pending)
//! ```
//!
//! Fields are private so the image history can only grow through
//! [`PageIllustrationState::complete`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message id used when an assistant message carries no identity.
pub const FALLBACK_MESSAGE_ID: &str = "ai";

// =============================================================================
// PAGE KEY
// =============================================================================

/// Addresses one page of one message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageKey {
    pub message_id: String,
    pub page_id: i64,
}

impl PageKey {
    #[must_use]
    pub fn new(message_id: impl Into<String>, page_id: i64) -> Self {
        Self { message_id: message_id.into(), page_id }
    }

    /// Key for a page of a message that may lack an id.
    #[must_use]
    pub fn for_message(message_id: Option<&str>, page_id: i64) -> Self {
        Self::new(message_id.unwrap_or(FALLBACK_MESSAGE_ID), page_id)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.message_id, self.page_id)
    }
}

// =============================================================================
// STATUS / IMAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No request issued yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The latest request succeeded.
    Done,
    /// The latest request failed. Earlier images are kept.
    Error,
}

/// One generated version of a page illustration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    /// Unique per process; disambiguates identical URLs.
    pub image_id: String,
}

impl GeneratedImage {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), image_id: Uuid::new_v4().to_string() }
    }
}

// =============================================================================
// PAGE ILLUSTRATION STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageIllustrationState {
    status: Status,
    images: Vec<GeneratedImage>,
    active_index: usize,
    draft: String,
    is_editing: bool,
    error: Option<String>,
}

impl PageIllustrationState {
    /// Fresh idle state whose draft starts as the page's default prompt.
    #[must_use]
    pub fn new(draft: impl Into<String>) -> Self {
        Self {
            status: Status::Idle,
            images: Vec::new(),
            active_index: 0,
            draft: draft.into(),
            is_editing: false,
            error: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    /// Active index clamped into the history; `None` while it is empty.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        let last = self.images.len().checked_sub(1)?;
        Some(self.active_index.min(last))
    }

    #[must_use]
    pub fn active_image(&self) -> Option<&GeneratedImage> {
        self.active_index().map(|i| &self.images[i])
    }

    /// Eligible for an automatic request: never requested, nothing generated.
    #[must_use]
    pub fn needs_auto_trigger(&self) -> bool {
        self.status == Status::Idle && self.images.is_empty()
    }

    // -------------------------------------------------------------------------
    // transitions
    // -------------------------------------------------------------------------

    /// Enter `pending` for `prompt` (already trimmed and non-empty).
    pub fn begin(&mut self, prompt: &str) {
        self.status = Status::Pending;
        self.error = None;
        self.draft = prompt.to_string();
    }

    /// Append a new version and select it.
    pub fn complete(&mut self, image: GeneratedImage, prompt: &str) {
        self.images.push(image);
        self.active_index = self.images.len() - 1;
        self.status = Status::Done;
        self.error = None;
        self.draft = prompt.to_string();
    }

    /// Record a failure. History and selection are untouched.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.error = Some(message.into());
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn toggle_editing(&mut self) {
        self.is_editing = !self.is_editing;
    }

    pub fn stop_editing(&mut self) {
        self.is_editing = false;
    }

    /// Select a version. Returns `false` (and changes nothing) when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            return false;
        }
        self.active_index = index;
        true
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
