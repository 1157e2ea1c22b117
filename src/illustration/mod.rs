//! Illustration: per-page image generation for storyboard messages.
//!
//! DESIGN
//! ======
//! An assistant message whose content is a list of pages gets one
//! illustration state per (message, page). The [`PageIllustrationManager`]
//! auto-generates an image for every new page, lets the user edit a page's
//! prompt and regenerate, and keeps every generated version so an older one
//! can be shown again. Presentation reads [`PageView`]s and calls the
//! manager's operations; it never touches state directly.

pub mod config;
pub mod manager;
pub mod pages;
pub mod service;
pub mod state;
pub mod store;
pub mod view;

pub use config::{IllustrationConfig, StalePolicy};
pub use manager::{Completion, PageIllustrationManager, RequestId};
pub use pages::{PageDescriptor, pages_from_value, parse_pages};
pub use service::{HttpImageService, IllustrationError, ImageService};
pub use state::{GeneratedImage, PageIllustrationState, PageKey, Status};
pub use view::{Overlay, PageView, Thumbnail};
