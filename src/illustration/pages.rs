//! Page extraction: assistant message content → page descriptors.
//!
//! A message is a storyboard only when its content parses as JSON and every
//! entry has an integer `id` and a string `detail`. Anything else is plain
//! text and never reaches the illustration manager.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One illustratable page of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Unique within one message's page list.
    pub id: i64,
    /// Default prompt for the page.
    pub detail: String,
}

impl PageDescriptor {
    #[must_use]
    pub fn new(id: i64, detail: impl Into<String>) -> Self {
        Self { id, detail: detail.into() }
    }
}

/// Parse raw message content into pages.
///
/// Returns `None` when the content is not a storyboard.
#[must_use]
pub fn parse_pages(content: &str) -> Option<Vec<PageDescriptor>> {
    let value: Value = serde_json::from_str(content).ok()?;
    pages_from_decoded(&value)
}

/// Extract pages from message content held as a JSON value.
///
/// A string value is the raw content and is decoded once; any other value is
/// taken as already decoded.
#[must_use]
pub fn pages_from_value(value: &Value) -> Option<Vec<PageDescriptor>> {
    match value {
        Value::String(raw) => parse_pages(raw),
        other => pages_from_decoded(other),
    }
}

/// Accepts a JSON array of descriptors, or an object whose every value is a
/// descriptor (`{"page_1": {...}, ...}`), which is ordered by page id.
/// A decoded string is plain text, never a second encoding.
fn pages_from_decoded(value: &Value) -> Option<Vec<PageDescriptor>> {
    match value {
        Value::Array(items) => items.iter().map(descriptor_from_value).collect(),
        Value::Object(map) if !map.is_empty() => {
            let mut pages: Vec<PageDescriptor> = map.values().map(descriptor_from_value).collect::<Option<_>>()?;
            pages.sort_by_key(|p| p.id);
            Some(pages)
        }
        _ => None,
    }
}

fn descriptor_from_value(value: &Value) -> Option<PageDescriptor> {
    let obj = value.as_object()?;
    let id = obj.get("id")?.as_i64()?;
    let detail = obj.get("detail")?.as_str()?;
    Some(PageDescriptor::new(id, detail))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
