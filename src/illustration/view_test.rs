use super::*;

fn page() -> PageDescriptor {
    PageDescriptor::new(1, "a cat")
}

fn key() -> PageKey {
    PageKey::new("m", 1)
}

#[test]
fn missing_state_projects_as_idle() {
    let view = project(&key(), None, &page());
    assert_eq!(view.status, Status::Idle);
    assert_eq!(view.text, "a cat");
    assert!(view.active_image.is_none());
    assert_eq!(view.overlay, Overlay::Placeholder);
    assert!(view.error.is_none());
    assert!(view.thumbnails.is_empty());
    assert!(!view.is_editing);
    assert!(view.can_regenerate);
}

#[test]
fn pending_without_image_shows_placeholder() {
    let mut state = PageIllustrationState::new("a cat");
    state.begin("a cat");
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.overlay, Overlay::Placeholder);
    assert!(!view.can_regenerate);
}

#[test]
fn pending_with_image_spins_over_it() {
    let mut state = PageIllustrationState::new("a cat");
    state.complete(GeneratedImage::new("u1"), "a cat");
    state.begin("a dog");
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.overlay, Overlay::SpinnerOverImage);
    assert_eq!(view.active_image.unwrap().url, "u1");
    assert_eq!(view.text, "a dog");
}

#[test]
fn done_shows_active_image_without_overlay() {
    let mut state = PageIllustrationState::new("a cat");
    state.complete(GeneratedImage::new("u1"), "a cat");
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.status, Status::Done);
    assert_eq!(view.overlay, Overlay::None);
    assert_eq!(view.active_index, Some(0));
    // A single version has nothing to choose between.
    assert!(view.thumbnails.is_empty());
}

#[test]
fn error_without_image_shows_message_only() {
    let mut state = PageIllustrationState::new("a cat");
    state.begin("a cat");
    state.fail("No image returned");
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.overlay, Overlay::None);
    assert_eq!(view.error.as_deref(), Some("No image returned"));
    assert!(view.active_image.is_none());
    assert!(view.can_regenerate);
}

#[test]
fn error_keeps_showing_previous_image() {
    let mut state = PageIllustrationState::new("a cat");
    state.complete(GeneratedImage::new("u1"), "a cat");
    state.begin("a cat");
    state.fail("503 Service Unavailable");
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.active_image.unwrap().url, "u1");
    assert_eq!(view.error.as_deref(), Some("503 Service Unavailable"));
}

#[test]
fn thumbnails_mark_active_version() {
    let mut state = PageIllustrationState::new("a cat");
    state.complete(GeneratedImage::new("u1"), "a cat");
    state.complete(GeneratedImage::new("u2"), "a dog");
    state.select(0);
    let view = project(&key(), Some(&state), &page());
    assert_eq!(view.thumbnails.len(), 2);
    assert!(view.thumbnails[0].active);
    assert!(!view.thumbnails[1].active);
    assert_eq!(view.thumbnails[1].url, "u2");
    assert_eq!(view.active_image.unwrap().url, "u1");
}

#[test]
fn view_reflects_edit_mode() {
    let mut state = PageIllustrationState::new("a cat");
    state.toggle_editing();
    let view = project(&key(), Some(&state), &page());
    assert!(view.is_editing);
}

#[test]
fn view_serializes_status_and_overlay() {
    let view = project(&key(), None, &page());
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["status"], "idle");
    assert_eq!(json["overlay"], "placeholder");
}
