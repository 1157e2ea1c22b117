use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ImageGenConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.model, DEFAULT_IMAGE_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.max_images, DEFAULT_MAX_IMAGES_PER_REQUEST);
    assert_eq!(
        cfg.timeouts,
        ImageTimeouts {
            request_secs: DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_IMAGE_CONNECT_TIMEOUT_SECS
        }
    );
}

#[test]
fn from_lookup_overrides() {
    let cfg = ImageGenConfig::from_lookup(lookup(&[
        ("GEMINI_API_KEY", "secret"),
        ("IMAGE_MODEL", "models/imagen-test"),
        ("GEMINI_BASE_URL", "http://127.0.0.1:9999/v1beta/"),
        ("IMAGE_MAX_PER_REQUEST", "2"),
        ("IMAGE_REQUEST_TIMEOUT_SECS", "42"),
        ("IMAGE_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.model, "imagen-test");
    assert_eq!(cfg.base_url, "http://127.0.0.1:9999/v1beta");
    assert_eq!(cfg.max_images, 2);
    assert_eq!(cfg.timeouts, ImageTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn missing_api_key_errors() {
    let err = ImageGenConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, ImageGenError::MissingApiKey { ref var } if var == "GEMINI_API_KEY"));
}

#[test]
fn blank_api_key_errors() {
    let err = ImageGenConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, ImageGenError::MissingApiKey { .. }));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let cfg = ImageGenConfig::from_lookup(lookup(&[
        ("GEMINI_API_KEY", "secret"),
        ("IMAGE_MODEL", ""),
        ("GEMINI_BASE_URL", "  "),
        ("IMAGE_MAX_PER_REQUEST", ""),
        ("IMAGE_REQUEST_TIMEOUT_SECS", " "),
    ]))
    .unwrap();
    assert_eq!(cfg.model, DEFAULT_IMAGE_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.max_images, DEFAULT_MAX_IMAGES_PER_REQUEST);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS);
}

#[test]
fn zero_max_images_errors() {
    let err = ImageGenConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k"), ("IMAGE_MAX_PER_REQUEST", "0")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("IMAGE_MAX_PER_REQUEST"));
}

#[test]
fn normalize_model_strips_prefix() {
    assert_eq!(normalize_model("models/gemini-3-pro-image-preview"), "gemini-3-pro-image-preview");
    assert_eq!(normalize_model(" gemini-x "), "gemini-x");
}
