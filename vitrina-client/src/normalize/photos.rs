//! Photo URL extraction

use serde_json::Value;

/// Fields probed on each photo descriptor, in priority order
const URL_FIELDS: &[&[&str]] = &[
    &["url"],
    &["photoUrl"],
    &["imageUrl"],
    &["src"],
    &["path"],
    &["image", "url"],
    &["metadata", "url"],
];

/// Extract absolute photo URLs from a loosely-shaped photo set.
///
/// Descriptors may be bare strings or objects carrying the URL under one of
/// several field names. Anything that does not yield an `http(s)://` URL is
/// skipped. Order and duplicates are preserved.
pub fn extract_photo_urls(photo_set: &Value) -> Vec<String> {
    let Some(descriptors) = photo_set.as_array() else {
        if !photo_set.is_null() {
            tracing::debug!("Photo set is not an array, ignoring");
        }
        return Vec::new();
    };

    descriptors.iter().filter_map(descriptor_url).collect()
}

/// URL carried by a single descriptor, if any
pub fn descriptor_url(descriptor: &Value) -> Option<String> {
    if let Some(direct) = descriptor.as_str() {
        return accept(direct);
    }

    let found = URL_FIELDS
        .iter()
        .find_map(|path| lookup(descriptor, path).and_then(accept));
    if found.is_none() {
        tracing::debug!(?descriptor, "Dropping photo descriptor without usable URL");
    }
    found
}

/// Logo URL, if the record carries a usable one
pub fn logo_url(raw: Option<&str>) -> Option<String> {
    raw.and_then(accept)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))?
        .as_str()
}

fn accept(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        Some(candidate.to_string())
    } else {
        None
    }
}
