use url::Url;

/// Reduce a URL to its origin (scheme + host + optional port), without a
/// trailing slash.
///
/// Unparsable input only loses trailing slashes.
pub fn normalize_origin(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed
            .origin()
            .ascii_serialization()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// Deterministic Organization `@id` for a page URL.
///
/// Derived from the origin, not the full page URL, so every page of a site
/// references the same Organization identity.
pub fn organization_id(page_url: &str) -> String {
    format!("{}/#organization", normalize_origin(page_url))
}
