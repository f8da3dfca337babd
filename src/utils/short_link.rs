//! Public link construction for stored short codes.
//!
//! The core returns raw `short_id` strings; anything that embeds a code in a
//! URL path goes through [`ShortLinkBuilder`], which percent-escapes it.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Builds public short links under a fixed base URL.
///
/// The base URL comes from configuration at construction time.
#[derive(Debug, Clone)]
pub struct ShortLinkBuilder {
    base_url: Url,
}

impl ShortLinkBuilder {
    /// Creates a builder for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL does not parse, is not
    /// HTTP/HTTPS, or cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::bad_request(
                "Invalid base URL",
                json!({ "base_url": base_url, "reason": e.to_string() }),
            )
        })?;

        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(AppError::bad_request(
                "Base URL must be an http or https URL",
                json!({ "base_url": base_url.as_str() }),
            ));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the public link for `short_id`, escaping it as one path segment.
    pub fn short_url(&self, short_id: &str) -> String {
        self.link_with_segments(&[short_id])
    }

    /// Returns the link that serves the QR image for `short_id`.
    pub fn qr_code_url(&self, short_id: &str) -> String {
        self.link_with_segments(&["qr", short_id])
    }

    fn link_with_segments(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.set_query(None);
        url.set_fragment(None);
        url.into()
    }
}

/// Appends the query string of an incoming redirect request to the stored
/// target URL.
///
/// The target is treated as an opaque string: without an incoming query it is
/// returned unchanged. Otherwise the query is joined with `&` when the target
/// already has one and with `?` when it does not, ahead of any fragment.
pub fn redirect_target(target: &str, incoming_query: Option<&str>) -> String {
    let incoming = incoming_query.unwrap_or("").trim_start_matches('?');
    if incoming.is_empty() {
        return target.to_string();
    }

    let (base, fragment) = match target.find('#') {
        Some(pos) => target.split_at(pos),
        None => (target, ""),
    };

    let separator = match base.find('?') {
        Some(pos) if pos + 1 < base.len() => "&",
        Some(_) => "",
        None => "?",
    };

    format!("{base}{separator}{incoming}{fragment}")
}
