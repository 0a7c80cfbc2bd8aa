//! Response and header hygiene for proxied traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions (RFC 9110 §7.6.1)
//! - Drop the inbound `Host` header so the client fills in the upstream
//!   authority when forwarding

use axum::http::header::HeaderMap;

/// Headers that are connection-scoped and must not be forwarded.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Prepare inbound request headers for forwarding to an upstream.
///
/// Hop-by-hop headers go, and so does `Host`, since the HTTP client derives the
/// correct authority from the rewritten URI.
pub fn sanitize_forward_headers(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
    headers.remove("host");
}
