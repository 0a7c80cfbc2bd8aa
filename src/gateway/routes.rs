//! Upstream route table.
//!
//! # Design Decisions
//! - Prefix match on the first path segment; prefixes are disjoint by
//!   construction (validation rejects duplicates)
//! - Immutable after construction, shared via Arc
//! - Explicit no-match rather than a silent default upstream

use url::Url;

use crate::config::schema::UpstreamConfig;
use crate::error::GatewayError;

/// One upstream service the gateway forwards to.
#[derive(Debug, Clone)]
pub struct UpstreamRoute {
    /// Service name; also the route prefix ("shipping" → `/shipping/...`).
    pub name: String,
    /// Base URL requests are forwarded to.
    pub base_url: Url,
}

/// Immutable prefix → upstream lookup.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<UpstreamRoute>,
}

impl RouteTable {
    pub fn from_config(upstreams: &[UpstreamConfig]) -> Result<Self, GatewayError> {
        let mut routes = Vec::with_capacity(upstreams.len());
        for upstream in upstreams {
            let base_url = Url::parse(&upstream.base_url).map_err(|e| {
                GatewayError::Validation(format!(
                    "upstream {} has an invalid base URL: {e}",
                    upstream.name
                ))
            })?;
            routes.push(UpstreamRoute {
                name: upstream.name.clone(),
                base_url,
            });
        }
        Ok(Self { routes })
    }

    /// Match a request path against the table.
    ///
    /// Returns the route and the path remainder (always starting with `/`):
    /// `/shipping/orders/7` → (shipping, `/orders/7`); `/shipping` → `/`.
    pub fn match_path<'a>(&'a self, path: &'a str) -> Option<(&'a UpstreamRoute, &'a str)> {
        let stripped = path.strip_prefix('/')?;
        for route in &self.routes {
            if let Some(rest) = stripped.strip_prefix(route.name.as_str()) {
                if rest.is_empty() {
                    return Some((route, "/"));
                }
                if rest.starts_with('/') {
                    return Some((route, rest));
                }
            }
        }
        None
    }

    pub fn routes(&self) -> &[UpstreamRoute] {
        &self.routes
    }
}
