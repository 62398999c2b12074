//! The per-call context factory.
//!
//! Builds a [`RequestContext`] from inbound request headers, independently
//! of which procedure is being invoked. The gateway trusts the `username`
//! header as-is; there is no authentication in front of it.

use hermes_core::{CallerIdentity, RequestContext};
use http::HeaderMap;

/// Header carrying the caller-supplied identity.
pub const USERNAME_HEADER: &str = "username";

/// Builds the per-call context from request headers.
///
/// A missing, empty, or non-UTF-8 `username` header yields an anonymous
/// caller. Never fails.
///
/// # Example
///
/// ```
/// use hermes_server::context_from_headers;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("username", "alice".parse().unwrap());
///
/// let ctx = context_from_headers(&headers);
/// assert_eq!(ctx.identity().name(), Some("alice"));
///
/// let ctx = context_from_headers(&HeaderMap::new());
/// assert!(ctx.identity().is_anonymous());
/// ```
#[must_use]
pub fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let username = headers
        .get(USERNAME_HEADER)
        .and_then(|value| value.to_str().ok());

    RequestContext::new().with_identity(CallerIdentity::from_username(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_caller() {
        let mut headers = HeaderMap::new();
        headers.insert(USERNAME_HEADER, "alice".parse().unwrap());

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.identity().log_id(), "user:alice");
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let ctx = context_from_headers(&HeaderMap::new());
        assert!(ctx.identity().is_anonymous());
        assert_eq!(ctx.identity().display_name(), "anonymous");
    }

    #[test]
    fn test_empty_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(USERNAME_HEADER, "".parse().unwrap());

        let ctx = context_from_headers(&headers);
        assert!(ctx.identity().is_anonymous());
    }

    #[test]
    fn test_non_utf8_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(
            USERNAME_HEADER,
            http::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );

        let ctx = context_from_headers(&headers);
        assert!(ctx.identity().is_anonymous());
    }

    #[test]
    fn test_each_call_gets_a_fresh_request_id() {
        let headers = HeaderMap::new();
        let a = context_from_headers(&headers);
        let b = context_from_headers(&headers);
        assert_ne!(a.request_id(), b.request_id());
    }
}
