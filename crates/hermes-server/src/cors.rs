//! Cross-origin resource sharing.
//!
//! The gateway fronts a browser client on another origin, so it answers
//! OPTIONS preflight requests itself and decorates every response with the
//! appropriate CORS headers. Preflights never reach the dispatcher.

use std::collections::HashSet;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;

/// CORS header names.
pub mod headers {
    /// `Access-Control-Allow-Origin` header.
    pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
    /// `Access-Control-Allow-Methods` header.
    pub const ALLOW_METHODS: &str = "access-control-allow-methods";
    /// `Access-Control-Allow-Headers` header.
    pub const ALLOW_HEADERS: &str = "access-control-allow-headers";
    /// `Access-Control-Allow-Credentials` header.
    pub const ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    /// `Access-Control-Max-Age` header.
    pub const MAX_AGE: &str = "access-control-max-age";
    /// `Access-Control-Request-Method` header (preflight).
    pub const REQUEST_METHOD: &str = "access-control-request-method";
    /// `Origin` header.
    pub const ORIGIN: &str = "origin";
    /// `Vary` header.
    pub const VARY: &str = "vary";
}

/// The set of origins allowed to call the gateway.
#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    /// Allow any origin (wildcard `*`). Not combined with credentials.
    Any,
    /// Allow specific origins.
    List(HashSet<String>),
}

impl AllowedOrigins {
    /// Checks whether an origin is allowed.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(origins) => origins.contains(origin),
        }
    }

    /// Returns the `Access-Control-Allow-Origin` value for a given origin.
    #[must_use]
    pub fn header_value(&self, origin: &str) -> Option<HeaderValue> {
        match self {
            Self::Any => Some(HeaderValue::from_static("*")),
            Self::List(origins) => {
                if origins.contains(origin) {
                    HeaderValue::from_str(origin).ok()
                } else {
                    None
                }
            }
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    allowed_origins: AllowedOrigins,
    allowed_methods: HashSet<Method>,
    allowed_headers: HashSet<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: AllowedOrigins::List(HashSet::new()),
            allowed_methods: HashSet::from([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ]),
            allowed_headers: HashSet::from([
                "authorization".to_string(),
                "content-type".to_string(),
                crate::context::USERNAME_HEADER.to_string(),
            ]),
            allow_credentials: false,
            max_age: Some(Duration::from_secs(86400)),
        }
    }
}

impl CorsConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> CorsBuilder {
        CorsBuilder::default()
    }

    /// A permissive development preset: allows the local web client origin
    /// with credentials.
    #[must_use]
    pub fn development() -> Self {
        Self::builder()
            .allow_origin("http://localhost:3000")
            .allow_credentials(true)
            .build()
    }
}

/// Builder for [`CorsConfig`].
#[derive(Debug, Clone, Default)]
pub struct CorsBuilder {
    config: CorsConfig,
}

impl CorsBuilder {
    /// Adds an allowed origin.
    #[must_use]
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        match &mut self.config.allowed_origins {
            AllowedOrigins::Any => {
                self.config.allowed_origins =
                    AllowedOrigins::List(HashSet::from([origin.into()]));
            }
            AllowedOrigins::List(origins) => {
                origins.insert(origin.into());
            }
        }
        self
    }

    /// Allows any origin (wildcard `*`).
    #[must_use]
    pub fn allow_any_origin(mut self) -> Self {
        self.config.allowed_origins = AllowedOrigins::Any;
        self
    }

    /// Replaces the allowed methods.
    #[must_use]
    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.config.allowed_methods = methods.into_iter().collect();
        self
    }

    /// Replaces the allowed request headers.
    #[must_use]
    pub fn allow_headers<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.config.allowed_headers = names
            .into_iter()
            .map(|name| name.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Sets whether credentials (cookies, authorization headers) are allowed.
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.allow_credentials = allow;
        self
    }

    /// Sets the preflight cache duration.
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.config.max_age = Some(max_age);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> CorsConfig {
        self.config
    }
}

/// CORS handling for the gateway.
#[derive(Debug, Clone, Default)]
pub struct Cors {
    config: CorsConfig,
}

impl Cors {
    /// Creates a CORS handler from the given configuration.
    #[must_use]
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    /// Returns `true` when a request is a CORS preflight.
    #[must_use]
    pub fn is_preflight(method: &Method, request_headers: &HeaderMap) -> bool {
        method == Method::OPTIONS
            && request_headers.contains_key(headers::ORIGIN)
            && request_headers.contains_key(headers::REQUEST_METHOD)
    }

    /// Answers a preflight request.
    ///
    /// A disallowed origin gets a bare 204 with no allow headers; the
    /// browser enforces the denial.
    #[must_use]
    pub fn preflight_response(&self, request_headers: &HeaderMap) -> Response<Full<Bytes>> {
        let mut response = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Full::new(Bytes::new()))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())));

        let Some(allow_origin) = self.origin_header_for(request_headers) else {
            return response;
        };

        let response_headers = response.headers_mut();
        response_headers.insert(headers::ALLOW_ORIGIN, allow_origin);

        if let Ok(methods) = HeaderValue::from_str(&self.methods_list()) {
            response_headers.insert(headers::ALLOW_METHODS, methods);
        }
        if let Ok(allowed) = HeaderValue::from_str(&self.headers_list()) {
            response_headers.insert(headers::ALLOW_HEADERS, allowed);
        }
        if self.config.allow_credentials {
            response_headers.insert(headers::ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        if let Some(max_age) = self.config.max_age {
            if let Ok(value) = HeaderValue::from_str(&max_age.as_secs().to_string()) {
                response_headers.insert(headers::MAX_AGE, value);
            }
        }
        response_headers.insert(headers::VARY, HeaderValue::from_static("origin"));

        response
    }

    /// Decorates a non-preflight response with CORS headers.
    ///
    /// No-op for same-origin requests and disallowed origins.
    pub fn apply<T>(&self, request_headers: &HeaderMap, response: &mut Response<T>) {
        let Some(allow_origin) = self.origin_header_for(request_headers) else {
            return;
        };

        let response_headers = response.headers_mut();
        response_headers.insert(headers::ALLOW_ORIGIN, allow_origin);
        if self.config.allow_credentials {
            response_headers.insert(headers::ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        response_headers.insert(headers::VARY, HeaderValue::from_static("origin"));
    }

    /// Resolves the allow-origin header for a request, if its origin is
    /// present and allowed.
    fn origin_header_for(&self, request_headers: &HeaderMap) -> Option<HeaderValue> {
        let origin = request_headers.get(headers::ORIGIN)?.to_str().ok()?;
        self.config.allowed_origins.header_value(origin)
    }

    fn methods_list(&self) -> String {
        let mut methods: Vec<&str> = self
            .config
            .allowed_methods
            .iter()
            .map(Method::as_str)
            .collect();
        methods.sort_unstable();
        methods.join(",")
    }

    fn headers_list(&self) -> String {
        let mut names: Vec<&str> = self
            .config
            .allowed_headers
            .iter()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preflight_headers(origin: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(headers::ORIGIN, origin.parse().unwrap());
        map.insert(headers::REQUEST_METHOD, "POST".parse().unwrap());
        map
    }

    #[test]
    fn test_preflight_detection() {
        let map = preflight_headers("http://localhost:3000");
        assert!(Cors::is_preflight(&Method::OPTIONS, &map));
        assert!(!Cors::is_preflight(&Method::POST, &map));
        assert!(!Cors::is_preflight(&Method::OPTIONS, &HeaderMap::new()));
    }

    #[test]
    fn test_preflight_allowed_origin() {
        let cors = Cors::new(CorsConfig::development());
        let response = cors.preflight_response(&preflight_headers("http://localhost:3000"));

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(headers::ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get(headers::ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        let allowed = response
            .headers()
            .get(headers::ALLOW_HEADERS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(allowed.contains("username"));
        assert!(allowed.contains("content-type"));
    }

    #[test]
    fn test_preflight_disallowed_origin_gets_no_allow_headers() {
        let cors = Cors::new(CorsConfig::development());
        let response = cors.preflight_response(&preflight_headers("http://evil.example"));

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(headers::ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_apply_decorates_allowed_origin() {
        let cors = Cors::new(CorsConfig::development());
        let mut request_headers = HeaderMap::new();
        request_headers.insert(headers::ORIGIN, "http://localhost:3000".parse().unwrap());

        let mut response = Response::new(());
        cors.apply(&request_headers, &mut response);

        assert_eq!(
            response.headers().get(headers::ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(response.headers().get(headers::VARY).unwrap(), "origin");
    }

    #[test]
    fn test_apply_is_noop_without_origin() {
        let cors = Cors::new(CorsConfig::development());
        let mut response = Response::new(());
        cors.apply(&HeaderMap::new(), &mut response);
        assert!(response.headers().get(headers::ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_any_origin_wildcard() {
        let cors = Cors::new(CorsConfig::builder().allow_any_origin().build());
        let mut request_headers = HeaderMap::new();
        request_headers.insert(headers::ORIGIN, "http://anywhere.example".parse().unwrap());

        let mut response = Response::new(());
        cors.apply(&request_headers, &mut response);
        assert_eq!(response.headers().get(headers::ALLOW_ORIGIN).unwrap(), "*");
    }
}
