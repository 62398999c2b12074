//! HTTP gateway implementation.
//!
//! Built on Hyper and Tokio. The gateway accepts connections, builds a
//! per-call context from request headers, routes `/rpc/{procedure}` calls
//! into the procedure registry, and maps typed errors onto HTTP statuses.
//!
//! # Routes
//!
//! - `GET /` - static liveness payload, independent of the dispatcher
//! - `GET /health`, `GET /ready` - probe endpoints
//! - `GET /metrics` - Prometheus exposition
//! - `GET /rpc/{procedure}?input=...` - queries, input as URL-encoded JSON
//! - `POST /rpc/{procedure}` - queries and mutations, input as JSON body

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;

use hermes_core::HermesError;
use hermes_rpc::{ProcedureKind, ProcedureRegistry};

use crate::config::GatewayConfig;
use crate::context::context_from_headers;
use crate::cors::{Cors, CorsConfig};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for the HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Path prefix of the procedure surface.
const RPC_PREFIX: &str = "/rpc/";

/// The Hermes HTTP gateway.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use hermes_rpc::build_registry;
/// use hermes_server::Server;
/// use hermes_store::{MemoryStore, PairStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = build_registry(PairStore::new(Arc::new(MemoryStore::new())));
///     let server = Server::builder()
///         .http_addr("0.0.0.0:8002")
///         .registry(registry)
///         .build();
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    /// Gateway configuration.
    config: GatewayConfig,

    /// Procedure registry.
    registry: Arc<ProcedureRegistry>,

    /// CORS handling.
    cors: Cors,

    /// Health check handler.
    health: HealthCheck,

    /// Readiness check handler.
    readiness: ReadinessCheck,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns a reference to the procedure registry.
    #[must_use]
    pub fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    /// Returns a reference to the health check handler.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Returns a reference to the readiness check handler.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address
    /// or an I/O error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a custom shutdown signal.
    ///
    /// Useful for tests and for controlling shutdown programmatically.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!("Gateway listening on {}", addr);

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown_clone = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown_clone).await {
                                    tracing::error!("Connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping gateway");
                    break;
                }
            }
        }

        // Stop advertising readiness while draining.
        server.readiness.set_ready(false);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "Waiting up to {:?} for {} connections to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            _ = tracker.wait_for_shutdown() => {
                tracing::info!("All connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "Shutdown timeout reached, {} connections still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Handles a single connection.
    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => {
                result
            }
            _ = shutdown.recv() => {
                tracing::debug!("Connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    /// Handles a single HTTP request.
    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(ToString::to_string);
        let headers = req.headers().clone();

        tracing::debug!("{} {}", method, path);

        // Preflights are answered before anything else runs.
        if Cors::is_preflight(&method, &headers) {
            return Ok(self.cors.preflight_response(&headers));
        }

        // Collect the request body with a timeout.
        let timeout = self.config.request_timeout();
        let body = match tokio::time::timeout(timeout, Self::collect_body(req)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::error!("Failed to collect request body: {}", e);
                let mut response = error_response(
                    StatusCode::BAD_REQUEST,
                    "BODY_READ_ERROR",
                    &format!("failed to read request body: {e}"),
                );
                self.cors.apply(&headers, &mut response);
                return Ok(response);
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                let mut response = error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    "request body collection timed out",
                );
                self.cors.apply(&headers, &mut response);
                return Ok(response);
            }
        };

        // Route and dispatch with a timeout.
        let routed = tokio::time::timeout(
            timeout,
            self.route(&method, &path, query.as_deref(), &headers, body),
        )
        .await;

        let mut response = routed.unwrap_or_else(|_| {
            tracing::warn!("Request processing timed out for {} {}", method, path);
            hermes_error_response(
                &HermesError::timeout("request processing timed out"),
                None,
            )
        });

        self.cors.apply(&headers, &mut response);
        Ok(response)
    }

    /// Collects the request body into bytes.
    async fn collect_body(req: Request<Incoming>) -> Result<Bytes, hyper::Error> {
        let collected = req.into_body().collect().await?;
        Ok(collected.to_bytes())
    }

    /// Routes a request to the appropriate handler.
    ///
    /// Split out from [`Self::handle_request`] so tests can drive the
    /// gateway without a live socket.
    async fn route(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> HttpResponse {
        match (method.as_str(), path) {
            ("GET", "/") => json_response(StatusCode::OK, &serde_json::json!({"hello": "world"})),
            ("GET", "/health") => self.handle_health(),
            ("GET", "/ready") => self.handle_ready(),
            ("GET", "/metrics") => handle_metrics(),
            _ if path.starts_with(RPC_PREFIX) => {
                self.handle_rpc(method, path, query, headers, body).await
            }
            _ => error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("no route for {path}"),
            ),
        }
    }

    /// Handles the /health endpoint.
    fn handle_health(&self) -> HttpResponse {
        json_response(StatusCode::OK, &self.health.status())
    }

    /// Handles the /ready endpoint.
    fn handle_ready(&self) -> HttpResponse {
        let status = self.readiness.status();
        let status_code = if status.is_ready() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status_code, &status)
    }

    /// Handles a `/rpc/{procedure}` call.
    async fn handle_rpc(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> HttpResponse {
        let name = &path[RPC_PREFIX.len()..];
        if name.is_empty() || name.contains('/') {
            return error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("no route for {path}"),
            );
        }

        let ctx = context_from_headers(headers);
        let request_id = ctx.request_id().to_string();
        let started = Instant::now();

        let Some(def) = self.registry.get(name) else {
            let err = HermesError::not_found(format!("unknown procedure: {name}"));
            return self.finish_rpc(name, &request_id, started, Err(err));
        };

        // Queries travel over GET with an `input` query parameter or over
        // POST with a JSON body; mutations are POST-only.
        let (kind, payload) = match method.as_str() {
            "GET" => {
                if def.kind() == ProcedureKind::Mutation {
                    let mut response = error_response(
                        StatusCode::METHOD_NOT_ALLOWED,
                        "METHOD_NOT_ALLOWED",
                        &format!("'{name}' is a mutation and must be called via POST"),
                    );
                    response
                        .headers_mut()
                        .insert(http::header::ALLOW, HeaderValue::from_static("POST"));
                    return response;
                }
                (ProcedureKind::Query, parse_query_input(query))
            }
            "POST" => (def.kind(), parse_body_input(&body)),
            _ => {
                let mut response = error_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "METHOD_NOT_ALLOWED",
                    "procedures are called via GET or POST",
                );
                response
                    .headers_mut()
                    .insert(http::header::ALLOW, HeaderValue::from_static("GET, POST"));
                return response;
            }
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => return self.finish_rpc(name, &request_id, started, Err(err)),
        };

        let result = self.registry.dispatch(ctx, kind, name, payload).await;
        self.finish_rpc(name, &request_id, started, result)
    }

    /// Converts a dispatch result into a response, recording telemetry.
    fn finish_rpc(
        &self,
        procedure: &str,
        request_id: &str,
        started: Instant,
        result: Result<Value, HermesError>,
    ) -> HttpResponse {
        let response = match &result {
            Ok(value) => json_response(StatusCode::OK, value),
            Err(err) => {
                tracing::warn!(
                    procedure,
                    request_id,
                    error = %err,
                    "procedure call failed"
                );
                hermes_error_response(err, Some(request_id))
            }
        };

        let elapsed = started.elapsed();
        hermes_telemetry::record_request(procedure, response.status().as_u16(), elapsed);
        tracing::info!(
            procedure,
            request_id,
            http.status_code = response.status().as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "procedure call completed"
        );

        response
    }
}

/// Parses the `input` query parameter into a JSON payload.
fn parse_query_input(query: Option<&str>) -> Result<Option<Value>, HermesError> {
    let Some(query) = query else {
        return Ok(None);
    };

    for param in query.split('&') {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        if key != "input" {
            continue;
        }

        let decoded = urlencoding::decode(raw).map_err(|e| {
            HermesError::validation(format!("'input' query parameter is not valid UTF-8: {e}"))
        })?;
        let value = serde_json::from_str(&decoded).map_err(|e| {
            HermesError::validation(format!("'input' query parameter is not valid JSON: {e}"))
        })?;
        return Ok(Some(value));
    }

    Ok(None)
}

/// Parses a request body into a JSON payload. An empty body is no input.
fn parse_body_input(body: &Bytes) -> Result<Option<Value>, HermesError> {
    if body.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_slice(body)
        .map_err(|e| HermesError::validation(format!("request body is not valid JSON: {e}")))?;
    Ok(Some(value))
}

/// Handles the /metrics endpoint.
fn handle_metrics() -> HttpResponse {
    match hermes_telemetry::render_metrics() {
        Some(text) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain; version=0.0.4")
            .body(Full::new(Bytes::from(text)))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new()))),
        None => error_response(
            StatusCode::NOT_FOUND,
            "METRICS_DISABLED",
            "metrics recorder is not installed",
        ),
    }
}

/// Builds a JSON response from a serializable value.
fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    let body = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Builds a standard error response.
fn error_response(status: StatusCode, code: &str, message: &str) -> HttpResponse {
    let body = serde_json::json!({
        "error": {
            "code": code,
            "message": message
        }
    });
    json_response(status, &body)
}

/// Builds an error response from a typed error envelope.
fn hermes_error_response(err: &HermesError, request_id: Option<&str>) -> HttpResponse {
    json_response(err.status_code(), &err.to_envelope(request_id))
}

/// Builder for configuring and creating a [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<GatewayConfig>,
    config_builder: crate::config::GatewayConfigBuilder,
    registry: Option<ProcedureRegistry>,
    cors: Option<CorsConfig>,
    service_name: Option<String>,
    service_version: Option<String>,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full gateway configuration, overriding individual settings.
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the procedure registry.
    #[must_use]
    pub fn registry(mut self, registry: ProcedureRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the CORS configuration.
    #[must_use]
    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the service name reported by health checks.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the service version reported by health checks.
    #[must_use]
    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let config = self.config.unwrap_or_else(|| self.config_builder.build());
        let service = self.service_name.unwrap_or_else(|| "hermes".to_string());
        let version = self
            .service_version
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        Server {
            config,
            registry: Arc::new(self.registry.unwrap_or_default()),
            cors: Cors::new(self.cors.unwrap_or_default()),
            health: HealthCheck::new(service, version),
            readiness: ReadinessCheck::new(),
        }
    }
}

/// Server error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(String),
}
