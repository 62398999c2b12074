//! Procedure registration and dispatch.
//!
//! Procedures are named operations exposed over the gateway. Each one is
//! registered with a kind (query or mutation), an optional input schema,
//! and a typed async handler. Dispatch runs exactly one handler per call:
//!
//! 1. Look up the procedure by name; unknown names are rejected.
//! 2. Check the expected kind; a query cannot invoke a mutation.
//! 3. Validate the raw payload against the declared schema; on failure the
//!    handler is never invoked.
//! 4. Invoke the handler and serialize its reply.
//!
//! The registry holds no per-call state; everything mutable lives behind
//! the store adapter the handlers capture.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use hermes_core::{HermesError, HermesResult, RequestContext, Schema};

/// Whether a procedure reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    /// Read-only operation.
    Query,
    /// State-changing operation.
    Mutation,
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
        }
    }
}

/// Type alias for a boxed handler future.
type BoxedReply = Pin<Box<dyn Future<Output = HermesResult<Value>> + Send>>;

/// A type-erased procedure handler.
type ErasedHandler = Arc<dyn Fn(RequestContext, Value) -> BoxedReply + Send + Sync>;

/// A registered procedure: kind, input schema, and handler.
pub struct ProcedureDef {
    name: String,
    kind: ProcedureKind,
    input_schema: Option<Schema>,
    handler: ErasedHandler,
}

impl ProcedureDef {
    /// Returns the procedure name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the procedure kind.
    #[must_use]
    pub const fn kind(&self) -> ProcedureKind {
        self.kind
    }

    /// Returns the declared input schema, if any.
    #[must_use]
    pub fn input_schema(&self) -> Option<&Schema> {
        self.input_schema.as_ref()
    }
}

impl std::fmt::Debug for ProcedureDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Registry of named procedures.
///
/// # Example
///
/// ```
/// use hermes_core::RequestContext;
/// use hermes_rpc::{ProcedureKind, ProcedureRegistry};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut registry = ProcedureRegistry::new();
/// registry.query("hello", None, |_ctx, ()| async {
///     Ok("Hello from the backend".to_string())
/// });
///
/// let reply = registry
///     .dispatch(RequestContext::new(), ProcedureKind::Query, "hello", None)
///     .await
///     .unwrap();
/// assert_eq!(reply, serde_json::json!("Hello from the backend"));
/// # }
/// ```
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: HashMap<String, ProcedureDef>,
}

impl ProcedureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            procedures: HashMap::new(),
        }
    }

    /// Registers a query procedure.
    ///
    /// The handler receives the request context and the deserialized input.
    /// When `input_schema` is given, the raw payload is validated against it
    /// before deserialization; otherwise the payload is handed through as-is
    /// (a missing payload deserializes as JSON `null`).
    pub fn query<In, Out, F, Fut>(
        &mut self,
        name: impl Into<String>,
        input_schema: Option<Schema>,
        handler: F,
    ) where
        In: DeserializeOwned + Send + 'static,
        Out: Serialize + Send + 'static,
        F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<Out>> + Send + 'static,
    {
        self.register(ProcedureKind::Query, name.into(), input_schema, handler);
    }

    /// Registers a mutation procedure.
    pub fn mutation<In, Out, F, Fut>(
        &mut self,
        name: impl Into<String>,
        input_schema: Option<Schema>,
        handler: F,
    ) where
        In: DeserializeOwned + Send + 'static,
        Out: Serialize + Send + 'static,
        F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<Out>> + Send + 'static,
    {
        self.register(ProcedureKind::Mutation, name.into(), input_schema, handler);
    }

    fn register<In, Out, F, Fut>(
        &mut self,
        kind: ProcedureKind,
        name: String,
        input_schema: Option<Schema>,
        handler: F,
    ) where
        In: DeserializeOwned + Send + 'static,
        Out: Serialize + Send + 'static,
        F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<Out>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RequestContext, payload: Value| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let input: In = serde_json::from_value(payload)
                    .map_err(|e| HermesError::validation(format!("invalid input: {e}")))?;

                let reply = handler(ctx, input).await?;

                serde_json::to_value(reply).map_err(|e| {
                    HermesError::internal_with_source("failed to serialize reply", e)
                })
            })
        });

        self.procedures.insert(
            name.clone(),
            ProcedureDef {
                name,
                kind,
                input_schema,
                handler: erased,
            },
        );
    }

    /// Looks up a procedure by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProcedureDef> {
        self.procedures.get(name)
    }

    /// Checks whether a procedure is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    /// Returns the number of registered procedures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Returns `true` if no procedures are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Returns an iterator over registered procedure names.
    pub fn procedure_names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    /// Dispatches a call to the named procedure.
    ///
    /// `payload` is the raw JSON input; `None` is treated as JSON `null`,
    /// which satisfies any schema not marked required.
    ///
    /// # Errors
    ///
    /// - [`HermesError::NotFound`] for an unknown procedure name
    /// - [`HermesError::Validation`] for a kind mismatch or a payload that
    ///   fails the declared schema (the handler is not invoked)
    /// - whatever typed error the handler itself returns
    pub async fn dispatch(
        &self,
        ctx: RequestContext,
        kind: ProcedureKind,
        name: &str,
        payload: Option<Value>,
    ) -> HermesResult<Value> {
        let def = self
            .get(name)
            .ok_or_else(|| HermesError::not_found(format!("unknown procedure: {name}")))?;

        if def.kind != kind {
            return Err(HermesError::validation(format!(
                "'{name}' is a {}, not a {kind}",
                def.kind
            )));
        }

        let payload = payload.unwrap_or(Value::Null);

        if let Some(schema) = &def.input_schema {
            schema.validate(&payload)?;
        }

        let ctx = ctx.with_procedure(name);
        tracing::debug!(
            procedure = name,
            kind = %kind,
            request_id = %ctx.request_id(),
            caller = %ctx.identity().log_id(),
            "dispatching procedure"
        );

        (def.handler)(ctx, payload).await
    }
}

impl std::fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo_registry() -> (ProcedureRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut registry = ProcedureRegistry::new();
        registry.mutation(
            "echo",
            Some(Schema::object(vec![(
                "message",
                Schema::string().required().min_length(1),
            )])),
            move |_ctx, input: serde_json::Map<String, Value>| {
                seen.fetch_add(1, Ordering::SeqCst);
                async move { Ok(Value::Object(input)) }
            },
        );
        (registry, calls)
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler_exactly_once() {
        let (registry, calls) = echo_registry();
        let reply = registry
            .dispatch(
                RequestContext::new(),
                ProcedureKind::Mutation,
                "echo",
                Some(json!({"message": "hi"})),
            )
            .await
            .unwrap();

        assert_eq!(reply, json!({"message": "hi"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_procedure_is_not_found() {
        let (registry, _) = echo_registry();
        let err = registry
            .dispatch(RequestContext::new(), ProcedureKind::Query, "nope", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HermesError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_rejected() {
        let (registry, calls) = echo_registry();
        let err = registry
            .dispatch(
                RequestContext::new(),
                ProcedureKind::Query,
                "echo",
                Some(json!({"message": "hi"})),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, HermesError::Validation { .. }));
        assert!(err.to_string().contains("mutation"));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "handler must not run");
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_handler() {
        let (registry, calls) = echo_registry();
        let err = registry
            .dispatch(
                RequestContext::new(),
                ProcedureKind::Mutation,
                "echo",
                Some(json!({"message": 42})),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, HermesError::Validation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "handler must not run");
    }

    #[tokio::test]
    async fn test_missing_payload_fails_required_schema() {
        let mut registry = ProcedureRegistry::new();
        registry.mutation(
            "strict",
            Some(Schema::object(vec![("id", Schema::string().required())]).required()),
            |_ctx, _input: Value| async { Ok(()) },
        );

        let err = registry
            .dispatch(RequestContext::new(), ProcedureKind::Mutation, "strict", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HermesError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_zero_argument_query() {
        let mut registry = ProcedureRegistry::new();
        registry.query("ping", None, |_ctx, ()| async { Ok("pong".to_string()) });

        let reply = registry
            .dispatch(RequestContext::new(), ProcedureKind::Query, "ping", None)
            .await
            .unwrap();
        assert_eq!(reply, json!("pong"));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let mut registry = ProcedureRegistry::new();
        registry.query("broken", None, |_ctx, ()| async {
            Err::<(), _>(HermesError::store("scan failed"))
        });

        let err = registry
            .dispatch(RequestContext::new(), ProcedureKind::Query, "broken", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HermesError::Store { .. }));
    }

    #[tokio::test]
    async fn test_context_carries_procedure_name() {
        let mut registry = ProcedureRegistry::new();
        registry.query("whoami", None, |ctx: RequestContext, ()| async move {
            Ok(ctx.procedure().unwrap_or("unset").to_string())
        });

        let reply = registry
            .dispatch(RequestContext::new(), ProcedureKind::Query, "whoami", None)
            .await
            .unwrap();
        assert_eq!(reply, json!("whoami"));
    }

    #[test]
    fn test_registry_introspection() {
        let (registry, _) = echo_registry();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert!(registry.contains("echo"));
        assert_eq!(registry.get("echo").unwrap().kind(), ProcedureKind::Mutation);
        assert!(registry.get("echo").unwrap().input_schema().is_some());
        let names: Vec<_> = registry.procedure_names().collect();
        assert_eq!(names, ["echo"]);
    }
}
