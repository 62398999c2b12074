//! The gateway's procedures.
//!
//! Three operations are exposed:
//!
//! | Procedure     | Kind     | Input                                  |
//! |---------------|----------|----------------------------------------|
//! | `hello`       | query    | none                                   |
//! | `usersPairs`  | query    | `{ email?: string }`, whole object optional |
//! | `createPair`  | mutation | `{ id, email, phrase, translation }`   |
//!
//! `usersPairs` scans the store for pairs whose owner email contains the
//! given substring; an absent input or an empty string matches every pair.
//! `createPair` persists a new pair and echoes the accepted input back.
//! Store failures propagate as typed errors in both cases.

use hermes_core::{HermesResult, Pair, RequestContext, Schema};
use hermes_store::PairStore;
use serde::{Deserialize, Serialize};

use crate::registry::ProcedureRegistry;

/// Fixed reply of the `hello` liveness query.
pub const GREETING: &str = "Hello from the backend";

/// Input of `usersPairs`. The whole object is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UsersPairsInput {
    /// Substring to match against the owner email. Absent matches all.
    #[serde(default)]
    pub email: Option<String>,
}

/// Reply of `usersPairs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPairsReply {
    /// Human-readable description of the query.
    pub text: String,
    /// Matching pairs, in store order.
    pub pairs: Vec<Pair>,
}

/// Input of `createPair`. All fields are required non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePairInput {
    /// Unique pair id, assigned by the caller and verified by the store.
    pub id: String,
    /// Owner email.
    pub email: String,
    /// Source-language text.
    pub phrase: String,
    /// Target-language text.
    pub translation: String,
}

/// Input schema of `usersPairs`: an optional object with an optional
/// string `email` field.
#[must_use]
pub fn users_pairs_schema() -> Schema {
    Schema::object(vec![("email", Schema::string())])
}

/// Input schema of `createPair`: all four pair fields, mandatory and
/// non-empty.
#[must_use]
pub fn create_pair_schema() -> Schema {
    Schema::object(vec![
        ("id", Schema::string().required().min_length(1)),
        ("email", Schema::string().required().min_length(1)),
        ("phrase", Schema::string().required().min_length(1)),
        ("translation", Schema::string().required().min_length(1)),
    ])
    .required()
}

/// Builds the gateway's procedure registry over the given store adapter.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hermes_rpc::build_registry;
/// use hermes_store::{MemoryStore, PairStore};
///
/// let registry = build_registry(PairStore::new(Arc::new(MemoryStore::new())));
/// assert_eq!(registry.len(), 3);
/// ```
#[must_use]
pub fn build_registry(pairs: PairStore) -> ProcedureRegistry {
    let mut registry = ProcedureRegistry::new();

    registry.query("hello", None, |_ctx, ()| async {
        Ok(GREETING.to_string())
    });

    let store = pairs.clone();
    registry.query(
        "usersPairs",
        Some(users_pairs_schema()),
        move |ctx, input: Option<UsersPairsInput>| {
            let store = store.clone();
            async move { users_pairs(&store, &ctx, input).await }
        },
    );

    let store = pairs;
    registry.mutation(
        "createPair",
        Some(create_pair_schema()),
        move |ctx, input: CreatePairInput| {
            let store = store.clone();
            async move { create_pair(&store, &ctx, input).await }
        },
    );

    registry
}

/// Scans pairs by owner email substring.
async fn users_pairs(
    store: &PairStore,
    ctx: &RequestContext,
    input: Option<UsersPairsInput>,
) -> HermesResult<UsersPairsReply> {
    let email = input.and_then(|i| i.email).unwrap_or_default();
    let pairs = store.scan_by_email_contains(&email).await?;

    tracing::info!(
        request_id = %ctx.request_id(),
        caller = %ctx.identity().log_id(),
        email = %email,
        matches = pairs.len(),
        "usersPairs scan"
    );

    Ok(UsersPairsReply {
        text: format!("Get {email} pairs"),
        pairs,
    })
}

/// Persists a new pair and echoes the accepted input.
async fn create_pair(
    store: &PairStore,
    ctx: &RequestContext,
    input: CreatePairInput,
) -> HermesResult<Pair> {
    let pair = Pair::new(input.id, input.email, input.phrase, input.translation)?;
    store.save(pair.clone()).await?;

    tracing::info!(
        request_id = %ctx.request_id(),
        caller = %ctx.identity().log_id(),
        pair_id = %pair.id,
        "pair created"
    );

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_users_pairs_schema_accepts_optional_shapes() {
        let schema = users_pairs_schema();
        assert!(schema.validate(&json!(null)).is_ok());
        assert!(schema.validate(&json!({})).is_ok());
        assert!(schema.validate(&json!({"email": "a@x"})).is_ok());
        assert!(schema.validate(&json!({"email": ""})).is_ok());
        assert!(schema.validate(&json!({"email": 42})).is_err());
    }

    #[test]
    fn test_create_pair_schema_requires_every_field() {
        let schema = create_pair_schema();
        let full = json!({
            "id": "3",
            "email": "a@x.com",
            "phrase": "yes",
            "translation": "oui"
        });
        assert!(schema.validate(&full).is_ok());

        for field in ["id", "email", "phrase", "translation"] {
            let mut partial = full.clone();
            partial.as_object_mut().unwrap().remove(field);
            assert!(
                schema.validate(&partial).is_err(),
                "missing '{field}' should fail validation"
            );

            let mut empty = full.clone();
            empty[field] = json!("");
            assert!(
                schema.validate(&empty).is_err(),
                "empty '{field}' should fail validation"
            );
        }

        assert!(schema.validate(&json!(null)).is_err());
    }

    #[test]
    fn test_users_pairs_input_deserializes_from_missing_field() {
        let input: UsersPairsInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.email, None);

        let input: Option<UsersPairsInput> = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(input, None);
    }
}
