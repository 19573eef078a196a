//! The transport contract (spec §6): the external collaborator boundary.
//!
//! This crate constructs fully-prepared [`Payload`]s and hands them to a
//! [`Transport`] implementation; it performs no HTTP, no connection
//! pooling, and no response deserialization beyond the thin DTOs declared
//! here. Production code supplies a real HTTP-backed `Transport`; tests use
//! an in-memory fake (see `tests/dispatch.rs`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// A prepared request payload (spec §6.2). Modeled as a typed struct rather
/// than a raw string map so field names are compile-time checked; callers
/// that need the wire's unordered string-keyed shape can iterate
/// [`Payload::into_fields`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub yql: Option<String>,
    pub query: Option<String>,
    pub email: Option<String>,
    pub hits: Option<u64>,
    pub offset: Option<u64>,
    pub timeout: Option<String>,
    pub ranking_profile: Option<String>,
    pub ranking_list_features: Option<bool>,
    pub tracelevel: Option<u8>,
    pub presentation_summary: Option<String>,
    pub input_query_e: Option<String>,
    pub input_query_alpha: Option<f64>,
    pub input_query_recency_decay_rate: Option<f64>,
    pub input_query_is_intent_search: Option<f64>,
    pub max_hits: Option<u64>,
    pub max_offset: Option<u64>,
    pub app: Option<String>,
    pub entity: Option<String>,
    pub channel_id: Option<String>,
    pub user_id: Option<String>,
}

impl Payload {
    /// Render this payload as an unordered list of `(wire-key, value)`
    /// pairs, omitting absent fields — the shape an HTTP transport would
    /// serialize as form/query parameters.
    #[must_use]
    pub fn into_fields(self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        macro_rules! push {
            ($key:literal, $field:expr) => {
                if let Some(v) = $field {
                    out.push(($key, v.to_string()));
                }
            };
        }
        push!("yql", self.yql);
        push!("query", self.query);
        push!("email", self.email);
        push!("hits", self.hits);
        push!("offset", self.offset);
        push!("timeout", self.timeout);
        push!("ranking.profile", self.ranking_profile);
        push!("ranking.listFeatures", self.ranking_list_features);
        push!("tracelevel", self.tracelevel);
        push!("presentation.summary", self.presentation_summary);
        push!("input.query(e)", self.input_query_e);
        push!("input.query(alpha)", self.input_query_alpha);
        push!(
            "input.query(recency_decay_rate)",
            self.input_query_recency_decay_rate
        );
        push!(
            "input.query(is_intent_search)",
            self.input_query_is_intent_search
        );
        push!("maxHits", self.max_hits);
        push!("maxOffset", self.max_offset);
        push!("app", self.app);
        push!("entity", self.entity);
        push!("channelId", self.channel_id);
        push!("userId", self.user_id);
        out
    }
}

/// The parsed result of a [`Transport::search`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Raw hit documents, in backend-returned order.
    pub hits: Vec<Value>,
    /// Total matching document count, when the backend reports one.
    pub total_count: Option<u64>,
}

/// Parameters identifying where a document is written/read (namespace + schema + id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub namespace: String,
    pub schema: String,
    pub doc_id: String,
}

/// Parameters for [`Transport::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertParams {
    pub namespace: String,
    pub schema: String,
}

pub type GetDocumentParams = DocumentRef;
pub type UpdateDocumentParams = DocumentRef;
pub type DeleteDocumentParams = DocumentRef;

/// Parameters for batched doc-id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDocumentsByDocIdsParams {
    pub namespace: String,
    pub schema: String,
    pub doc_ids: Vec<String>,
}

/// Parameters for thread-scoped lookup (Slack/Gmail threading).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDocumentsByThreadIdParams {
    pub namespace: String,
    pub schema: String,
    pub thread_id: String,
}

/// Parameters for an existence-check batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfDocumentsExistParams {
    pub namespace: String,
    pub schema: String,
    pub doc_ids: Vec<String>,
}

/// The external search-backend transport (spec §6.1). The core passes
/// fully-prepared payloads; the transport performs no query construction.
///
/// Implementations are assumed thread-safe (`Send + Sync`); the crate holds
/// no other mutable shared state (spec §5).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a search/group/autocomplete/RAG query.
    async fn search(&self, payload: Payload) -> Result<SearchResponse, TransportError>;

    /// Create a new document.
    async fn insert(&self, doc: Value, params: InsertParams) -> Result<(), TransportError>;

    /// Fetch a single document by id.
    async fn get_document(&self, params: GetDocumentParams) -> Result<Value, TransportError>;

    /// Update fields on an existing document.
    async fn update_document(
        &self,
        fields: Value,
        params: UpdateDocumentParams,
    ) -> Result<(), TransportError>;

    /// Delete a document by id.
    async fn delete_document(&self, params: DeleteDocumentParams) -> Result<(), TransportError>;

    /// Fetch multiple documents by id in one round trip.
    async fn get_documents_by_doc_ids(
        &self,
        params: GetDocumentsByDocIdsParams,
    ) -> Result<Vec<Value>, TransportError>;

    /// Fetch every document sharing a thread id.
    async fn get_documents_by_thread_id(
        &self,
        params: GetDocumentsByThreadIdParams,
    ) -> Result<Vec<Value>, TransportError>;

    /// Batched existence check; never fails for an individual not-found —
    /// the result vector reports `false` at that position instead.
    async fn if_documents_exist(
        &self,
        params: IfDocumentsExistParams,
    ) -> Result<Vec<bool>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_fields_omits_absent_values() {
        let payload = Payload {
            yql: Some("select * from sources *".to_owned()),
            hits: Some(10),
            ..Payload::default()
        };
        let fields = payload.into_fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&("yql", "select * from sources *".to_owned())));
        assert!(fields.contains(&("hits", "10".to_owned())));
    }

    #[test]
    fn into_fields_empty_payload_is_empty() {
        assert!(Payload::default().into_fields().is_empty());
    }
}
