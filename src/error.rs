//! Error taxonomy for the search client
//!
//! [`SearchClientError`] is the single error type returned by every public
//! operation in this crate. Composition-phase failures
//! ([`SearchClientError::Validation`]) are constructed synchronously and
//! never retried; dispatch-phase failures wrap a [`TransportError`] from the
//! transport collaborator.

use thiserror::Error;

/// Result type alias for search client operations
pub type SearchClientResult<T> = std::result::Result<T, SearchClientError>;

/// Errors surfaced by the transport collaborator (external, behind the
/// [`crate::transport::Transport`] trait). The crate only needs to
/// distinguish the cases its own retry and error-mapping logic branches on;
/// the transport's full error hierarchy is out of scope.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// The backend rejected the request due to rate limiting or load shedding.
    #[error("transport throttled: {0}")]
    Throttled(String),

    /// The backend reported the requested document does not exist.
    #[error("transport reported not found: {0}")]
    NotFound(String),

    /// A network-level failure (timeout, connection reset, DNS, ...).
    #[error("transport network error: {0}")]
    Network(String),

    /// The response body could not be parsed into the expected shape.
    #[error("transport serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Whether this transport error represents throttling/load shedding.
    #[must_use]
    pub const fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

/// Errors that can occur while composing or dispatching a search query.
#[derive(Debug, Error, Clone)]
pub enum SearchClientError {
    /// Composition-phase rejection: invalid field name, malformed date
    /// range, empty boolean group, empty RAG query, etc. Thrown
    /// synchronously and never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// The transport failed while serving a read (search/autocomplete/get).
    #[error("search failed against sources {sources:?}: {cause}")]
    Search {
        /// The corpus/source names involved in the failed request.
        sources: Vec<String>,
        /// The underlying transport failure.
        cause: TransportError,
    },

    /// The transport failed while serving a create/update/delete.
    #[error("insert/update/delete failed for doc {doc_id} (schema {schema}): {cause}")]
    Insert {
        /// The document identifier involved.
        doc_id: String,
        /// The schema/corpus the document belongs to.
        schema: String,
        /// The underlying transport failure.
        cause: TransportError,
    },

    /// A document that was required to exist was not found. Distinct from
    /// an expected not-found: `get_or_null`-style callers convert a
    /// [`TransportError::NotFound`] into `Ok(None)` instead of raising this.
    #[error("document not found: {doc_id}")]
    Retrieval {
        /// The document identifier that was not found.
        doc_id: String,
    },

    /// Unclassified transport failure, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SearchClientError {
    /// Returns a stable string error code (for JSON responses / metrics).
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Search { .. } => "SEARCH_FAILURE",
            Self::Insert { .. } => "INSERT_FAILURE",
            Self::Retrieval { .. } => "RETRIEVAL_FAILURE",
            Self::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Whether this error represents a condition the caller's retry policy
    /// should consider retrying (throttling only).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Insert { cause, .. } | Self::Transport(cause) => cause.is_throttled(),
            Self::Validation(_) | Self::Search { .. } | Self::Retrieval { .. } => false,
        }
    }

    /// Construct a validation error from a displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
