//! Query composition core for a hybrid lexical+vector external search
//! backend.
//!
//! This crate builds search requests — it never talks to the network
//! itself. Composition happens in four layers:
//! - [`escaping`] / [`condition`] — value escaping and the boolean
//!   [`condition::Condition`] algebra that renders to the backend's query
//!   language.
//! - [`permission`] — per-group access-scoping policy attached to a
//!   [`condition::Condition::And`]/[`condition::Condition::Or`] node.
//! - [`query`] — [`query::QueryBuilder`], which assembles sources, a
//!   `WHERE` root, ordering, pagination, and grouping into a
//!   [`query::QueryProfile`].
//! - [`profiles`] — eight per-application condition-tree builders
//!   (workspace contacts, Gmail, Drive, Calendar, Slack, data sources,
//!   knowledge bases, plus a Gmail intent filter) built on top of the
//!   condition algebra.
//!
//! [`dispatch::SearchClient`] ties these together into the Dispatch API
//! (search, group search, autocomplete, and friends) and hands prepared
//! [`transport::Payload`]s to a caller-supplied [`transport::Transport`].
//! [`retry`] and [`fanout`] implement this crate's only two concurrency
//! concerns: insert-retry backoff and the bounded batched fetch used by
//! `fetch_all_by_name`. [`config`] loads the client's tunables from the
//! environment.

#![forbid(unsafe_code)]

pub mod condition;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod escaping;
pub mod fanout;
pub mod permission;
pub mod profiles;
pub mod query;
pub mod retry;
pub mod sources;
pub mod transport;

pub use condition::{Condition, Operator, TimeBounds};
pub use config::SearchClientConfig;
pub use dispatch::{
    AgentSearchOpts, GetItemsParams, GetThreadItemsParams, RagOpts, SearchClient, SearchOpts,
    SlackSearchOpts,
};
pub use error::{SearchClientError, SearchClientResult, TransportError};
pub use escaping::Value;
pub use permission::{PermissionPolicy, PermissionType};
pub use profiles::Intent;
pub use query::{ALL_SOURCES, OrderBy, QueryBuilder, QueryProfile, SortDirection};
pub use sources::{App, available_sources, schemas_for_apps};
pub use transport::{
    DeleteDocumentParams, DocumentRef, GetDocumentParams, GetDocumentsByDocIdsParams,
    GetDocumentsByThreadIdParams, IfDocumentsExistParams, InsertParams, Payload, SearchResponse,
    Transport, UpdateDocumentParams,
};
