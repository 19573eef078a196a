//! Per-application profile builders (spec §4.5).
//!
//! A profile builder takes a high-level search intent — a query reference,
//! a target-hits hint, optional time bounds, optional id sets — and returns
//! a [`Condition`] tree ready to hand to [`crate::query::QueryBuilder`].
//! Eight builders are specified; each lives in its own submodule, all
//! sharing the `hybrid_core`/`single_time_filter` helpers below.

pub mod calendar;
pub mod datasource;
pub mod drive;
pub mod gmail;
pub mod intent;
pub mod slack;
pub mod workspace;

mod default_hybrid;

pub use default_hybrid::default_hybrid;
pub use intent::Intent;

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;

/// The `Or(UserInput, NearestNeighbor)` hybrid search core shared by every
/// profile (spec §4.5.1), parameterized by the vector field each corpus
/// indexes its embeddings under.
pub(crate) fn hybrid_core(
    query_ref: &str,
    hits: u32,
    vector_field: &str,
) -> SearchClientResult<Condition> {
    Condition::or(vec![
        Condition::user_input(query_ref, hits),
        Condition::nearest_neighbor(vector_field, query_ref, hits)?,
    ])
}

/// A single-field timestamp filter, present only when `bounds` is supplied.
pub(crate) fn single_time_filter(
    field: &str,
    bounds: Option<TimeBounds>,
) -> SearchClientResult<Option<Condition>> {
    bounds.map(|b| Condition::timestamp(field, field, b)).transpose()
}
