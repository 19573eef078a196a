//! Gmail profile, spec §4.5.3.
//!
//! Hybrid core `and` time filter on `timestamp` `and` an optional negated
//! label-inclusion (`notInMailLabels`) `and` an optional intent filter
//! (§4.5.8), all inside a single principal-scoped group.

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;
use crate::permission::PermissionPolicy;

use super::intent::{intent_filter, Intent};
use super::{hybrid_core, single_time_filter};

/// Build the Gmail condition tree.
pub fn gmail(
    query_ref: &str,
    hits: u32,
    time_bounds: Option<TimeBounds>,
    excluded_labels: &[String],
    intent: Option<&Intent>,
) -> SearchClientResult<Condition> {
    let mut children = vec![hybrid_core(query_ref, hits, "chunk_embeddings")?];

    if let Some(t) = single_time_filter("timestamp", time_bounds)? {
        children.push(t);
    }

    let labels = Condition::inclusion("labels", excluded_labels.to_vec())?;
    if !labels.is_empty() {
        children.push(labels.not());
    }

    if let Some(intent) = intent {
        if let Some(intent_cond) = intent_filter(intent)? {
            children.push(intent_cond);
        }
    }

    Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())
}
