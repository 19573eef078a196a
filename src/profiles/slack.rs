//! Slack profile, spec §4.5.6: same shape as Drive (§4.5.4), but the time
//! filter field is `updatedAt`, the vector field is `text_embeddings`, and
//! the bypass-scoped inclusion is a channel-id set rather than a docId set.

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;
use crate::permission::PermissionPolicy;

use super::{hybrid_core, single_time_filter};

/// Build the Slack condition tree.
pub fn slack(
    query_ref: &str,
    hits: u32,
    time_bounds: Option<TimeBounds>,
    scoped_channel_ids: &[String],
) -> SearchClientResult<Condition> {
    let mut children = vec![hybrid_core(query_ref, hits, "text_embeddings")?];
    if let Some(t) = single_time_filter("updatedAt", time_bounds)? {
        children.push(t);
    }
    let main = Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())?;

    let channel_filter = Condition::inclusion("channelId", scoped_channel_ids.to_vec())?;
    if channel_filter.is_empty() {
        return Ok(main);
    }

    let bypass_branch =
        Condition::or_with_permission(vec![channel_filter], PermissionPolicy::bypassed())?;
    Condition::or(vec![main, bypass_branch])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_text_embeddings_vector_field() {
        let c = slack("query", 10, None, &[]).unwrap();
        assert!(c.render().contains("nearestNeighbor(text_embeddings"));
    }

    #[test]
    fn channel_scope_adds_bypass_branch() {
        let c = slack("query", 10, None, &["C1".into()]).unwrap();
        assert!(c.render().contains("channelId contains 'C1'"));
    }
}
