//! Google Drive profile, spec §4.5.4.
//!
//! Hybrid core `and` time filter on `updatedAt`, plus an optional
//! drive-scoped docId inclusion carried in its own bypass-permissions
//! disjunction branch (so a direct-link/shared-doc search doesn't also
//! require an owner/permissions match).

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;
use crate::permission::PermissionPolicy;

use super::{hybrid_core, single_time_filter};

/// Build the Google Drive condition tree.
pub fn drive(
    query_ref: &str,
    hits: u32,
    time_bounds: Option<TimeBounds>,
    scoped_doc_ids: &[String],
) -> SearchClientResult<Condition> {
    let mut children = vec![hybrid_core(query_ref, hits, "chunk_embeddings")?];
    if let Some(t) = single_time_filter("updatedAt", time_bounds)? {
        children.push(t);
    }
    let main = Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())?;

    let doc_id_filter = Condition::inclusion("docId", scoped_doc_ids.to_vec())?;
    if doc_id_filter.is_empty() {
        return Ok(main);
    }

    let bypass_branch =
        Condition::or_with_permission(vec![doc_id_filter], PermissionPolicy::bypassed())?;
    Condition::or(vec![main, bypass_branch])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scoped_ids_is_just_the_permission_gated_core() {
        let c = drive("query", 10, None, &[]).unwrap();
        assert!(c.render().contains("owner contains '@email'"));
        assert!(!c.render().contains("docId"));
    }

    #[test]
    fn scoped_ids_add_bypass_branch() {
        let c = drive("query", 10, None, &["f1".into(), "f2".into()]).unwrap();
        let rendered = c.render();
        assert!(rendered.contains("docId contains 'f1' or docId contains 'f2'"));
        // the bypass branch must not carry a permission clause
        let bypass_fragment = "(docId contains 'f1' or docId contains 'f2')";
        assert!(rendered.contains(bypass_fragment));
    }

    #[test]
    fn time_bounds_apply_to_updated_at() {
        let bounds = TimeBounds {
            from: Some(1),
            to: Some(2),
        };
        let c = drive("query", 10, Some(bounds), &[]).unwrap();
        assert!(c.render().contains("updatedAt >= 1 and updatedAt <= 2"));
    }
}
