//! Workspace profile (contacts/users), spec §4.5.2.
//!
//! Two parallel sub-queries, `Or`'d together, each carrying its own
//! permission policy: a permission-based branch (bound-`@email` principal,
//! time-filtered on `creationTime`, with an implicit `app = GoogleWorkspace`
//! filter when the caller supplied no explicit app/entity), and an
//! ownership-based branch (concrete owner principal, same time filter, plus
//! whatever app/entity filters the caller did supply).

use crate::condition::{Condition, Operator, TimeBounds};
use crate::error::SearchClientResult;
use crate::permission::PermissionPolicy;

use super::{hybrid_core, single_time_filter};

/// Build the workspace (contacts/users) condition tree.
pub fn workspace(
    query_ref: &str,
    hits: u32,
    principal: &str,
    creation_time_bounds: Option<TimeBounds>,
    apps: &[String],
    entities: &[String],
) -> SearchClientResult<Condition> {
    let core_for_permission = hybrid_core(query_ref, hits, "chunk_embeddings")?;
    let core_for_ownership = hybrid_core(query_ref, hits, "chunk_embeddings")?;

    let mut permission_children = vec![core_for_permission];
    if let Some(t) = single_time_filter("creationTime", creation_time_bounds)? {
        permission_children.push(t);
    }
    if apps.is_empty() && entities.is_empty() {
        permission_children.push(Condition::field("app", Operator::Contains, "GoogleWorkspace")?);
    }
    let permission_branch = Condition::and_with_permission(
        permission_children,
        PermissionPolicy::with_email_permissions(),
    )?;

    let mut ownership_children = vec![core_for_ownership];
    if let Some(t) = single_time_filter("creationTime", creation_time_bounds)? {
        ownership_children.push(t);
    }
    if !apps.is_empty() {
        let app_filter = Condition::inclusion("app", apps.to_vec())?;
        if !app_filter.is_empty() {
            ownership_children.push(app_filter);
        }
    }
    if !entities.is_empty() {
        let entity_filter = Condition::inclusion("entity", entities.to_vec())?;
        if !entity_filter.is_empty() {
            ownership_children.push(entity_filter);
        }
    }
    let ownership_branch = Condition::and_with_permission(
        ownership_children,
        PermissionPolicy::with_owner_permissions(principal),
    )?;

    Condition::or(vec![permission_branch, ownership_branch])
}
