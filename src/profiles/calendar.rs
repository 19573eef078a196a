//! Calendar profile, spec §4.5.5: hybrid core `and` time filter on `startTime`.

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;
use crate::permission::PermissionPolicy;

use super::{hybrid_core, single_time_filter};

/// Build the Google Calendar condition tree.
pub fn calendar(
    query_ref: &str,
    hits: u32,
    time_bounds: Option<TimeBounds>,
) -> SearchClientResult<Condition> {
    let mut children = vec![hybrid_core(query_ref, hits, "chunk_embeddings")?];
    if let Some(t) = single_time_filter("startTime", time_bounds)? {
        children.push(t);
    }
    Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_filter_is_on_start_time() {
        let bounds = TimeBounds {
            from: Some(100),
            to: None,
        };
        let c = calendar("query", 10, Some(bounds)).unwrap();
        assert!(c.render().contains("startTime >= 100"));
    }

    #[test]
    fn no_bounds_is_bare_core() {
        let c = calendar("query", 10, None).unwrap();
        assert!(!c.render().contains("startTime"));
    }
}
