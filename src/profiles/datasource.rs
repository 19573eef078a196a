//! Data-source and knowledge-base profiles, spec §4.5.7.
//!
//! Both are bypass-permissions groups (access control for these corpora is
//! enforced by the caller's selection of a concrete data-source/collection
//! id, not by the search layer): `Or(UserInput, NearestNeighbor)` conjoined
//! with an id-scoping inclusion.

use crate::condition::Condition;
use crate::error::{SearchClientError, SearchClientResult};
use crate::permission::PermissionPolicy;

use super::hybrid_core;

/// Build the data-source condition tree, scoped to one or more
/// `dataSourceId` values.
pub fn data_source(
    query_ref: &str,
    hits: u32,
    data_source_ids: &[String],
) -> SearchClientResult<Condition> {
    let core = hybrid_core(query_ref, hits, "chunk_embeddings")?;
    let scope = Condition::inclusion("dataSourceId", data_source_ids.to_vec())?;
    if scope.is_empty() {
        return Err(SearchClientError::validation(
            "data-source search requires at least one dataSourceId",
        ));
    }
    Condition::and_with_permission(vec![core, scope], PermissionPolicy::bypassed())
}

/// A knowledge-base collection scope: any combination of collection ids,
/// folder ids, and file (document) ids. At least one set must be non-empty.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseScope {
    pub collection_ids: Vec<String>,
    pub folder_ids: Vec<String>,
    pub doc_ids: Vec<String>,
}

/// Build the knowledge-base condition tree, scoped by one or more of
/// `clId`, `clFd`, `docId`.
pub fn knowledge_base(
    query_ref: &str,
    hits: u32,
    scope: &KnowledgeBaseScope,
) -> SearchClientResult<Condition> {
    let core = hybrid_core(query_ref, hits, "chunk_embeddings")?;

    let mut id_filters = Vec::new();
    for (field, ids) in [
        ("clId", &scope.collection_ids),
        ("clFd", &scope.folder_ids),
        ("docId", &scope.doc_ids),
    ] {
        let filter = Condition::inclusion(field, ids.clone())?;
        if !filter.is_empty() {
            id_filters.push(filter);
        }
    }

    if id_filters.is_empty() {
        return Err(SearchClientError::validation(
            "knowledge-base search requires at least one of clId, clFd, docId",
        ));
    }

    let scope_cond = if id_filters.len() == 1 {
        id_filters.into_iter().next().unwrap()
    } else {
        Condition::or(id_filters)?
    };

    Condition::and_with_permission(vec![core, scope_cond], PermissionPolicy::bypassed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_source_scopes_by_id_and_bypasses_permissions() {
        let c = data_source("query", 10, &["ds1".into()]).unwrap();
        let rendered = c.render();
        assert!(rendered.contains("dataSourceId contains 'ds1'"));
        assert!(!rendered.contains("permissions contains"));
        assert!(!rendered.contains("owner contains"));
    }

    #[test]
    fn data_source_requires_at_least_one_id() {
        assert!(data_source("query", 10, &[]).is_err());
    }

    #[test]
    fn knowledge_base_accepts_single_id_set() {
        let scope = KnowledgeBaseScope {
            doc_ids: vec!["f1".into(), "f2".into()],
            ..KnowledgeBaseScope::default()
        };
        // spec §8.2 scenario 3: no permission clause at all
        let c = knowledge_base("query", 10, &scope).unwrap();
        let rendered = c.render();
        assert!(rendered.contains("docId contains 'f1' or docId contains 'f2'"));
        assert!(!rendered.contains("permissions contains"));
    }

    #[test]
    fn knowledge_base_unions_multiple_id_sets() {
        let scope = KnowledgeBaseScope {
            collection_ids: vec!["c1".into()],
            doc_ids: vec!["f1".into()],
            ..KnowledgeBaseScope::default()
        };
        let c = knowledge_base("query", 10, &scope).unwrap();
        let rendered = c.render();
        assert!(rendered.contains("clId contains 'c1'"));
        assert!(rendered.contains("docId contains 'f1'"));
    }

    #[test]
    fn knowledge_base_requires_at_least_one_set() {
        assert!(knowledge_base("query", 10, &KnowledgeBaseScope::default()).is_err());
    }
}
