//! Default hybrid condition (spec §4.5.1): used for corpora with no
//! app-specific override.

use crate::condition::{Condition, TimeBounds};
use crate::error::SearchClientResult;

use super::{hybrid_core, single_time_filter};

/// The four time fields recognized when no corpus-specific field applies:
/// `updatedAt`, `creationTime`, `startTime`, `timestamp`. When `time_bounds`
/// is present, the filter is an `Or` over all four so a document matching
/// any one of them passes.
const RECOGNIZED_TIME_FIELDS: [&str; 4] = ["updatedAt", "creationTime", "startTime", "timestamp"];

/// Build the default hybrid condition: `Or(UserInput, NearestNeighbor)`
/// optionally conjoined with the recognized-time-fields union.
pub fn default_hybrid(
    query_ref: &str,
    hits: u32,
    time_bounds: Option<TimeBounds>,
) -> SearchClientResult<Condition> {
    let core = hybrid_core(query_ref, hits, "chunk_embeddings")?;
    let Some(bounds) = time_bounds else {
        return Ok(core);
    };
    let per_field: Vec<Condition> = RECOGNIZED_TIME_FIELDS
        .iter()
        .map(|field| single_time_filter(field, Some(bounds)))
        .collect::<SearchClientResult<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();
    let time_union = Condition::or(per_field)?;
    Condition::and(vec![core, time_union])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_time_bounds_yields_bare_core() {
        let c = default_hybrid("query", 50, None).unwrap();
        assert_eq!(
            c.render(),
            "userInput(@query, {targetHits: 50}) or nearestNeighbor(chunk_embeddings, query, {targetHits: 50})"
        );
    }

    #[test]
    fn time_bounds_conjoin_union_of_four_fields() {
        let bounds = TimeBounds {
            from: Some(10),
            to: None,
        };
        let c = default_hybrid("query", 50, Some(bounds)).unwrap();
        let rendered = c.render();
        assert!(rendered.contains("updatedAt >= 10"));
        assert!(rendered.contains("creationTime >= 10"));
        assert!(rendered.contains("startTime >= 10"));
        assert!(rendered.contains("timestamp >= 10"));
        assert!(rendered.contains(" and "));
    }
}
