//! The query builder: assembles sources, `WHERE` root, ordering, pagination,
//! and grouping into a single query string (or a `(query, profile)` pair).
//!
//! [`QueryBuilder`] is a transient, single-use builder: every setter mutates
//! the in-progress builder and returns `Self` for chaining; `build`/
//! `build_profile` is the only side-effectful step, and a `QueryBuilder` is
//! created fresh per call and discarded after rendering (spec §3.3
//! lifecycle).

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{SearchClientError, SearchClientResult};
use crate::escaping::validate_field_name;

/// Sentinel source list meaning "search every configured corpus".
pub const ALL_SOURCES: &str = "*";

/// Sort direction for `orderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    const fn render(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A `(field, direction)` ordering clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// A `(query, ranking profile)` pair, the product of [`QueryBuilder::build_profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryProfile {
    /// The server-side ranking profile name.
    pub profile: String,
    /// The rendered query string.
    pub yql: String,
}

/// A transient, single-use builder for a query string.
///
/// Every setter consumes and returns `self`, so callers chain calls:
/// `QueryBuilder::new().from(["file"]).where_(cond).limit(10).build()`.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    sources: Vec<String>,
    root: Option<Condition>,
    order_by: Option<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    group_by: Option<String>,
}

impl QueryBuilder {
    /// Start a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source/corpus list. Pass a single [`ALL_SOURCES`] entry to
    /// select every configured corpus.
    #[must_use]
    pub fn from<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set (replace) the `WHERE` root predicate.
    #[must_use]
    pub fn where_(mut self, cond: Condition) -> Self {
        self.root = Some(cond);
        self
    }

    /// Convenience for `where_(Or(conds))`, ignoring conditions that render
    /// to the empty string (empty inclusions/exclusions) and skipping the
    /// call entirely if nothing survives.
    #[must_use]
    pub fn where_or(mut self, conds: Vec<Condition>) -> Self {
        let non_empty: Vec<Condition> = conds.into_iter().filter(|c| !c.is_empty()).collect();
        if non_empty.is_empty() {
            return self;
        }
        let root = if non_empty.len() == 1 {
            non_empty.into_iter().next().unwrap()
        } else {
            Condition::or(non_empty).expect("checked non-empty above")
        };
        self.root = Some(root);
        self
    }

    /// Conjoin `contains('app', ...)` onto the current root (or set it, if
    /// there's no root yet). Accepts either a single app name or a set.
    #[must_use]
    pub fn filter_by_app<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = apps.into_iter().map(Into::into).collect();
        self.root = conjoin_field_set(self.root, "app", values);
        self
    }

    /// Conjoin `contains('entity', ...)` onto the current root.
    #[must_use]
    pub fn filter_by_entity<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = entities.into_iter().map(Into::into).collect();
        self.root = conjoin_field_set(self.root, "entity", values);
        self
    }

    /// Conjoin an exclusion onto the current root; ignored when `doc_ids` is
    /// empty (after blank filtering).
    #[must_use]
    pub fn exclude_doc_ids(mut self, doc_ids: Vec<String>) -> Self {
        let exclusion = Condition::exclusion(doc_ids);
        if exclusion.is_empty() {
            return self;
        }
        self.root = Some(match self.root.take() {
            Some(existing) => Condition::and(vec![existing, exclusion])
                .expect("two elements is always non-empty"),
            None => exclusion,
        });
        self
    }

    /// Set the ordering clause; the field name is validated.
    ///
    /// # Errors
    /// Returns [`SearchClientError::Validation`] if `field` fails identifier
    /// validation.
    pub fn order_by(
        mut self,
        field: impl Into<String>,
        direction: SortDirection,
    ) -> SearchClientResult<Self> {
        let field = field.into();
        validate_field_name(&field)?;
        self.order_by = Some(OrderBy { field, direction });
        Ok(self)
    }

    /// Set the result limit. `0` is preserved and meaningful ("count-only").
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set the result offset.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Attach a raw, uninterpreted grouping expression tail.
    #[must_use]
    pub fn group_by(mut self, raw_expr: impl Into<String>) -> Self {
        self.group_by = Some(raw_expr.into());
        self
    }

    /// Emit the final query string.
    ///
    /// `select * from sources <srcs> where <cond> order by ... limit ...
    /// offset ... | <groupBy>`, omitting any clause whose value is absent.
    /// `where` is elided entirely when no root predicate is set;
    /// `select * from sources * where true` is the valid degenerate form
    /// when sources are `*` with no predicate.
    ///
    /// # Errors
    /// Returns [`SearchClientError::Validation`] if no sources were set.
    pub fn build(&self) -> SearchClientResult<String> {
        if self.sources.is_empty() {
            return Err(SearchClientError::validation(
                "query must have a non-empty source list",
            ));
        }

        let mut out = format!("select * from sources {}", self.sources.join(", "));

        match &self.root {
            Some(cond) => {
                let rendered = cond.render();
                if rendered.is_empty() {
                    if self.sources == [ALL_SOURCES] {
                        out.push_str(" where true");
                    }
                } else {
                    out.push_str(" where ");
                    out.push_str(&rendered);
                }
            }
            None if self.sources == [ALL_SOURCES] => out.push_str(" where true"),
            None => {}
        }

        if let Some(order) = &self.order_by {
            out.push_str(&format!(
                " order by {} {}",
                order.field,
                order.direction.render()
            ));
        }

        if let Some(limit) = self.limit {
            out.push_str(&format!(" limit {limit}"));
        }

        if let Some(offset) = self.offset {
            out.push_str(&format!(" offset {offset}"));
        }

        if let Some(group_by) = &self.group_by {
            out.push_str(&format!(" | {group_by}"));
        }

        Ok(out)
    }

    /// Emit a `(query, profile)` pair.
    ///
    /// # Errors
    /// Propagates [`Self::build`]'s validation errors.
    pub fn build_profile(
        &self,
        rank_profile: impl Into<String>,
    ) -> SearchClientResult<QueryProfile> {
        Ok(QueryProfile {
            profile: rank_profile.into(),
            yql: self.build()?,
        })
    }
}

/// Conjoin `contains(field, v)` (or a disjunction over `values` when there's
/// more than one) onto an existing root, or use it as the root if there is
/// none yet.
fn conjoin_field_set(
    root: Option<Condition>,
    field: &str,
    values: Vec<String>,
) -> Option<Condition> {
    let filter = Condition::inclusion(field, values).ok()?;
    if filter.is_empty() {
        return root;
    }
    Some(match root {
        Some(existing) => {
            Condition::and(vec![existing, filter]).expect("two elements is always non-empty")
        }
        None => filter,
    })
}
