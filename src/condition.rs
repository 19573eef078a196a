//! The boolean condition algebra.
//!
//! A [`Condition`] is an immutable node with a single rendering operation
//! yielding a SQL fragment. Rendering is a pure function of a node's
//! immediate fields — no global state, and composing two conditions always
//! yields a new node rather than mutating either input (spec §3.1
//! invariants 1–2).
//!
//! Nearest-neighbor argument order is canonicalized as `(field, queryRef)`:
//! the source material sometimes supplies these in the opposite order; this
//! crate always treats the first positional argument as the indexed field
//! and the second as the bound query reference. See spec §9 Open Question
//! (a).

use crate::error::{SearchClientError, SearchClientResult};
use crate::escaping::{Value, validate_field_name};
use crate::permission::PermissionPolicy;

/// A comparison operator usable in a field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Contains,
    Matches,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    const fn render(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Matches => "matches",
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// An optional timestamp bound pair, at least one of which must be present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBounds {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// An immutable boolean-expression node.
///
/// Every variant renders via [`Condition::render`], a pure function of the
/// node's own fields. Combinators ([`Condition::and`], [`Condition::or`],
/// [`Condition::not`], [`Condition::parenthesize`]) return new nodes without
/// mutating the receiver (spec §3.1 invariant 3, §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `(field, operator, value)` — a single field comparison.
    FieldComparison {
        field: String,
        operator: Operator,
        value: Value,
    },
    /// A fuzzy-match clause against a bound query parameter.
    FuzzyContains {
        field: String,
        query_ref: String,
        max_edit_distance: u32,
        prefix: bool,
    },
    /// A lexical-search clause with a target-hits hint.
    UserInput { query_ref: String, target_hits: u32 },
    /// A vector-similarity clause. Canonical argument order: `(field, queryRef)`.
    NearestNeighbor {
        field: String,
        query_ref: String,
        target_hits: u32,
    },
    /// An ordered, non-empty conjunction with an attached permission policy.
    And {
        children: Vec<Condition>,
        permission: PermissionPolicy,
    },
    /// An ordered, non-empty disjunction with an attached permission policy.
    Or {
        children: Vec<Condition>,
        permission: PermissionPolicy,
    },
    /// `!(child)`
    Not(Box<Condition>),
    /// `(child)`
    Paren(Box<Condition>),
    /// `fromField >= from AND toField <= to`
    Timestamp {
        from_field: String,
        to_field: String,
        bounds: TimeBounds,
    },
    /// `(field contains 'v1' or field contains 'v2' ...)`, empty values filtered.
    Inclusion { field: String, values: Vec<String> },
    /// `!(docId contains 'id1' or ...)`, empty values filtered.
    Exclusion { doc_ids: Vec<String> },
    /// An uninterpreted SQL fragment — escape hatch.
    Raw(String),
}

impl Condition {
    /// Build a field comparison, validating the field name.
    pub fn field(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> SearchClientResult<Self> {
        let field = field.into();
        validate_field_name(&field)?;
        Ok(Self::FieldComparison {
            field,
            operator,
            value: value.into(),
        })
    }

    /// Build a fuzzy-contains clause, validating the field name.
    pub fn fuzzy_contains(
        field: impl Into<String>,
        query_ref: impl Into<String>,
        max_edit_distance: u32,
        prefix: bool,
    ) -> SearchClientResult<Self> {
        let field = field.into();
        validate_field_name(&field)?;
        Ok(Self::FuzzyContains {
            field,
            query_ref: query_ref.into(),
            max_edit_distance,
            prefix,
        })
    }

    /// Build a lexical user-input clause.
    #[must_use]
    pub fn user_input(query_ref: impl Into<String>, target_hits: u32) -> Self {
        Self::UserInput {
            query_ref: query_ref.into(),
            target_hits,
        }
    }

    /// Build a nearest-neighbor clause. Canonical argument order is
    /// `(field, queryRef)` — see the module doc comment.
    pub fn nearest_neighbor(
        field: impl Into<String>,
        query_ref: impl Into<String>,
        target_hits: u32,
    ) -> SearchClientResult<Self> {
        let field = field.into();
        validate_field_name(&field)?;
        Ok(Self::NearestNeighbor {
            field,
            query_ref: query_ref.into(),
            target_hits,
        })
    }

    /// Build a conjunction with no permission requirement. Fails if `children`
    /// is empty (spec §8.1 invariant 4).
    pub fn and(children: Vec<Condition>) -> SearchClientResult<Self> {
        Self::and_with_permission(children, PermissionPolicy::default())
    }

    /// Build a conjunction with an explicit permission policy.
    pub fn and_with_permission(
        children: Vec<Condition>,
        permission: PermissionPolicy,
    ) -> SearchClientResult<Self> {
        if children.is_empty() {
            return Err(SearchClientError::validation(
                "conjunction must have at least one child",
            ));
        }
        Ok(Self::And {
            children,
            permission,
        })
    }

    /// Build a disjunction with no permission requirement. Fails if `children`
    /// is empty (spec §8.1 invariant 4).
    pub fn or(children: Vec<Condition>) -> SearchClientResult<Self> {
        Self::or_with_permission(children, PermissionPolicy::default())
    }

    /// Build a disjunction with an explicit permission policy.
    pub fn or_with_permission(
        children: Vec<Condition>,
        permission: PermissionPolicy,
    ) -> SearchClientResult<Self> {
        if children.is_empty() {
            return Err(SearchClientError::validation(
                "disjunction must have at least one child",
            ));
        }
        Ok(Self::Or {
            children,
            permission,
        })
    }

    /// Negate this condition: `!(self)`. Total over all `Condition`s.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Wrap this condition in parentheses: `(self)`. Total, and idempotent
    /// up to an extra wrap layer (spec §8.1 invariant 3): applying it twice
    /// renders one more `(...)` than applying it once, but both forms are
    /// semantically equivalent.
    #[must_use]
    pub fn parenthesize(self) -> Self {
        Self::Paren(Box::new(self))
    }

    /// Build a timestamp range. At least one of `from`/`to` must be present
    /// (spec §8.1 / §4.2 edge case).
    pub fn timestamp(
        from_field: impl Into<String>,
        to_field: impl Into<String>,
        bounds: TimeBounds,
    ) -> SearchClientResult<Self> {
        if bounds.from.is_none() && bounds.to.is_none() {
            return Err(SearchClientError::validation(
                "timestamp range requires at least one bound",
            ));
        }
        let from_field = from_field.into();
        let to_field = to_field.into();
        validate_field_name(&from_field)?;
        validate_field_name(&to_field)?;
        Ok(Self::Timestamp {
            from_field,
            to_field,
            bounds,
        })
    }

    /// Build an inclusion condition over a set of values; blank/empty values
    /// are filtered at construction time.
    pub fn inclusion(field: impl Into<String>, values: Vec<String>) -> SearchClientResult<Self> {
        let field = field.into();
        validate_field_name(&field)?;
        let values = values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect();
        Ok(Self::Inclusion { field, values })
    }

    /// Build an exclusion condition over a set of document ids; blank/empty
    /// ids are filtered at construction time.
    #[must_use]
    pub fn exclusion(doc_ids: Vec<String>) -> Self {
        let doc_ids = doc_ids
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect();
        Self::Exclusion { doc_ids }
    }

    /// An uninterpreted SQL fragment.
    #[must_use]
    pub fn raw(fragment: impl Into<String>) -> Self {
        Self::Raw(fragment.into())
    }

    /// Whether this condition renders to the empty string (only possible for
    /// an [`Condition::Inclusion`]/[`Condition::Exclusion`] whose value set was
    /// empty after filtering).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Inclusion { values, .. } => values.is_empty(),
            Self::Exclusion { doc_ids } => doc_ids.is_empty(),
            _ => false,
        }
    }

    /// Render this condition to a SQL fragment. Pure function of the node's
    /// own fields (spec §3.1 invariant 1).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::FieldComparison {
                field,
                operator,
                value,
            } => format!("{field} {} {}", operator.render(), value.render()),
            Self::FuzzyContains {
                field,
                query_ref,
                max_edit_distance,
                prefix,
            } => format!(
                "{field} contains ({{maxEditDistance: {max_edit_distance}, prefix: {prefix}}}fuzzy(@{query_ref}))"
            ),
            Self::UserInput {
                query_ref,
                target_hits,
            } => format!("userInput(@{query_ref}, {{targetHits: {target_hits}}})"),
            Self::NearestNeighbor {
                field,
                query_ref,
                target_hits,
            } => format!("nearestNeighbor({field}, {query_ref}, {{targetHits: {target_hits}}})"),
            Self::And {
                children,
                permission,
            } => {
                let body = children
                    .iter()
                    .map(Self::render)
                    .collect::<Vec<_>>()
                    .join(" and ");
                permission.apply(&body)
            }
            Self::Or {
                children,
                permission,
            } => {
                let body = children
                    .iter()
                    .map(Self::render)
                    .collect::<Vec<_>>()
                    .join(" or ");
                permission.apply(&body)
            }
            Self::Not(child) => format!("!({})", child.render()),
            Self::Paren(child) => format!("({})", child.render()),
            Self::Timestamp {
                from_field,
                to_field,
                bounds,
            } => render_timestamp(from_field, to_field, bounds),
            Self::Inclusion { field, values } => render_set(field, values, "contains", false),
            Self::Exclusion { doc_ids } => {
                if doc_ids.is_empty() {
                    String::new()
                } else {
                    format!("!({})", render_set("docId", doc_ids, "contains", true))
                }
            }
            Self::Raw(fragment) => fragment.clone(),
        }
    }
}

fn render_timestamp(from_field: &str, to_field: &str, bounds: &TimeBounds) -> String {
    let mut parts = Vec::new();
    if let Some(from) = bounds.from {
        parts.push(format!("{from_field} >= {from}"));
    }
    if let Some(to) = bounds.to {
        parts.push(format!("{to_field} <= {to}"));
    }
    parts.join(" and ")
}

/// Render a set of values as an inclusion/exclusion body: `field contains
/// 'v1' or field contains 'v2' ...`, unwrapped when exactly one value
/// survives filtering (spec §4.2 edge case), parenthesized otherwise.
fn render_set(field: &str, values: &[String], verb: &str, _is_doc_id: bool) -> String {
    match values.len() {
        0 => String::new(),
        1 => format!("{field} {verb} '{}'", crate::escaping::escape_value(&values[0])),
        _ => {
            let body = values
                .iter()
                .map(|v| format!("{field} {verb} '{}'", crate::escaping::escape_value(v)))
                .collect::<Vec<_>>()
                .join(" or ");
            format!("({body})")
        }
    }
}
