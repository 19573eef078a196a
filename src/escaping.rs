//! Field-name and value sanitization for SQL-fragment embedding.
//!
//! These two primitives are the foundation the condition algebra
//! ([`crate::condition`]) is built on: every field comparison validates its
//! field name and escapes its string value through here before rendering.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SearchClientError, SearchClientResult};

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Validate a field name against `^[A-Za-z_][A-Za-z0-9_]*$`.
///
/// # Errors
/// Returns [`SearchClientError::Validation`] if `name` is empty or contains
/// characters outside the allowed identifier grammar.
pub fn validate_field_name(name: &str) -> SearchClientResult<()> {
    if FIELD_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(SearchClientError::validation(format!(
            "invalid field name: {name:?}"
        )))
    }
}

/// A value that can appear on the right-hand side of a field comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value; escaped and single-quoted when rendered.
    Str(String),
    /// A numeric value; rendered unquoted.
    Number(f64),
    /// A boolean value; rendered unquoted as `true`/`false`.
    Bool(bool),
}

impl Value {
    /// Render this value as it should appear inside a SQL fragment.
    ///
    /// Strings are escaped (`\` -> `\\`, `'` -> `\'`) and wrapped in single
    /// quotes; numbers and booleans render unquoted.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => format!("'{}'", escape_value(s)),
            Self::Number(n) => render_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Escape a raw string for embedding within single quotes: backslash first,
/// then single quote. Does not add the surrounding quotes itself.
#[must_use]
pub fn escape_value(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let as_i64 = n as i64;
        as_i64.to_string()
    } else {
        n.to_string()
    }
}
