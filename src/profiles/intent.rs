//! Gmail intent filter, spec §4.5.8.
//!
//! An [`Intent`] breaks a natural-language query into recipient/subject
//! sets. Each non-empty set becomes a `Contains`-style inclusion on the
//! same-named field; sets are conjoined, values within a set are disjoined
//! (handled by [`Condition::inclusion`] itself). The whole filter is skipped
//! when the intent carries no email-shaped value and no subject text — a
//! name-only intent ("find docs from Alice") is a no-op, not a filter that
//! matches nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::condition::Condition;
use crate::error::SearchClientResult;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A structured breakdown of a user query into recipient/subject fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Vec<String>,
}

impl Intent {
    fn has_email_signal(&self) -> bool {
        [&self.from, &self.to, &self.cc, &self.bcc]
            .into_iter()
            .flatten()
            .any(|v| EMAIL_RE.is_match(v))
    }

    fn has_subject_signal(&self) -> bool {
        self.subject.iter().any(|s| !s.trim().is_empty())
    }
}

/// Build the intent filter, or `None` when the intent is a no-op (spec §8.1
/// invariant 7: fields contain only non-email strings and no subject).
pub fn intent_filter(intent: &Intent) -> SearchClientResult<Option<Condition>> {
    if !intent.has_email_signal() && !intent.has_subject_signal() {
        return Ok(None);
    }

    let mut children = Vec::new();
    for (field, values) in [
        ("from", &intent.from),
        ("to", &intent.to),
        ("cc", &intent.cc),
        ("bcc", &intent.bcc),
        ("subject", &intent.subject),
    ] {
        let filter = Condition::inclusion(field, values.clone())?;
        if !filter.is_empty() {
            children.push(filter);
        }
    }

    if children.is_empty() {
        return Ok(None);
    }
    if children.len() == 1 {
        return Ok(children.into_iter().next());
    }
    Ok(Some(Condition::and(children)?))
}
