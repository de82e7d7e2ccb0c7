//! Placeholder substitution over sequences of text runs.
//!
//! A word processor stores a paragraph as a list of *runs*: spans of text
//! sharing one set of character properties. Editing can split a placeholder
//! over several runs (`{{ti` + `tle}}`), so tokens are matched on the
//! concatenated paragraph text and the edit is mapped back onto the runs:
//!
//! - the value goes into the run in which the token **starts**;
//! - token characters living in later runs are removed from those runs;
//! - runs are never added or removed, so their formatting is untouched.
//!
//! The scan is a single pass: inserted values are never re-scanned.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::variables::VariableMap;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("token pattern is valid"));

/// What to do with a placeholder whose name has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Leave `{{name}}` in the output so the gap is visible.
    #[default]
    Keep,
    /// Replace the placeholder with the empty string.
    Empty,
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "empty" => Ok(Self::Empty),
            other => Err(format!("unknown missing policy '{other}' (expected keep|empty)")),
        }
    }
}

/// One `{{name}}` occurrence, with its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub span: Range<usize>,
}

/// Find every placeholder in `text`, left to right.
pub fn tokens(text: &str) -> Vec<Token> {
    TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(Token {
                name: name.as_str().to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Distinct placeholder names of one paragraph (runs are concatenated first).
pub fn placeholders<S: AsRef<str>>(runs: &[S]) -> BTreeSet<String> {
    let joined: String = runs.iter().map(AsRef::as_ref).collect();
    tokens(&joined).into_iter().map(|t| t.name).collect()
}

/// Outcome of one or more substitution passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstitutionReport {
    /// Tokens replaced by a mapped value.
    pub replaced: usize,
    /// Names that had no value (kept or blanked, depending on policy).
    pub unresolved: BTreeSet<String>,
    /// `true` if at least one run's text changed.
    pub changed: bool,
}

impl SubstitutionReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: SubstitutionReport) {
        self.replaced += other.replaced;
        self.unresolved.extend(other.unresolved);
        self.changed |= other.changed;
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitute placeholders across the runs of one paragraph, in place.
pub fn substitute(
    runs: &mut [String],
    mapping: &VariableMap,
    policy: MissingPolicy,
) -> SubstitutionReport {
    let mut report = SubstitutionReport::default();

    let joined: String = runs.concat();
    let found = tokens(&joined);
    if found.is_empty() {
        return report;
    }

    let mut edits: Vec<(Range<usize>, &str)> = Vec::with_capacity(found.len());
    for token in &found {
        match mapping.get(&token.name) {
            Some(value) => {
                report.replaced += 1;
                edits.push((token.span.clone(), value));
            }
            None => {
                report.unresolved.insert(token.name.clone());
                if policy == MissingPolicy::Empty {
                    edits.push((token.span.clone(), ""));
                }
            }
        }
    }

    if edits.is_empty() {
        return report;
    }

    let mut start = 0;
    for run in runs.iter_mut() {
        let range = start..start + run.len();
        start = range.end;

        let rewritten = rewrite_run(&joined, range, &edits);
        if rewritten != *run {
            *run = rewritten;
            report.changed = true;
        }
    }

    report
}

/// Convenience wrapper for a single string (one run).
pub fn render_text(text: &str, mapping: &VariableMap, policy: MissingPolicy) -> (String, SubstitutionReport) {
    let mut runs = [text.to_string()];
    let report = substitute(&mut runs, mapping, policy);
    let [out] = runs;
    (out, report)
}

// Rebuild the slice `joined[range]` with the edits that overlap it applied.
// An edit's value is emitted only by the run that contains its first byte.
fn rewrite_run(joined: &str, range: Range<usize>, edits: &[(Range<usize>, &str)]) -> String {
    let mut out = String::with_capacity(range.len());
    let mut pos = range.start;

    for (span, value) in edits {
        if span.end <= range.start || span.start >= range.end {
            continue;
        }
        if span.start >= range.start {
            out.push_str(&joined[pos..span.start]);
            out.push_str(value);
        }
        pos = span.end.min(range.end);
    }

    out.push_str(&joined[pos..range.end]);
    out
}
