//! Variable mappings and the layered resolver.
//!
//! A [`VariableMap`] is the flat `name → value` data used to fill
//! `{{name}}` placeholders. Names are case-sensitive and restricted to the
//! placeholder grammar (`[A-Za-z0-9_]+`) so that every entry can actually
//! match a token.
//!
//! # Precedence
//!
//! Resolution is a right-biased union: when the same key appears in more
//! than one layer, the later layer wins.
//!
//! | Layer (lowest first)     | Source                        |
//! |--------------------------|-------------------------------|
//! | built-ins                | `DATE`, `YEAR` (CLI supplied) |
//! | template defaults        | sidecar manifest `[defaults]` |
//! | variables file           | `--vars FILE`                 |
//! | overrides                | `--var key=value`             |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::error::DomainError;

/// `true` if `name` matches `[A-Za-z0-9_]+`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidVariableName {
            name: name.into(),
            reason: "name cannot be empty".into(),
        });
    }
    if !is_valid_name(name) {
        return Err(DomainError::InvalidVariableName {
            name: name.into(),
            reason: "only ASCII letters, digits and '_' are allowed".into(),
        });
    }
    Ok(())
}

/// Resolved (or partially resolved) variable data.
///
/// Backed by a `BTreeMap` so listings and JSON output are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableMap {
    entries: BTreeMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(name, value)` pairs, validating every name.
    ///
    /// Later pairs overwrite earlier ones with the same name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v)?;
        }
        Ok(map)
    }

    /// Insert a variable, returning the previous value for that name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(self.entries.insert(name, value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: &VariableMap) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Transform every value, keeping names unchanged.
    ///
    /// Used by document codecs to escape values for their markup.
    pub fn map_values(&self, f: impl Fn(&str) -> String) -> VariableMap {
        VariableMap {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariableMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse one command-line override of the form `key=value`.
///
/// Splits on the **first** `=` only, so `url=a=b` yields `("url", "a=b")`.
/// An empty value is allowed.
pub fn parse_override(raw: &str) -> Result<(String, String), DomainError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| DomainError::MalformedOverride { raw: raw.into() })?;

    if key.is_empty() {
        return Err(DomainError::MalformedOverride { raw: raw.into() });
    }
    validate_name(key)?;

    Ok((key.to_string(), value.to_string()))
}

/// Parse every override; the first malformed entry aborts the whole batch.
pub fn parse_overrides<I, S>(raw: I) -> Result<VariableMap, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = VariableMap::new();
    for item in raw {
        let (k, v) = parse_override(item.as_ref())?;
        map.insert(k, v)?;
    }
    Ok(map)
}

/// Merge template defaults with user overrides; overrides win on collision.
pub fn resolve(template_defaults: &VariableMap, user_overrides: &VariableMap) -> VariableMap {
    resolve_layers([template_defaults, user_overrides])
}

/// N-ary form of [`resolve`]: layers are applied in order, later ones win.
pub fn resolve_layers<'a>(layers: impl IntoIterator<Item = &'a VariableMap>) -> VariableMap {
    let mut out = VariableMap::new();
    for layer in layers {
        out.merge(layer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> VariableMap {
        VariableMap::from_pairs(pairs.iter().copied()).unwrap()
    }

    // ── names ─────────────────────────────────────────────────────────────

    #[test]
    fn valid_names() {
        for name in ["title", "TITLE", "a1", "_x", "order_no_2"] {
            assert!(is_valid_name(name), "rejected: {name}");
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "a-b", "a b", "标题", "a.b", "{x}"] {
            assert!(!is_valid_name(name), "accepted: {name}");
        }
    }

    #[test]
    fn insert_rejects_invalid_name() {
        let mut m = VariableMap::new();
        assert!(matches!(
            m.insert("bad-name", "x"),
            Err(DomainError::InvalidVariableName { .. })
        ));
        assert!(m.is_empty());
    }

    // ── overrides ─────────────────────────────────────────────────────────

    #[test]
    fn override_splits_on_first_equals() {
        assert_eq!(
            parse_override("url=https://x.test/?a=b").unwrap(),
            ("url".to_string(), "https://x.test/?a=b".to_string())
        );
    }

    #[test]
    fn override_allows_empty_value() {
        assert_eq!(
            parse_override("note=").unwrap(),
            ("note".to_string(), String::new())
        );
    }

    #[test]
    fn override_without_equals_is_malformed() {
        assert_eq!(
            parse_override("novalue"),
            Err(DomainError::MalformedOverride {
                raw: "novalue".into()
            })
        );
    }

    #[test]
    fn override_with_empty_key_is_malformed() {
        assert!(matches!(
            parse_override("=value"),
            Err(DomainError::MalformedOverride { .. })
        ));
    }

    #[test]
    fn override_with_bad_key_is_rejected() {
        assert!(matches!(
            parse_override("my-key=v"),
            Err(DomainError::InvalidVariableName { .. })
        ));
    }

    #[test]
    fn one_malformed_override_aborts_all() {
        let result = parse_overrides(["a=1", "broken", "b=2"]);
        assert!(matches!(result, Err(DomainError::MalformedOverride { .. })));
    }

    #[test]
    fn repeated_override_last_wins() {
        let m = parse_overrides(["a=1", "a=2"]).unwrap();
        assert_eq!(m.get("a"), Some("2"));
        assert_eq!(m.len(), 1);
    }

    // ── resolve ───────────────────────────────────────────────────────────

    #[test]
    fn resolve_contains_union_of_keys() {
        let d = map(&[("a", "1"), ("b", "2")]);
        let u = map(&[("b", "20"), ("c", "30")]);
        let r = resolve(&d, &u);

        assert_eq!(r.len(), 3);
        assert_eq!(r.get("a"), Some("1"));
        assert_eq!(r.get("b"), Some("20"));
        assert_eq!(r.get("c"), Some("30"));
    }

    #[test]
    fn resolve_disjoint_keys() {
        let d = map(&[("a", "1")]);
        let u = map(&[("z", "26")]);
        assert_eq!(resolve(&d, &u).len(), 2);
    }

    #[test]
    fn resolve_with_empty_inputs() {
        let empty = VariableMap::new();
        let d = map(&[("a", "1")]);
        assert_eq!(resolve(&empty, &empty), VariableMap::new());
        assert_eq!(resolve(&d, &empty), d);
        assert_eq!(resolve(&empty, &d), d);
    }

    #[test]
    fn resolve_chinese_notice_scenario() {
        let defaults = map(&[("title", "默认标题"), ("author", "默认作者")]);
        let overrides = parse_overrides(["title=年度通知"]).unwrap();

        let resolved = resolve(&defaults, &overrides);

        assert_eq!(resolved, map(&[("title", "年度通知"), ("author", "默认作者")]));
    }

    #[test]
    fn resolve_layers_later_wins() {
        let builtins = map(&[("YEAR", "2026"), ("title", "builtin")]);
        let defaults = map(&[("title", "default")]);
        let file = map(&[("title", "file"), ("author", "file")]);
        let cli = map(&[("author", "cli")]);

        let r = resolve_layers([&builtins, &defaults, &file, &cli]);

        assert_eq!(r.get("YEAR"), Some("2026"));
        assert_eq!(r.get("title"), Some("file"));
        assert_eq!(r.get("author"), Some("cli"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let r = resolve(&map(&[("Title", "A")]), &map(&[("title", "b")]));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn map_values_keeps_names() {
        let m = map(&[("a", "x"), ("b", "y")]).map_values(|v| v.to_uppercase());
        assert_eq!(m.get("a"), Some("X"));
        assert_eq!(m.get("b"), Some("Y"));
    }
}
