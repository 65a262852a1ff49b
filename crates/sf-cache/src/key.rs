//! Canonical cache keys
//!
//! Request parameters are normalized before they become a key: strings are
//! trimmed, blank values dropped, list filters sorted and deduplicated, and
//! fields emitted in name order. Two filter sets that differ only in ordering
//! or whitespace therefore share one entry, while different entity ids never do.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Canonical, normalized cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request parameters that can be reduced to a [`CacheKey`]
pub trait ToCacheKey {
    /// Build the canonical key
    fn cache_key(&self) -> CacheKey;
}

/// Builder for [`CacheKey`]
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    family: String,
    fields: BTreeMap<String, String>,
}

impl KeyBuilder {
    /// Start a key for a request family
    #[must_use]
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Entity identifier, always part of the key
    #[must_use]
    pub fn id(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), escape(value.trim()));
        self
    }

    /// Optional free-text field; blank values are omitted
    #[must_use]
    pub fn text(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.fields.insert(name.to_string(), escape(value));
        }
        self
    }

    /// List filter; order and duplicates do not matter
    #[must_use]
    pub fn list<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if items.is_empty() {
            return self;
        }
        items.sort_unstable();
        items.dedup();
        let joined = items.iter().map(|v| escape(v)).collect::<Vec<_>>().join(",");
        self.fields.insert(name.to_string(), joined);
        self
    }

    /// Optional boolean flag
    #[must_use]
    pub fn flag(mut self, name: &str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Optional number
    #[must_use]
    pub fn number(mut self, name: &str, value: Option<u64>) -> Self {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Finish the key
    #[must_use]
    pub fn build(self) -> CacheKey {
        let mut key = escape(&self.family);
        for (i, (name, value)) in self.fields.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            let _ = write!(key, "{}={}", escape(name), value);
        }
        CacheKey(key)
    }
}

/// Escape the separators used by [`KeyBuilder::build`]
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ',' | '&' | '=' | '?') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::collection::vec as list_of;

    #[test]
    fn list_order_and_whitespace_ignored() {
        let a = KeyBuilder::new("process")
            .list("status", ["under_review", " pre_check", "decision"])
            .text("q", Some("  graphene "))
            .build();
        let b = KeyBuilder::new("process")
            .text("q", Some("graphene"))
            .list("status", ["decision", "pre_check", "under_review", "decision"])
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_values_are_omitted() {
        let a = KeyBuilder::new("process").text("q", Some("   ")).list("status", [""]).build();
        let b = KeyBuilder::new("process").build();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "process");
    }

    #[test]
    fn different_ids_never_collide() {
        let a = KeyBuilder::new("reviews").id("manuscript", "m-1").build();
        let b = KeyBuilder::new("reviews").id("manuscript", "m-2").build();
        assert_ne!(a, b);
    }

    #[test]
    fn separators_are_escaped() {
        let joined = KeyBuilder::new("f").list("tags", ["a,b"]).build();
        let split = KeyBuilder::new("f").list("tags", ["a", "b"]).build();
        assert_ne!(joined, split);

        let injected = KeyBuilder::new("f").text("q", Some("x&y=z")).build();
        let real = KeyBuilder::new("f").text("q", Some("x")).text("y", Some("z")).build();
        assert_ne!(injected, real);
    }

    #[test]
    fn flags_and_numbers() {
        let key = KeyBuilder::new("process")
            .flag("overdue", Some(true))
            .number("page", Some(2))
            .flag("mine", None)
            .build();
        assert_eq!(key.to_string(), "process?overdue=true&page=2");
    }

    proptest! {
        #[test]
        fn list_key_is_order_independent(mut values in list_of("[a-z ]{0,6}", 0..6)) {
            let forward = KeyBuilder::new("f").list("v", values.clone()).build();
            values.reverse();
            let reversed = KeyBuilder::new("f").list("v", values).build();
            prop_assert_eq!(forward, reversed);
        }

        #[test]
        fn distinct_ids_give_distinct_keys(a in "[a-z0-9,&=?-]{1,8}", b in "[a-z0-9,&=?-]{1,8}") {
            prop_assume!(a != b);
            let ka = KeyBuilder::new("f").id("id", &a).build();
            let kb = KeyBuilder::new("f").id("id", &b).build();
            prop_assert_ne!(ka, kb);
        }
    }
}
