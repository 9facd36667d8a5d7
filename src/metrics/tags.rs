//! Metric tag sets.

/// An insertion-ordered set of `key=value` metric tags.
///
/// Inserting an existing key replaces its value in place. The key keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    entries: Vec<(String, String)>,
}

impl TagSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated tag string into a fresh set.
    pub fn parse(input: &str) -> Self {
        let mut tags = Self::new();
        tags.merge(input);
        tags
    }

    /// Adds a tag, or overwrites the value of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merges a tag string such as `"env=prod,team=core,canary"` into the set.
    ///
    /// Empty segments are skipped. A bare `key` means `key=`. Only the first
    /// `=` separates key from value. Segments with an empty key are dropped.
    pub fn merge(&mut self, input: &str) {
        for segment in input.split(',') {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            if key.is_empty() {
                continue;
            }
            self.insert(key, value);
        }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(tags: &TagSet) -> Vec<(&str, &str)> {
        tags.iter().collect()
    }

    #[test]
    fn test_merge_preserves_base_order() {
        let mut tags = TagSet::from_iter([("application", "x")]);
        tags.merge("a=1,b=2");

        assert_eq!(pairs(&tags), vec![("application", "x"), ("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_bare_keys_and_empty_segments() {
        let tags = TagSet::parse("a,b=,,c=1");
        assert_eq!(pairs(&tags), vec![("a", ""), ("b", ""), ("c", "1")]);
    }

    #[test]
    fn test_duplicate_keys_take_last_value() {
        let tags = TagSet::parse("a=1,a=2");
        assert_eq!(pairs(&tags), vec![("a", "2")]);
    }

    #[test]
    fn test_override_keeps_position() {
        let mut tags = TagSet::from_iter([("application", "svc"), ("host", "box-1")]);
        tags.merge("team=core,application=other");

        assert_eq!(
            pairs(&tags),
            vec![("application", "other"), ("host", "box-1"), ("team", "core")]
        );
    }

    #[test]
    fn test_splits_on_first_equals_only() {
        let tags = TagSet::parse("query=a=b");
        assert_eq!(tags.get("query"), Some("a=b"));
    }

    #[test]
    fn test_empty_keys_are_skipped() {
        let tags = TagSet::parse("=orphan,,=,ok=1");
        assert_eq!(pairs(&tags), vec![("ok", "1")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(TagSet::parse("").is_empty());
        assert_eq!(TagSet::parse(",,,").len(), 0);
    }
}
