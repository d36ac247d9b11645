//! Case-insensitive name lookup and completion.
//!
//! Tag, list, and command names are matched after normalization (trimmed,
//! lowercased, inner whitespace collapsed). Completion returns the candidate
//! names to the caller; nothing here touches the terminal.

/// Normalize a name for comparison
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Outcome of resolving a user-typed name
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, V> {
    /// Normalized names are equal
    Exact(&'a V),
    /// No exact match, but exactly one name contains the query
    Partial(&'a V),
    /// Several names contain the query
    Ambiguous(Vec<&'a str>),
    Missing,
}

/// Ordered index from display names to values
#[derive(Debug, Clone)]
pub struct NameIndex<V> {
    entries: Vec<(String, String, V)>,
}

impl<V> Default for NameIndex<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> NameIndex<V> {
    /// Build an index, keeping insertion order for completion and display
    pub fn new(items: impl IntoIterator<Item = (String, V)>) -> Self {
        let entries = items
            .into_iter()
            .map(|(name, value)| (normalize(&name), name, value))
            .collect();
        Self { entries }
    }

    /// Display names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name, _)| name.as_str())
    }

    /// Exact (normalized) lookup
    pub fn get(&self, query: &str) -> Option<&V> {
        let key = normalize(query);
        self.entries
            .iter()
            .find(|(norm, _, _)| *norm == key)
            .map(|(_, _, value)| value)
    }

    /// Exact lookup, falling back to a unique substring match
    pub fn resolve(&self, query: &str) -> Resolved<'_, V> {
        let key = normalize(query);
        if key.is_empty() {
            return Resolved::Missing;
        }
        if let Some(value) = self.get(query) {
            return Resolved::Exact(value);
        }
        let partial: Vec<_> = self
            .entries
            .iter()
            .filter(|(norm, _, _)| norm.contains(&key))
            .collect();
        match partial.as_slice() {
            [] => Resolved::Missing,
            [(_, _, value)] => Resolved::Partial(value),
            many => Resolved::Ambiguous(many.iter().map(|(_, name, _)| name.as_str()).collect()),
        }
    }

    /// Completion candidates for a partially typed name.
    ///
    /// Prefix matches come first; when there are none, names containing the
    /// input are offered instead. An empty input lists every name.
    pub fn complete(&self, partial: &str) -> Vec<&str> {
        let key = normalize(partial);
        let prefixed: Vec<&str> = self
            .entries
            .iter()
            .filter(|(norm, _, _)| norm.starts_with(&key))
            .map(|(_, name, _)| name.as_str())
            .collect();
        if !prefixed.is_empty() {
            return prefixed;
        }
        self.entries
            .iter()
            .filter(|(norm, _, _)| norm.contains(&key))
            .map(|(_, name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> NameIndex<u32> {
        NameIndex::new(vec![
            ("Inbox".to_string(), 1),
            ("Doing".to_string(), 2),
            ("Done  Today".to_string(), 3),
            ("Waiting On".to_string(), 4),
        ])
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Done   Today "), "done today");
    }

    #[test]
    fn test_exact_lookup_ignores_case_and_spacing() {
        assert_eq!(index().get("done today"), Some(&3));
        assert_eq!(index().get("INBOX"), Some(&1));
        assert_eq!(index().get("inbo"), None);
    }

    #[test]
    fn test_resolve_partial_and_ambiguous() {
        let idx = index();
        assert_eq!(idx.resolve("wait"), Resolved::Partial(&4));
        assert_eq!(idx.resolve("Doing"), Resolved::Exact(&2));
        match idx.resolve("do") {
            Resolved::Ambiguous(names) => assert_eq!(names, vec!["Doing", "Done  Today"]),
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert_eq!(idx.resolve("nothing"), Resolved::Missing);
        assert_eq!(idx.resolve("   "), Resolved::Missing);
    }

    #[test]
    fn test_complete_prefers_prefix() {
        let idx = index();
        assert_eq!(idx.complete("do"), vec!["Doing", "Done  Today"]);
        assert_eq!(idx.complete("on"), vec!["Done  Today", "Waiting On"]);
        assert_eq!(idx.complete("").len(), 4);
        assert!(idx.complete("zzz").is_empty());
    }
}
