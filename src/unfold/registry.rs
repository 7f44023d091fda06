//! 副本计数器：为每个原始库所/迁移名分配单调递增的副本序号。
use indexmap::IndexMap;

/// Hands out `<original>(<k>)` names, `k` counting from 1 per original name.
///
/// Counters only grow. One registry belongs to one unfolding run, so names
/// never leak between runs.
#[derive(Debug, Clone, Default)]
pub struct DuplicateRegistry {
    counters: IndexMap<String, u32>,
}

impl DuplicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the counter of `original` and returns `(index, display_name)`.
    pub fn next_duplicate(&mut self, original: &str) -> (u32, String) {
        let counter = self.counters.entry(original.to_owned()).or_insert(0);
        *counter += 1;
        let index = *counter;
        (index, format!("{original}({index})"))
    }

    /// Number of duplicates issued so far for `original`.
    pub fn issued(&self, original: &str) -> u32 {
        self.counters.get(original).copied().unwrap_or(0)
    }

    pub fn total_issued(&self) -> u64 {
        self.counters.values().map(|&count| u64::from(count)).sum()
    }

    /// Originals with at least one duplicate, in first-duplication order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counters
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn indices_start_at_one_and_increase() {
        let mut registry = DuplicateRegistry::new();
        assert_eq!(registry.issued("p1"), 0);
        assert_eq!(registry.next_duplicate("p1"), (1, "p1(1)".to_string()));
        assert_eq!(registry.next_duplicate("p1"), (2, "p1(2)".to_string()));
        assert_eq!(registry.next_duplicate("t3"), (1, "t3(1)".to_string()));
        assert_eq!(registry.issued("p1"), 2);
        assert_eq!(registry.total_issued(), 3);
    }

    #[test]
    fn names_are_unique_across_originals() {
        let mut registry = DuplicateRegistry::new();
        let mut seen = HashSet::new();
        let mut last = IndexMap::new();
        for round in 0..20 {
            for original in ["p1", "p2", "p12", "t1"] {
                if round % 3 == 0 && original == "p2" {
                    continue;
                }
                let (index, name) = registry.next_duplicate(original);
                assert!(seen.insert(name), "duplicate name issued");
                let previous = last.insert(original, index).unwrap_or(0);
                assert!(index > previous);
            }
        }
        assert_eq!(
            registry.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["p1", "p12", "t1", "p2"]
        );
    }
}
