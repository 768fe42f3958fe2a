use std::collections::BTreeMap;

/// Per-sequence kinase hits.
///
/// Only kinases that matched are present; a missing kinase counts as zero.
/// Counts are 0 or 1 since the matcher stops at the first matching rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult<'t> {
    counts: BTreeMap<&'t str, u32>,
}

impl<'t> MatchResult<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self, kinase: &'t str) {
        self.counts.insert(kinase, 1);
    }

    pub fn count(&self, kinase: &str) -> u32 {
        self.counts.get(kinase).copied().unwrap_or(0)
    }

    pub fn contains(&self, kinase: &str) -> bool {
        self.counts.contains_key(kinase)
    }

    /// Matched kinases in lexicographic order, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&'t str, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
