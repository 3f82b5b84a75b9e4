#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{criterion::Criterion, error::AggregationError};

#[derive(Clone, Debug)]
/// An immutable association list keyed by [`Criterion`].
///
/// Keys are distinct and keep their insertion order, which only matters for
/// display. Equality ignores that order, like two maps holding the same
/// entries.
pub struct CriterionMap<V> {
    /// Entries in insertion order.
    entries: Vec<(Criterion, V)>,
}

impl<V> CriterionMap<V> {
    /// An empty map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a map from the given entries, failing on a repeated criterion.
    pub fn try_from_entries<I>(entries: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (Criterion, V)>,
    {
        let mut map = Self::new();
        for (criterion, value) in entries {
            if map.contains(&criterion) {
                return Err(AggregationError::InvalidArgument(format!(
                    "criterion `{criterion}` appears more than once"
                )));
            }
            map.entries.push((criterion, value));
        }
        Ok(map)
    }

    /// Looks up the value associated to `criterion`.
    pub fn get(&self, criterion: &Criterion) -> Option<&V> {
        self.entries
            .iter()
            .find(|(c, _)| c == criterion)
            .map(|(_, v)| v)
    }

    /// Returns `true` if `criterion` is a key of this map.
    pub fn contains(&self, criterion: &Criterion) -> bool {
        self.get(criterion).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Criterion> {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Criterion, &V)> {
        self.entries.iter().map(|(c, v)| (c, v))
    }

    /// Applies `f` to every value, keeping keys and order.
    pub fn map_values<W>(&self, mut f: impl FnMut(&Criterion, &V) -> W) -> CriterionMap<W> {
        CriterionMap {
            entries: self
                .entries
                .iter()
                .map(|(c, v)| (c.clone(), f(c, v)))
                .collect(),
        }
    }

    /// Keeps only the entries satisfying `keep`.
    pub fn retain(mut self, mut keep: impl FnMut(&Criterion, &V) -> bool) -> Self {
        self.entries.retain(|(c, v)| keep(c, v));
        self
    }
}

impl<V> Default for CriterionMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for CriterionMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(c, v)| other.get(c).is_some_and(|o| o == v))
    }
}

impl<V: Eq> Eq for CriterionMap<V> {}

impl<V> IntoIterator for CriterionMap<V> {
    type IntoIter = std::vec::IntoIter<(Criterion, V)>;
    type Item = (Criterion, V);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
