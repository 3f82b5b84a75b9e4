#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// A named slot in a marks tree or a rulebook. Two criteria are equal iff
/// they carry the same name.
pub struct Criterion {
    /// The name identifying this criterion.
    name: String,
}

impl Criterion {
    /// Creates a criterion with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name of this criterion.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Orders criteria the way a human reader would: case-insensitively first,
    /// falling back to the exact name so that the order stays total.
    pub fn collate(&self, other: &Criterion) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Criterion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Criterion {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
/// An immutable sequence of criteria leading from the root of a tree to one
/// of its nodes. The root itself is the empty path.
///
/// Serialized as the `/`-joined names of its criteria.
pub struct CriteriaPath {
    /// Criteria from the root downwards.
    criteria: Vec<Criterion>,
}

impl CriteriaPath {
    /// The empty path, designating the root of a tree.
    pub const ROOT: CriteriaPath = CriteriaPath {
        criteria: Vec::new(),
    };

    /// Builds a path from criteria listed from the root downwards.
    pub fn from_criteria<I, C>(criteria: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Criterion>,
    {
        Self {
            criteria: criteria.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of criteria in this path.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns `true` if this path is empty (the root path).
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// The first criterion of this path, if any.
    pub fn head(&self) -> Option<&Criterion> {
        self.criteria.first()
    }

    /// This path without its first criterion; the root path stays the root.
    pub fn tail(&self) -> CriteriaPath {
        Self {
            criteria: self.criteria.iter().skip(1).cloned().collect(),
        }
    }

    /// Returns a new path with `criterion` prepended.
    pub fn with_prefix(&self, criterion: Criterion) -> CriteriaPath {
        let mut criteria = Vec::with_capacity(self.criteria.len() + 1);
        criteria.push(criterion);
        criteria.extend(self.criteria.iter().cloned());
        Self { criteria }
    }

    /// Returns a new path with `criterion` appended.
    pub fn with_suffix(&self, criterion: Criterion) -> CriteriaPath {
        let mut criteria = self.criteria.clone();
        criteria.push(criterion);
        Self { criteria }
    }

    /// Iterates over the criteria of this path from the root downwards.
    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }
}

impl Display for CriteriaPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.criteria.iter().map(Criterion::name).join("/"))
    }
}

impl From<CriteriaPath> for String {
    fn from(value: CriteriaPath) -> Self {
        value.to_string()
    }
}

impl From<String> for CriteriaPath {
    fn from(value: String) -> Self {
        if value.is_empty() {
            return CriteriaPath::ROOT;
        }
        CriteriaPath::from_criteria(value.split('/'))
    }
}

impl FromStr for CriteriaPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CriteriaPath::from(s.to_string()))
    }
}

impl<'a> IntoIterator for &'a CriteriaPath {
    type IntoIter = std::slice::Iter<'a, Criterion>;
    type Item = &'a Criterion;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_and_tail_walk_the_path() {
        let path = CriteriaPath::from_criteria(["a", "b", "c"]);
        assert_eq!(path.head(), Some(&Criterion::new("a")));
        assert_eq!(path.tail(), CriteriaPath::from_criteria(["b", "c"]));
        assert_eq!(CriteriaPath::ROOT.tail(), CriteriaPath::ROOT);
        assert!(CriteriaPath::ROOT.head().is_none());
    }

    #[test]
    fn prefix_and_suffix_do_not_touch_the_original() {
        let path = CriteriaPath::from_criteria(["b"]);
        assert_eq!(path.with_prefix("a".into()).to_string(), "a/b");
        assert_eq!(path.with_suffix("c".into()).to_string(), "b/c");
        assert_eq!(path.to_string(), "b");
    }

    #[test]
    fn parses_slash_joined_names() {
        let path: CriteriaPath = "main/tests/compile".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(String::from(path), "main/tests/compile");
        assert!("".parse::<CriteriaPath>().unwrap().is_root());
    }

    #[test]
    fn collation_ignores_case_before_exact_order() {
        let lower = Criterion::new("alpha");
        let upper = Criterion::new("Beta");
        assert_eq!(lower.collate(&upper), Ordering::Less);
        assert_eq!(Criterion::new("B").collate(&Criterion::new("b")), Ordering::Less);
    }
}
