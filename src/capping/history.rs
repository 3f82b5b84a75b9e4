#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
/// Metadata of one commit in a submission's history.
pub struct Commit {
    /// * `id`: identifier of the commit, e.g. its hash
    #[builder(setter(into))]
    pub id:           String,
    /// * `author`: name of the identity that authored the commit
    #[builder(setter(into))]
    pub author:       String,
    /// * `committed_at`: authorship timestamp recorded in the commit
    pub committed_at: DateTime<Utc>,
    /// * `pushed_at`: when the commit reached the server, if known
    #[builder(default, setter(strip_option))]
    pub pushed_at:    Option<DateTime<Utc>>,
}

impl Commit {
    /// Every timestamp known for this commit.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        std::iter::once(self.committed_at).chain(self.pushed_at)
    }

    /// Instant from which the commit counts as submitted: it must have been
    /// both authored and delivered.
    pub fn available_at(&self) -> DateTime<Utc> {
        match self.pushed_at {
            Some(pushed) => pushed.max(self.committed_at),
            None => self.committed_at,
        }
    }
}

/// A submission's history, as provided by whatever retrieves it.
pub trait History: Sized {
    /// Every commit of this history, in no particular order.
    fn commits(&self) -> Vec<&Commit>;

    /// This history restricted to the commits available at or before `cap`.
    fn capped_at(&self, cap: DateTime<Utc>) -> Self;

    /// This history restricted to the commits satisfying `keep`.
    fn filtered(&self, keep: &dyn Fn(&Commit) -> bool) -> Self;

    /// Returns `true` if this history holds no commit.
    fn is_empty(&self) -> bool {
        self.commits().is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// An in-memory history: commits, each carrying whatever content graders
/// need (`T`).
pub struct CommitHistory<T> {
    /// Commits with their content, in insertion order.
    entries: Vec<(Commit, T)>,
}

impl<T: Clone> CommitHistory<T> {
    /// An empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns this history with one more commit.
    pub fn with(mut self, commit: Commit, content: T) -> Self {
        self.entries.push((commit, content));
        self
    }

    /// Commits with their content, in insertion order.
    pub fn entries(&self) -> &[(Commit, T)] {
        &self.entries
    }

    /// The most recently available commit, with its content.
    pub fn latest(&self) -> Option<(&Commit, &T)> {
        self.entries
            .iter()
            .max_by_key(|(c, _)| (c.available_at(), c.committed_at))
            .map(|(c, t)| (c, t))
    }
}

impl<T: Clone> FromIterator<(Commit, T)> for CommitHistory<T> {
    fn from_iter<I: IntoIterator<Item = (Commit, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Clone> History for CommitHistory<T> {
    fn commits(&self) -> Vec<&Commit> {
        self.entries.iter().map(|(c, _)| c).collect()
    }

    fn capped_at(&self, cap: DateTime<Utc>) -> Self {
        self.filtered(&|c| c.available_at() <= cap)
    }

    fn filtered(&self, keep: &dyn Fn(&Commit) -> bool) -> Self {
        self.entries
            .iter()
            .filter(|(c, _)| keep(c))
            .cloned()
            .collect()
    }
}
