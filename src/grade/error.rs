#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;

use super::criterion::{CriteriaPath, Criterion};

/// Errors raised while building or applying grading rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// An aggregator was handed a set of criteria it does not accept.
    #[error("{variant} rejects criteria {{{}}}: {reason}", .criteria.iter().join(", "))]
    Rejected {
        /// The aggregator variant that rejected the set.
        variant:  &'static str,
        /// The rejected criteria.
        criteria: Vec<Criterion>,
        /// Why the set was rejected.
        reason:   String,
    },
    /// A marks tree does not fit the rulebook at the given node.
    #[error("marks tree and rulebook disagree at `{path}`: {source}")]
    Incompatible {
        /// Path of the offending node, from the root.
        path:   CriteriaPath,
        /// The rejection raised at that node.
        #[source]
        source: Box<AggregationError>,
    },
    /// A builder was called with malformed arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AggregationError {
    /// Shorthand for a [`AggregationError::Rejected`] error.
    pub(crate) fn rejected<'a, I>(variant: &'static str, criteria: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = &'a Criterion>,
    {
        AggregationError::Rejected {
            variant,
            criteria: criteria.into_iter().cloned().collect(),
            reason: reason.into(),
        }
    }

    /// Attaches the path of the node where this error was raised. Errors that
    /// already carry a path keep their deeper, more precise one.
    pub(crate) fn at(self, path: &CriteriaPath) -> Self {
        match self {
            AggregationError::Incompatible { .. } => self,
            other => AggregationError::Incompatible {
                path:   path.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Returns `true` for structural rejections, whether or not a path was
    /// attached.
    pub fn is_rejection(&self) -> bool {
        match self {
            AggregationError::Rejected { .. } => true,
            AggregationError::Incompatible { source, .. } => source.is_rejection(),
            AggregationError::InvalidArgument(_) => false,
        }
    }

    /// Path of the offending node, when known.
    pub fn path(&self) -> Option<&CriteriaPath> {
        match self {
            AggregationError::Incompatible { path, .. } => Some(path),
            _ => None,
        }
    }
}
