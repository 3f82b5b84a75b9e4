#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Mark aggregators: weights for a set of sibling marks.
pub mod aggregator;
/// Flattened, tabular view of evaluated grades.
pub mod audit;
/// Criteria and paths of criteria.
pub mod criterion;
/// Errors raised by aggregators and rulebooks.
pub mod error;
/// Evaluation of marks trees against rulebooks.
pub mod evaluate;
/// Ordered association lists keyed by criterion.
pub mod map;
/// Leaf marks.
pub mod mark;
/// Trees of marks.
pub mod marks_tree;
/// Grading rulebooks.
pub mod rulebook;

pub use aggregator::{MarkAggregator, OwaWeighter, ParametricWeighter, StaticWeighter};
pub use audit::{AuditRow, audit_rows, audit_table};
pub use criterion::{CriteriaPath, Criterion};
pub use error::AggregationError;
pub use evaluate::{Grade, WeightedGrade};
pub use map::CriterionMap;
pub use mark::{Mark, SubMark};
pub use marks_tree::{MarksTree, SubTrees};
pub use rulebook::{GradeAggregator, RulebookKind};
