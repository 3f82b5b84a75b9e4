//! # gradebook
//!
//! Computes grades by folding trees of marks against grading rulebooks, and
//! picks the best evaluation of a submission among snapshots of its history
//! taken around a deadline.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Concurrent grading of independent submissions
pub mod batch;
/// Deadline handling: cut times, lateness penalties and best-cut selection
pub mod capping;
/// Environment-driven configuration
pub mod config;
/// A rulebook applied to many students' marks
pub mod exam;
/// For all things related to grading: marks, rulebooks and their evaluation
pub mod grade;

pub use grade::{
    AggregationError, CriteriaPath, Criterion, Grade, GradeAggregator, Mark, MarkAggregator,
    MarksTree,
};
