#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Submission histories and their commits.
pub mod history;
/// Lateness penalties.
pub mod penalty;
/// Selection of the best evaluation among cut times.
pub mod selector;

pub use history::{Commit, CommitHistory, History};
pub use penalty::{LatenessPenalizer, LinearPenalizer, NoPenalty, human_duration};
pub use selector::{
    LATENESS, MAIN, SnapshotGrader, TimeCappedSelector, capping_criterion, cut_times,
};
