#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use typed_builder::TypedBuilder;

use super::{
    history::{Commit, History},
    penalty::{LatenessPenalizer, LinearPenalizer},
};
use crate::{
    config,
    grade::{AggregationError, Criterion, Grade, GradeAggregator, Mark, MarksTree},
};

/// Criterion of the snapshot's own grade under every cut.
pub const MAIN: &str = "main";

/// Criterion of the lateness penalty under every cut.
pub const LATENESS: &str = "lateness";

/// Grades one snapshot of a submission. Failures inside (compilation,
/// crashes, timeouts...) must already be folded into the returned marks.
pub trait SnapshotGrader<H> {
    /// Marks deserved by `snapshot`.
    fn grade(&self, snapshot: &H) -> MarksTree;
}

impl<H, F> SnapshotGrader<H> for F
where
    F: Fn(&H) -> MarksTree,
{
    fn grade(&self, snapshot: &H) -> MarksTree {
        self(snapshot)
    }
}

/// Label of the branch holding the evaluation capped at `cap`.
pub fn capping_criterion(cap: DateTime<Utc>) -> Criterion {
    Criterion::new(format!(
        "Capping at {}",
        cap.to_rfc3339_opts(SecondsFormat::Millis, true)
    ))
}

/// Cut times worth evaluating: the latest timestamp at or before the
/// deadline (the deadline itself if there is none), then every later one,
/// in increasing order.
///
/// Earlier on-time timestamps are skipped: with no penalty before the
/// deadline, the last on-time snapshot carries all the evidence they do.
pub fn cut_times<I>(timestamps: I, deadline: DateTime<Utc>) -> Vec<DateTime<Utc>>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let all: BTreeSet<DateTime<Utc>> = timestamps.into_iter().collect();
    let last_on_time = all
        .range(..=deadline)
        .next_back()
        .copied()
        .unwrap_or(deadline);
    std::iter::once(last_on_time)
        .chain(all.into_iter().filter(|t| *t > deadline))
        .collect()
}

#[derive(Debug, TypedBuilder)]
#[builder(doc)]
/// Evaluates a submission's history at several cut times around a deadline
/// and keeps the best penalized result, with every attempt left in the tree
/// for audit.
pub struct TimeCappedSelector<P> {
    /// * `deadline`: submissions available at or before it are on time
    deadline:         DateTime<Utc>,
    /// * `penalizer`: fraction of credit kept for a given lateness
    penalizer:        P,
    /// * `platform_authors`: identities of automated accounts whose commits
    ///   before the first human commit are ignored
    #[builder(default, setter(into))]
    platform_authors: Vec<String>,
}

impl TimeCappedSelector<LinearPenalizer> {
    /// A selector for `deadline` using the configured penalty window and
    /// platform identities.
    pub fn from_config(deadline: DateTime<Utc>) -> anyhow::Result<Self> {
        let config = config::ensure_initialized()?;
        Ok(Self {
            deadline,
            penalizer: LinearPenalizer::new(config.penalty_window())?,
            platform_authors: config.platform_authors().to_vec(),
        })
    }
}

impl<P: LatenessPenalizer> TimeCappedSelector<P> {
    /// The deadline.
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns `true` if `commit` was authored by an automated account.
    fn is_platform(&self, commit: &Commit) -> bool {
        self.platform_authors.iter().any(|a| *a == commit.author)
    }

    /// Commits authored by an automated account before the first human
    /// commit, oldest first.
    pub fn platform_noise<H: History>(&self, history: &H) -> Vec<Commit> {
        let first_human = history
            .commits()
            .into_iter()
            .filter(|c| !self.is_platform(c))
            .map(|c| c.committed_at)
            .min();
        let mut noise: Vec<Commit> = history
            .commits()
            .into_iter()
            .filter(|c| self.is_platform(c))
            .filter(|c| first_human.is_none_or(|first| c.committed_at < first))
            .cloned()
            .collect();
        noise.sort_by_key(|c| c.committed_at);
        noise
    }

    /// The marks tree of `history`: one branch per cut time, each holding the
    /// snapshot's grade under [`MAIN`] and its lateness penalty under
    /// [`LATENESS`]. An empty history yields a single zero mark.
    pub fn marks<H, G>(&self, history: &H, grader: &G) -> Result<MarksTree, AggregationError>
    where
        H: History,
        G: SnapshotGrader<H>,
    {
        let noise = self.platform_noise(history);
        let note = if noise.is_empty() {
            None
        } else {
            tracing::info!(
                "Ignoring {} platform commit(s) before the first human one",
                noise.len()
            );
            Some(format!(
                "Ignored commit(s) by {} before the first human commit: {}",
                noise.iter().map(|c| c.author.as_str()).unique().sorted().join(", "),
                noise.iter().map(|c| c.id.as_str()).join(", ")
            ))
        };
        let ignored: Vec<&str> = noise.iter().map(|c| c.id.as_str()).collect();
        let history = history.filtered(&|c| !ignored.contains(&c.id.as_str()));

        if history.is_empty() {
            let comment = match &note {
                Some(note) => format!("No commit found. {note}"),
                None => "No commit found".to_string(),
            };
            return Ok(MarksTree::mark(Mark::zero(comment)));
        }

        let timestamps: Vec<DateTime<Utc>> = history
            .commits()
            .into_iter()
            .flat_map(Commit::timestamps)
            .collect();
        let cuts = cut_times(timestamps, self.deadline);
        tracing::info!("Evaluating {} cut time(s) around {}", cuts.len(), self.deadline);

        let mut branches = Vec::with_capacity(cuts.len());
        for cap in cuts {
            let snapshot = history.capped_at(cap);
            let main = grader.grade(&snapshot);
            let lateness = cap - self.deadline;
            let mut penalty = self.penalizer.penalty(lateness);
            if let Some(note) = &note {
                let comment = if penalty.comment().is_empty() {
                    note.clone()
                } else {
                    format!("{}. {note}", penalty.comment())
                };
                penalty = penalty.with_comment(comment);
            }
            tracing::debug!("Cut at {cap}: lateness {lateness}, kept {}", penalty.points());
            branches.push((
                capping_criterion(cap),
                MarksTree::composite([(MAIN, main), (LATENESS, MarksTree::mark(penalty))])?,
            ));
        }
        MarksTree::composite(branches)
    }

    /// The rulebook matching [`TimeCappedSelector::marks`]: the best cut wins,
    /// each cut's snapshot graded with `main_rules` and scaled by its
    /// penalty.
    pub fn rulebook(&self, main_rules: GradeAggregator) -> Result<GradeAggregator, AggregationError> {
        let per_cut =
            GradeAggregator::parametric(MAIN, LATENESS, main_rules, GradeAggregator::trivial())?;
        Ok(GradeAggregator::max(per_cut))
    }

    /// Marks `history` and folds the result with the matching rulebook.
    pub fn grade<H, G>(
        &self,
        history: &H,
        grader: &G,
        main_rules: GradeAggregator,
    ) -> Result<Grade, AggregationError>
    where
        H: History,
        G: SnapshotGrader<H>,
    {
        let marks = self.marks(history, grader)?;
        self.rulebook(main_rules)?.evaluate(&marks)
    }
}
