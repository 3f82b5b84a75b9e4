#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{future::Future, time::Duration};

use futures::{StreamExt, stream};
use tokio::time::timeout;
use typed_builder::TypedBuilder;

use crate::{
    config,
    grade::{Mark, MarksTree},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
#[builder(doc)]
/// How a batch of submissions gets graded.
pub struct BatchOptions {
    /// * `concurrency`: how many submissions are graded at once
    #[builder(default = 4)]
    pub concurrency: usize,
    /// * `timeout`: time limit for one invocation of submitted code
    #[builder(default = Duration::from_secs(60))]
    pub timeout:     Duration,
}

impl BatchOptions {
    /// Options taken from the global configuration.
    pub fn from_config() -> anyhow::Result<Self> {
        let config = config::ensure_initialized()?;
        Ok(Self {
            concurrency: config.batch_concurrency(),
            timeout:     config.invocation_timeout(),
        })
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Runs one invocation of submitted code under `limit`.
///
/// Errors and timeouts are ordinary grading outcomes here: they become a
/// zero mark carrying their description, so that sibling criteria and other
/// submissions are graded regardless.
pub async fn guard_invocation<F>(limit: Duration, invocation: F) -> MarksTree
where
    F: Future<Output = anyhow::Result<MarksTree>>,
{
    match timeout(limit, invocation).await {
        Ok(Ok(marks)) => marks,
        Ok(Err(e)) => {
            tracing::warn!("Invocation failed: {e:#}");
            MarksTree::mark(Mark::zero(format!("{e:#}")))
        }
        Err(_) => {
            tracing::warn!("Invocation timed out after {limit:?}");
            MarksTree::mark(Mark::zero(format!("Timed out after {limit:?}")))
        }
    }
}

/// Grades independent submissions, at most `options.concurrency` at a time.
///
/// Returns one result per item, in input order. A failing item never affects
/// the others.
pub async fn grade_batch<K, T, I, F, Fut>(
    items: I,
    options: &BatchOptions,
    grade: F,
) -> Vec<(K, anyhow::Result<T>)>
where
    I: IntoIterator<Item = K>,
    K: Clone,
    F: Fn(K) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut results: Vec<(usize, K, anyhow::Result<T>)> =
        stream::iter(items.into_iter().enumerate().map(|(index, item)| {
            let pending = grade(item.clone());
            async move { (index, item, pending.await) }
        }))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(index, ..)| *index);
    let failures = results.iter().filter(|(_, _, r)| r.is_err()).count();
    if failures > 0 {
        tracing::warn!("{failures} of {} submission(s) could not be graded", results.len());
    } else {
        tracing::info!("Graded {} submission(s)", results.len());
    }
    results
        .into_iter()
        .map(|(_, item, result)| (item, result))
        .collect()
}
