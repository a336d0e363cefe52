//! Dynamic fan-out with a full join barrier.
//!
//! [`FanOutReducer`] spawns one task per query, waits for every task to reach a
//! terminal state and concatenates their outputs. The reducer loop is the only
//! writer of the accumulation: each task hands back its complete output as one
//! value through the [`JoinSet`], so batches are appended whole and never
//! interleave.

use crate::types::{AppError, Query, Result};
use std::collections::HashMap;
use std::future::Future;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Outcome counts from one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutStats {
    pub branches: usize,
    /// Branches that returned at least one item
    pub productive: usize,
    /// Branches that returned nothing
    pub empty: usize,
    /// Branches that panicked or were aborted
    pub crashed: usize,
    /// Queries of the crashed branches, in the order they were reaped
    pub crashed_queries: Vec<Query>,
}

#[derive(Debug, Default)]
pub struct FanOutReducer;

impl FanOutReducer {
    pub fn new() -> Self {
        Self
    }

    /// Run `branch` once per query, concurrently, and collect every output.
    ///
    /// Returns only after all branches finished. A branch that panics
    /// contributes nothing and is logged. If `cancel` fires first, all
    /// in-flight branches are aborted, nothing further is merged and
    /// [`AppError::Cancelled`] is returned.
    ///
    /// The order of items across branches follows completion order; the
    /// multiset of items does not depend on it.
    pub async fn run<T, F, Fut>(
        &self,
        queries: &[Query],
        branch: F,
        cancel: &CancellationToken,
    ) -> Result<(Vec<T>, FanOutStats)>
    where
        T: Send + 'static,
        F: Fn(Query) -> Fut,
        Fut: Future<Output = Vec<T>> + Send + 'static,
    {
        let mut stats = FanOutStats {
            branches: queries.len(),
            ..FanOutStats::default()
        };

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled("run cancelled before research started".to_string()));
        }

        let mut set = JoinSet::new();
        let mut spawned: HashMap<task::Id, (usize, Query)> = HashMap::with_capacity(queries.len());
        for (index, query) in queries.iter().enumerate() {
            let span = info_span!("research_branch", index, query = %query);
            let work = branch(query.clone());
            let handle = set.spawn(work.instrument(span));
            spawned.insert(handle.id(), (index, query.clone()));
        }
        info!(branches = queries.len(), "Research branches spawned");

        let mut accumulated = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    set.abort_all();
                    while set.join_next().await.is_some() {}
                    warn!(merged = accumulated.len(), "Research cancelled, discarding in-flight branches");
                    return Err(AppError::Cancelled("run cancelled during research".to_string()));
                }
                joined = set.join_next_with_id() => match joined {
                    None => break,
                    Some(Ok((id, batch))) => {
                        let index = spawned.remove(&id).map(|(index, _)| index).unwrap_or_default();
                        if batch.is_empty() {
                            stats.empty += 1;
                            debug!(index, "Branch finished with no results");
                        } else {
                            stats.productive += 1;
                            debug!(index, items = batch.len(), "Branch finished");
                        }
                        accumulated.extend(batch);
                    }
                    Some(Err(e)) => {
                        let (index, query) = spawned.remove(&e.id()).unwrap_or_default();
                        let failure = AppError::BranchFailure {
                            query: query.clone(),
                            reason: e.to_string(),
                        };
                        warn!(index, error = %failure, "Research branch crashed");
                        stats.crashed += 1;
                        stats.crashed_queries.push(query);
                    }
                },
            }
        }

        info!(
            branches = stats.branches,
            productive = stats.productive,
            empty = stats.empty,
            crashed = stats.crashed,
            items = accumulated.len(),
            "Research barrier released"
        );

        Ok((accumulated, stats))
    }
}
