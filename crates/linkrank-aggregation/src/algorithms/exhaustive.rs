use super::heap::{factorial, HeapSwaps};
use crate::common::{
    AggregationConfig, AggregationError, AggregationOutcome, CancellationToken,
    PermutationProblem, SearchResult,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Candidates evaluated between two cancellation/deadline checks
const CHECK_INTERVAL: u64 = 1024;

/// Evaluates every permutation of final positions and keeps the cheapest.
///
/// Sequentially, candidates are visited in Heap's-algorithm order starting
/// from the identity, and ties keep the first candidate found. In parallel
/// mode the space is split by the position given to the first item; each
/// part is searched the same way and the parts are reduced in order, so the
/// result is deterministic but may break ties differently. A cancelled or
/// timed-out parallel search reports the candidates evaluated across all
/// parts.
pub struct ExhaustiveSolver {
    pub config: AggregationConfig,
    cancellation: CancellationToken,
}

struct Guard<'a> {
    token: &'a CancellationToken,
    deadline: Option<Instant>,
}

impl Guard<'_> {
    fn check(&self, evaluated: u64) -> AggregationOutcome<()> {
        if self.token.is_cancelled() {
            return Err(AggregationError::Cancelled { evaluated });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AggregationError::DeadlineExceeded { evaluated });
            }
        }
        Ok(())
    }
}

impl ExhaustiveSolver {
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Stop the search early when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn solve<P: PermutationProblem>(&self, problem: &P) -> AggregationOutcome<SearchResult> {
        let n = problem.size();
        let guard = Guard {
            token: &self.cancellation,
            deadline: self.config.timeout().map(|t| Instant::now() + t),
        };

        debug!(
            items = n,
            candidates = factorial(n),
            parallel = self.config.parallel,
            "starting exhaustive permutation search"
        );

        let result = if self.config.parallel && n > 1 {
            self.solve_parallel(problem, &guard)?
        } else {
            let mut positions: Vec<usize> = (1..=n).collect();
            search_from(problem, &mut positions, 0, &guard)?
        };

        info!(
            items = n,
            evaluated = result.evaluated,
            best_cost = result.best_cost,
            "permutation search finished"
        );
        Ok(result)
    }

    fn solve_parallel<P: PermutationProblem>(
        &self,
        problem: &P,
        guard: &Guard<'_>,
    ) -> AggregationOutcome<SearchResult> {
        let n = problem.size();

        // Every partition reports its own count, finished or not
        let searched = AtomicU64::new(0);
        let outcome = (1..=n)
            .into_par_iter()
            .map(|first| {
                let mut positions = Vec::with_capacity(n);
                positions.push(first);
                positions.extend((1..=n).filter(|&p| p != first));
                let outcome = search_from(problem, &mut positions, 1, guard);
                let local = match &outcome {
                    Ok(partition) => partition.evaluated,
                    Err(AggregationError::Cancelled { evaluated })
                    | Err(AggregationError::DeadlineExceeded { evaluated }) => *evaluated,
                    Err(_) => 0,
                };
                searched.fetch_add(local, Ordering::Relaxed);
                outcome
            })
            .collect::<AggregationOutcome<Vec<_>>>();

        let evaluated = searched.load(Ordering::Relaxed);
        let partitions = match outcome {
            Ok(partitions) => partitions,
            Err(AggregationError::Cancelled { .. }) => {
                return Err(AggregationError::Cancelled { evaluated })
            }
            Err(AggregationError::DeadlineExceeded { .. }) => {
                return Err(AggregationError::DeadlineExceeded { evaluated })
            }
            Err(e) => return Err(e),
        };

        let mut best: Option<SearchResult> = None;
        for partition in partitions {
            match &best {
                Some(current) if partition.best_cost >= current.best_cost => {}
                _ => best = Some(partition),
            }
        }

        // n > 1, so there is at least one partition
        let mut best = best.ok_or(AggregationError::EmptyInput)?;
        best.evaluated = evaluated;
        Ok(best)
    }
}

/// Search all orderings of `positions[fixed..]`, keeping the prefix as is.
fn search_from<P: PermutationProblem>(
    problem: &P,
    positions: &mut [usize],
    fixed: usize,
    guard: &Guard<'_>,
) -> AggregationOutcome<SearchResult> {
    guard.check(0)?;

    let mut best_cost = problem.cost(positions);
    let mut best_positions = positions.to_vec();
    let mut evaluated = 1u64;

    for (a, b) in HeapSwaps::new(positions.len() - fixed) {
        positions.swap(fixed + a, fixed + b);
        let cost = problem.cost(positions);
        evaluated += 1;

        if cost < best_cost {
            best_cost = cost;
            best_positions.copy_from_slice(positions);
        }
        if evaluated % CHECK_INTERVAL == 0 {
            guard.check(evaluated)?;
        }
    }

    Ok(SearchResult {
        best_positions,
        best_cost,
        evaluated,
    })
}
