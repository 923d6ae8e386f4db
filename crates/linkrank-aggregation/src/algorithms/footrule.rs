//! Scaled-footrule rank aggregation
//!
//! For source rankings `s` over a union `C` of `n` items, the distance of a
//! candidate assignment `p` of final positions is
//!
//! ```text
//! Σ_s Σ_{c ∈ C} | t_s(c)/|s|  -  (t_s(c) == 0 ? 0 : p(c)/n) |
//! ```
//!
//! where `t_s(c)` is the 1-based position of `c` in `s`, or 0 when `s` does
//! not rank `c`. An unranked item therefore contributes nothing for that
//! source, whatever position it is given. Empty sources contribute nothing.

use super::exhaustive::ExhaustiveSolver;
use crate::common::{
    AggregationConfig, AggregationError, AggregationOutcome, AggregationResult,
    CancellationToken, PermutationProblem, Ranking, UnionSet, MAX_SEARCHABLE_ITEMS,
};
use ndarray::Array2;
use tracing::debug;

/// Term of one (source, item) pair for final position `position` out of `n`
fn deviation(ranking: &Ranking, item: &str, position: usize, n: usize) -> f64 {
    let t = ranking.position_of(item);
    let scaled = t as f64 / ranking.len() as f64;
    let proposed = if t == 0 {
        0.0
    } else {
        position as f64 / n as f64
    };
    (scaled - proposed).abs()
}

/// Distance of `positions` computed straight from the formula.
///
/// `positions[i]` is the final position (1-based) of `union.items()[i]`.
pub fn scaled_footrule_distance(
    rankings: &[Ranking],
    union: &UnionSet,
    positions: &[usize],
) -> f64 {
    let n = union.len();
    let mut distance = 0.0;
    for ranking in rankings.iter().filter(|r| !r.is_empty()) {
        for (item, &position) in union.items().iter().zip(positions) {
            distance += deviation(ranking, item, position, n);
        }
    }
    distance
}

/// Footrule distance as a permutation problem.
///
/// Every item's contribution only depends on the position it is given, so
/// the per-source sums are folded into an `n x n` table up front and a
/// candidate costs `n` lookups regardless of the number of sources.
#[derive(Debug, Clone)]
pub struct FootruleProblem {
    /// `table[[c, k]]`: contribution of item `c` placed at position `k + 1`
    table: Array2<f64>,
}

impl FootruleProblem {
    pub fn new(rankings: &[Ranking], union: &UnionSet) -> AggregationOutcome<Self> {
        let n = union.len();
        let failure = || AggregationError::AllocationFailure { items: n };

        let len = n.checked_mul(n).ok_or_else(failure)?;
        let mut buffer: Vec<f64> = Vec::new();
        buffer.try_reserve_exact(len).map_err(|_| failure())?;
        buffer.resize(len, 0.0);
        let mut table = Array2::from_shape_vec((n, n), buffer).map_err(|_| failure())?;

        for ranking in rankings.iter().filter(|r| !r.is_empty()) {
            for (c, item) in union.items().iter().enumerate() {
                for k in 0..n {
                    table[[c, k]] += deviation(ranking, item, k + 1, n);
                }
            }
        }

        Ok(Self { table })
    }
}

impl PermutationProblem for FootruleProblem {
    fn size(&self) -> usize {
        self.table.nrows()
    }

    fn cost(&self, positions: &[usize]) -> f64 {
        positions
            .iter()
            .enumerate()
            .map(|(c, &p)| self.table[[c, p - 1]])
            .sum()
    }
}

/// Merges several rankings into the one with minimal scaled-footrule distance.
///
/// The search is exhaustive (`n!` candidates), so it is only usable for small
/// item universes; anything above `max_items` is rejected before searching.
pub struct ScaledFootruleAggregator {
    pub config: AggregationConfig,
    cancellation: CancellationToken,
}

impl ScaledFootruleAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn aggregate(&self, rankings: &[Ranking]) -> AggregationOutcome<AggregationResult> {
        if rankings.is_empty() {
            return Err(AggregationError::EmptyInput);
        }

        let union = UnionSet::from_rankings(rankings);
        if union.is_empty() {
            return Err(AggregationError::EmptyInput);
        }

        let limit = self.config.max_items.min(MAX_SEARCHABLE_ITEMS);
        if union.len() > limit {
            return Err(AggregationError::ItemUniverseTooLarge {
                items: union.len(),
                limit,
            });
        }

        debug!(
            sources = rankings.len(),
            items = union.len(),
            "aggregating rankings"
        );

        let problem = FootruleProblem::new(rankings, &union)?;
        let search = ExhaustiveSolver::new(self.config.clone())
            .with_cancellation(self.cancellation.clone())
            .solve(&problem)?;

        let mut ordering = vec![String::new(); union.len()];
        for (item, &position) in union.items().iter().zip(&search.best_positions) {
            ordering[position - 1] = item.clone();
        }

        Ok(AggregationResult {
            positions: search.best_positions,
            ordering,
            distance: search.best_cost,
            candidates_evaluated: search.evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rankings() -> Vec<Ranking> {
        vec![
            Ranking::from_items(["a", "b", "c"]),
            Ranking::from_items(["c"]),
            Ranking::from_items(["b", "d"]),
        ]
    }

    #[test]
    fn test_table_matches_formula() {
        let rankings = rankings();
        let union = UnionSet::from_rankings(&rankings);
        let problem = FootruleProblem::new(&rankings, &union).unwrap();

        for positions in [
            vec![1, 2, 3, 4],
            vec![4, 3, 2, 1],
            vec![2, 4, 1, 3],
            vec![1, 2, 4, 3],
        ] {
            let direct = scaled_footrule_distance(&rankings, &union, &positions);
            assert!((problem.cost(&positions) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unranked_items_cost_nothing() {
        // Each item is ranked by a single source; the other source adds
        // nothing for it wherever it is placed.
        let rankings = vec![Ranking::from_items(["a"]), Ranking::from_items(["d"])];
        let union = UnionSet::from_rankings(&rankings);
        // a -> 1, d -> 2: |1 - 1/2| + |1 - 2/2|
        assert_eq!(scaled_footrule_distance(&rankings, &union, &[1, 2]), 0.5);
        // a -> 2, d -> 1: |1 - 2/2| + |1 - 1/2|
        assert_eq!(scaled_footrule_distance(&rankings, &union, &[2, 1]), 0.5);
    }

    #[test]
    fn test_empty_sources_are_ignored() {
        let with_empty = vec![
            Ranking::from_items(["x", "y"]),
            Ranking::from_items(Vec::<String>::new()),
        ];
        let union = UnionSet::from_rankings(&with_empty);
        let distance = scaled_footrule_distance(&with_empty, &union, &[1, 2]);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn test_unique_minimiser() {
        let result = ScaledFootruleAggregator::new(AggregationConfig::default())
            .aggregate(&rankings())
            .unwrap();
        assert_eq!(result.ordering, vec!["a", "b", "d", "c"]);
        assert_eq!(result.positions, vec![1, 2, 4, 3]);
        assert!((result.distance - 0.5).abs() < 1e-12);
        assert_eq!(result.candidates_evaluated, 24);
    }

    #[test]
    fn test_limit_never_exceeds_searchable_items() {
        let items: Vec<String> = (0..21).map(|i| format!("item{}", i)).collect();
        let config = AggregationConfig {
            max_items: 100,
            ..AggregationConfig::default()
        };
        let err = ScaledFootruleAggregator::new(config)
            .aggregate(&[Ranking::new("big", items)])
            .unwrap_err();
        assert_eq!(
            err,
            AggregationError::ItemUniverseTooLarge {
                items: 21,
                limit: MAX_SEARCHABLE_ITEMS
            }
        );
    }
}
