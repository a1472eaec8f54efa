// Builds the branch set for a decision, spreads it over the worker pool and
// gathers the futures.

use std::time::Instant;

use crate::board::AxisBias;
use crate::game_state::GameState;
use crate::rules::Ruleset;
use crate::simulator::{AlgorithmBranch, Future};
use crate::strategy::{BranchId, PrefixedStrategy};
use crate::worker_pool::WorkerPool;

/// Cross product of self strategies, opponent strategies, both sides'
/// prefixes (each including "no prefix") and both biases.
pub fn build_branches<F>(
    mine: &[PrefixedStrategy],
    theirs: &[PrefixedStrategy],
    mut next_id: F,
) -> Vec<AlgorithmBranch>
where
    F: FnMut() -> BranchId,
{
    let mut branches = Vec::new();
    for (strategy_index, my_side) in mine.iter().enumerate() {
        let my_prefixes = my_side.all_prefixes();
        for their_side in theirs {
            let their_prefixes = their_side.all_prefixes();
            for my_prefix in &my_prefixes {
                for their_prefix in &their_prefixes {
                    for bias in AxisBias::all().iter() {
                        branches.push(AlgorithmBranch {
                            id: next_id(),
                            mine: my_side.strategy.clone(),
                            theirs: their_side.strategy.clone(),
                            my_prefix: my_prefix.clone(),
                            their_prefix: their_prefix.clone(),
                            bias: *bias,
                            strategy_index,
                        });
                    }
                }
            }
        }
    }
    branches
}

/// Deals branches to `workers` buckets like cards
pub fn distribute_round_robin(
    branches: Vec<AlgorithmBranch>,
    workers: usize,
) -> Vec<Vec<AlgorithmBranch>> {
    let workers = workers.max(1);
    let mut buckets: Vec<Vec<AlgorithmBranch>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, branch) in branches.into_iter().enumerate() {
        buckets[i % workers].push(branch);
    }
    buckets
}

/// Simulates every branch of the plan against `state` and returns one future
/// per branch, in no particular order.
pub fn simulate_futures(
    pool: &WorkerPool,
    state: &GameState,
    mine: &[PrefixedStrategy],
    theirs: &[PrefixedStrategy],
    rules: Ruleset,
    max_turns: u32,
    deadline: Instant,
) -> Vec<Future> {
    let branches = build_branches(mine, theirs, || pool.next_branch_id());
    log::debug!(
        "Simulating {} branches on {} workers",
        branches.len(),
        pool.size()
    );
    let batches = distribute_round_robin(branches, pool.size());
    pool.execute(batches, state.world(), rules, max_turns, deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::strategies::{Hungry, TailChaser};
    use std::sync::Arc;

    #[test]
    fn test_branch_count_is_the_full_cross_product() {
        let mine = vec![
            PrefixedStrategy::with_prefixes(
                Arc::new(TailChaser),
                vec![vec![Direction::Up], vec![Direction::Down]],
            ),
            PrefixedStrategy::new(Arc::new(Hungry)),
        ];
        let theirs = vec![PrefixedStrategy::with_prefixes(
            Arc::new(Hungry),
            vec![vec![Direction::Left]],
        )];
        let mut id = 0;
        let branches = build_branches(&mine, &theirs, || {
            id += 1;
            id
        });

        // (3 + 1) self prefixes x 2 opponent prefixes x 2 biases
        assert_eq!(branches.len(), 16);
        let mut ids: Vec<_> = branches.iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(branches.iter().filter(|b| b.strategy_index == 1).count(), 4);
    }

    #[test]
    fn test_round_robin_spreads_evenly() {
        let mine = vec![PrefixedStrategy::with_prefixes(
            Arc::new(TailChaser),
            vec![vec![Direction::Up], vec![Direction::Down], vec![Direction::Left]],
        )];
        let theirs = vec![PrefixedStrategy::new(Arc::new(Hungry))];
        let mut id = 0;
        let branches = build_branches(&mine, &theirs, || {
            id += 1;
            id
        });
        assert_eq!(branches.len(), 8);

        let buckets = distribute_round_robin(branches, 3);
        let sizes: Vec<usize> = buckets.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2]);
    }
}
