// Strategy contract: anything that can pick a move for the state's self snake
//
// Strategies are shared between worker threads behind `Arc<dyn Strategy>` and
// are called concurrently from many branches, so any memory they keep must be
// keyed by `BranchId` and synchronised.

use std::sync::Arc;

use crate::board::Direction;
use crate::game_state::GameState;

/// Identifies one simulated branch for the lifetime of the process
pub type BranchId = u64;

pub trait Strategy: Send + Sync {
    /// Short name used in logs and in the branch source of a future
    fn name(&self) -> &str;

    /// Move for the self snake of `state`
    fn next_move(&self, state: &GameState) -> Direction;

    /// Move inside a particular branch. Strategies that remember something
    /// about a branch override this; the rest behave as `next_move`.
    fn next_move_in_branch(&self, state: &GameState, _branch: BranchId) -> Direction {
        self.next_move(state)
    }
}

/// A strategy plus the forced opening sequences it should also be tried with.
/// The empty "no prefix" case is always simulated and is not listed here.
#[derive(Clone)]
pub struct PrefixedStrategy {
    pub strategy: Arc<dyn Strategy>,
    pub prefixes: Vec<Vec<Direction>>,
}

impl PrefixedStrategy {
    pub fn new(strategy: Arc<dyn Strategy>) -> Self {
        PrefixedStrategy {
            strategy,
            prefixes: Vec::new(),
        }
    }

    pub fn with_prefixes(strategy: Arc<dyn Strategy>, prefixes: Vec<Vec<Direction>>) -> Self {
        PrefixedStrategy { strategy, prefixes }
    }

    /// The prefixes to simulate, starting with the empty one
    pub fn all_prefixes(&self) -> Vec<Vec<Direction>> {
        std::iter::once(Vec::new())
            .chain(self.prefixes.iter().cloned())
            .collect()
    }
}

/// What to simulate for one decision
#[derive(Clone)]
pub struct StrategyPlan {
    pub mine: Vec<PrefixedStrategy>,
    pub theirs: Vec<PrefixedStrategy>,
    /// Its move on the current state earns the scorer's tie-break bonus
    pub preferred: Option<Arc<dyn Strategy>>,
}

/// Chooses the strategy plan for a state
pub trait StrategySelector {
    fn select(&self, state: &GameState) -> StrategyPlan;
}

impl<F> StrategySelector for F
where
    F: Fn(&GameState) -> StrategyPlan,
{
    fn select(&self, state: &GameState) -> StrategyPlan {
        self(state)
    }
}
