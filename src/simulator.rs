// Branch simulation: plays one (self strategy, opponent strategy) pairing
// forward tick by tick and records what happened to whom and when.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::board::{AxisBias, Direction, World};
use crate::game_state::GameState;
use crate::rules::{Ruleset, SnakeMove};
use crate::simple_profiler::{Category, ProfileGuard};
use crate::strategy::{BranchId, Strategy};

/// Why a branch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
    Loss,
    MaxTurns,
    OutOfTime,
}

/// Where a future came from, for grouping and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchSource {
    pub strategy_index: usize,
    pub strategy_name: String,
    pub opponent_name: String,
    pub prefix: Vec<Direction>,
    pub bias: AxisBias,
}

/// One unit of simulation work
#[derive(Clone)]
pub struct AlgorithmBranch {
    pub id: BranchId,
    pub mine: Arc<dyn Strategy>,
    pub theirs: Arc<dyn Strategy>,
    pub my_prefix: Vec<Direction>,
    /// Forced opening applied to every opponent
    pub their_prefix: Vec<Direction>,
    pub bias: AxisBias,
    /// Index of `mine` in the self-side strategy list
    pub strategy_index: usize,
}

impl AlgorithmBranch {
    fn source(&self) -> BranchSource {
        BranchSource {
            strategy_index: self.strategy_index,
            strategy_name: self.mine.name().to_string(),
            opponent_name: self.theirs.name().to_string(),
            prefix: self.my_prefix.clone(),
            bias: self.bias,
        }
    }
}

/// Outcome of one branch
#[derive(Debug, Clone, Serialize)]
pub struct Future {
    /// Snake id -> tick it died on. Survivors are absent.
    pub obituaries: HashMap<String, u32>,
    /// Snake id -> ticks it ate on, ascending
    pub foods_eaten: HashMap<String, Vec<u32>>,
    pub termination_reason: TerminationReason,
    /// Self's move on the first tick; `None` if the branch never stepped
    pub first_move: Option<Direction>,
    pub turns: u32,
    pub source: BranchSource,
}

/// A branch in progress
pub struct Simulation<'a> {
    branch: &'a AlgorithmBranch,
    rules: Ruleset,
    state: GameState,
    turn: u32,
    first_move: Option<Direction>,
    obituaries: HashMap<String, u32>,
    foods_eaten: HashMap<String, Vec<u32>>,
    lost: bool,
}

impl<'a> Simulation<'a> {
    pub fn new(branch: &'a AlgorithmBranch, world: World, rules: Ruleset) -> Self {
        let state = GameState::with_bias(world, branch.bias);
        let lost = state.is_loss();
        Simulation {
            branch,
            rules,
            state,
            turn: 0,
            first_move: None,
            obituaries: HashMap::new(),
            foods_eaten: HashMap::new(),
            lost,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.lost
    }

    fn my_move(&self) -> Direction {
        match self.branch.my_prefix.get(self.turn as usize - 1) {
            Some(&d) => d,
            None => self.branch.mine.next_move_in_branch(&self.state, self.branch.id),
        }
    }

    fn their_move(&self, enemy: usize) -> Direction {
        match self.branch.their_prefix.get(self.turn as usize - 1) {
            Some(&d) => d,
            None => {
                let view = self.state.perspective(enemy, self.branch.bias);
                self.branch.theirs.next_move_in_branch(view, self.branch.id)
            }
        }
    }

    /// Advances one tick. Returns `true` once self is gone.
    pub fn step(&mut self) -> bool {
        if self.lost {
            return true;
        }
        let _guard = ProfileGuard::new(Category::BranchStep);

        let me = match self.state.me_index() {
            Some(i) => i,
            None => {
                self.lost = true;
                return true;
            }
        };
        self.turn += 1;

        let my_move = self.my_move();
        let mut moves = Vec::with_capacity(self.state.world().snakes.len());
        moves.push(SnakeMove::new(me, my_move));
        for &enemy in self.state.enemy_indices() {
            moves.push(SnakeMove::new(enemy, self.their_move(enemy)));
        }
        if self.turn == 1 {
            self.first_move = Some(my_move);
        }

        let next = self.state.after_moves(&moves, &self.rules);
        self.record_deaths(&next);
        self.record_meals(&next);
        self.state = next;

        self.lost = self.state.is_loss();
        self.lost
    }

    fn record_deaths(&mut self, next: &GameState) {
        for snake in &self.state.world().snakes {
            if next.world().snake(&snake.id).is_none() {
                self.obituaries.entry(snake.id.clone()).or_insert(self.turn);
            }
        }
    }

    fn record_meals(&mut self, next: &GameState) {
        for &food in &self.state.world().food {
            if let Some(eater) = next.snake_at(food) {
                self.foods_eaten
                    .entry(eater.id.clone())
                    .or_default()
                    .push(self.turn);
            }
        }
    }

    /// Closes the branch. A branch that neither lost nor reached the horizon
    /// ran out of time.
    pub fn into_future(self, max_turns: u32) -> Future {
        let termination_reason = if self.lost {
            TerminationReason::Loss
        } else if self.turn >= max_turns {
            TerminationReason::MaxTurns
        } else {
            TerminationReason::OutOfTime
        };
        Future {
            obituaries: self.obituaries,
            foods_eaten: self.foods_eaten,
            termination_reason,
            first_move: self.first_move,
            turns: self.turn,
            source: self.branch.source(),
        }
    }
}

/// Runs a batch of branches round-robin, one tick per branch per round,
/// until each loses, reaches `max_turns`, or `deadline` passes.
/// Always returns one future per branch, in input order.
pub fn run_branches(
    branches: &[AlgorithmBranch],
    world: &World,
    rules: Ruleset,
    max_turns: u32,
    deadline: Instant,
) -> Vec<Future> {
    let mut sims: Vec<Simulation> = branches
        .iter()
        .map(|b| Simulation::new(b, world.clone(), rules))
        .collect();

    'rounds: loop {
        let mut progressed = false;
        for sim in sims.iter_mut() {
            if sim.is_finished() || sim.turn() >= max_turns {
                continue;
            }
            if Instant::now() >= deadline {
                break 'rounds;
            }
            sim.step();
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    sims.into_iter().map(|s| s.into_future(max_turns)).collect()
}
