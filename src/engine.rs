// Decision entry point
//
// `Engine` owns the worker pool for the life of the process. `decide` builds
// the state, asks a selector what to simulate, runs the branches against the
// clock and hands the futures to the scorer. It always answers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::board::{Direction, World};
use crate::config::Config;
use crate::game_state::GameState;
use crate::movement::least_bad_move;
use crate::orchestrator::simulate_futures;
use crate::scorer::best_score;
use crate::simple_profiler::{self, ProfileReport};
use crate::simulator::Future;
use crate::strategies::{
    Aggressor, Cautious, Hungry, OneDirection, RandomSafe, TailChaser, Terminator,
};
use crate::strategy::{PrefixedStrategy, StrategyPlan, StrategySelector};
use crate::worker_pool::WorkerPool;

/// Answer when there is no self snake to move
pub const DEFAULT_DIRECTION: Direction = Direction::Up;

/// Everything `decide` found out, for logs and tests
#[derive(Debug)]
pub struct Decision {
    pub direction: Direction,
    pub preferred: Option<Direction>,
    /// Self strategy of the future that decided, if any did
    pub strategy: Option<String>,
    pub futures: Vec<Future>,
    pub elapsed: Duration,
    /// Section timings, present when profiling is on
    pub profile: Option<ProfileReport>,
}

pub struct Engine {
    config: Config,
    pool: WorkerPool,
}

impl Engine {
    /// Starts the worker pool. Failing to spawn a worker is fatal.
    pub fn new(config: Config) -> Result<Self, String> {
        let pool = WorkerPool::start(&config.pool)?;
        info!("Engine ready with {} simulation workers", pool.size());
        Ok(Engine { config, pool })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Picks a move for `world.you` within `max_millis`, simulating at most
    /// `max_turns` ticks per branch.
    pub fn decide(
        &self,
        world: World,
        selector: &dyn StrategySelector,
        max_turns: u32,
        max_millis: u64,
    ) -> Direction {
        self.decide_verbose(world, selector, max_turns, max_millis)
            .direction
    }

    /// `decide`, keeping the futures it simulated
    pub fn decide_verbose(
        &self,
        world: World,
        selector: &dyn StrategySelector,
        max_turns: u32,
        max_millis: u64,
    ) -> Decision {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(max_millis);
        let state = GameState::new(world);

        if state.is_loss() {
            warn!(
                "Snake '{}' is not on the board, answering {}",
                state.world().you,
                DEFAULT_DIRECTION
            );
            return Decision {
                direction: DEFAULT_DIRECTION,
                preferred: None,
                strategy: None,
                futures: Vec::new(),
                elapsed: start.elapsed(),
                profile: None,
            };
        }

        let plan = selector.select(&state);
        let preferred = plan.preferred.as_ref().map(|s| s.next_move(&state));
        let rules = self.config.game_rules.ruleset();

        let futures = simulate_futures(
            &self.pool,
            &state,
            &plan.mine,
            &plan.theirs,
            rules,
            max_turns,
            deadline,
        );

        let best = best_score(&futures, &state, preferred, &rules, &self.config.scores)
            .map(|s| (s.direction, s.future.source.strategy_name.clone()));
        let (direction, strategy) = match best {
            Some((direction, name)) => (direction, Some(name)),
            None => (
                preferred.unwrap_or_else(|| least_bad_move(&state)),
                None,
            ),
        };

        let elapsed = start.elapsed();
        let profile = simple_profiler::take_report();
        if let Some(report) = &profile {
            report.print(elapsed.as_millis() as u64);
        }

        Decision {
            direction,
            preferred,
            strategy,
            futures,
            elapsed,
            profile,
        }
    }

    /// Joins the workers. Dropping the engine does the same.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

/// The built-in lineup: self tries tail chasing with every two-move opening,
/// cautious play, aggression and tunnel closing. Opponents are modelled as
/// hungry, aggressive towards us, charging in a straight line or random.
pub struct DefaultSelector;

impl DefaultSelector {
    fn two_move_openings() -> Vec<Vec<Direction>> {
        use crate::board::Direction::*;
        vec![
            vec![Up, Up],
            vec![Up, Left],
            vec![Up, Right],
            vec![Down, Down],
            vec![Down, Left],
            vec![Down, Right],
            vec![Left, Left],
            vec![Left, Up],
            vec![Left, Down],
            vec![Right, Right],
            vec![Right, Up],
            vec![Right, Down],
        ]
    }
}

impl StrategySelector for DefaultSelector {
    fn select(&self, state: &GameState) -> StrategyPlan {
        let tail_chaser: Arc<dyn crate::strategy::Strategy> = Arc::new(TailChaser);
        let me = state.me().map(|s| s.id.clone()).unwrap_or_default();

        let mine = vec![
            PrefixedStrategy::with_prefixes(tail_chaser.clone(), Self::two_move_openings()),
            PrefixedStrategy::new(Arc::new(Cautious)),
            PrefixedStrategy::new(Arc::new(Aggressor::new())),
            PrefixedStrategy::new(Arc::new(Terminator)),
        ];

        let mut theirs = vec![
            PrefixedStrategy::new(Arc::new(Hungry)),
            PrefixedStrategy::with_prefixes(
                Arc::new(Aggressor::targeting(me)),
                Direction::all().iter().map(|d| vec![*d]).collect(),
            ),
        ];
        for d in Direction::all().iter() {
            theirs.push(PrefixedStrategy::new(Arc::new(OneDirection::new(*d))));
        }
        theirs.push(PrefixedStrategy::new(Arc::new(RandomSafe)));

        StrategyPlan {
            mine,
            theirs,
            preferred: Some(tail_chaser),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Point, Snake};
    use crate::strategy::Strategy;

    #[test]
    fn test_default_lineup() {
        let state = GameState::new(World {
            id: "lineup".to_string(),
            width: 7,
            height: 7,
            food: vec![],
            snakes: vec![
                Snake::new("0", 100, vec![Point::new(1, 1), Point::new(1, 2)]),
                Snake::new("1", 100, vec![Point::new(5, 5), Point::new(5, 6)]),
            ],
            you: "0".to_string(),
        });
        let plan = DefaultSelector.select(&state);

        let mine: Vec<&str> = plan.mine.iter().map(|p| p.strategy.name()).collect();
        assert_eq!(mine, vec!["tail-chaser", "cautious", "aggressor", "terminator"]);
        let theirs: Vec<&str> = plan.theirs.iter().map(|p| p.strategy.name()).collect();
        assert_eq!(theirs.first(), Some(&"hungry"));
        assert_eq!(theirs.last(), Some(&"random"));
        assert_eq!(theirs.len(), 7);
        assert_eq!(plan.preferred.map(|s| s.name().to_string()), Some("tail-chaser".to_string()));
    }
}
