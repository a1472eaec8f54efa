// Move scorer: turns the simulated futures into a single direction
//
// A future that shows self dying, starving, boxed in, or walking into a
// corner trap is scored by how long self lasts. Any other future gets the
// survival score plus feeding, kill and preference bonuses. Futures are
// grouped by (self strategy, prefix, first move); the winner is the group
// with the best worst case, or the best best case if every group looks fatal.

use std::collections::BTreeMap;

use crate::board::Direction;
use crate::config::ScoresConfig;
use crate::game_state::GameState;
use crate::movement::could_end_up_corner_adjacent_to_bigger_snake;
use crate::rules::Ruleset;
use crate::simple_profiler::{Category, ProfileGuard};
use crate::simulator::Future;

/// A scored future
#[derive(Debug, Clone, Copy)]
pub struct DirectionScore<'a> {
    pub direction: Direction,
    pub score: i64,
    pub future: &'a Future,
}

/// Tick at which a snake with `health` starves, given the ticks it eats on
pub fn starvation_tick(health: i32, food_ticks: &[u32], rules: &Ruleset) -> u32 {
    let loss = rules.health_loss_per_turn.max(1);
    let mut health = health;
    let mut last_meal = 0u32;
    for &tick in food_ticks {
        let ticks_to_empty = (health.max(0) as u32 + loss as u32 - 1) / loss as u32;
        if tick > last_meal + ticks_to_empty {
            break;
        }
        health = rules.health_on_food;
        last_meal = tick;
    }
    let ticks_to_empty = (health.max(0) as u32 + loss as u32 - 1) / loss as u32;
    last_meal + ticks_to_empty
}

fn feeding_bonus(health: i32, food_ticks: &[u32], rules: &Ruleset, scores: &ScoresConfig) -> i64 {
    let first = match food_ticks.first() {
        Some(&t) => t,
        None => return 0,
    };
    let health_at_feed = health - rules.health_loss_per_turn * first as i32;
    let ideal = scores.ideal_health_at_feeding;
    let penalty = if health_at_feed >= ideal {
        (health_at_feed - ideal) as i64 * scores.early_feeding_penalty
    } else {
        (ideal - health_at_feed) as i64 * scores.late_feeding_penalty
    };
    (scores.feeding_bonus_max - penalty).clamp(0, scores.feeding_bonus_max)
}

/// Scores one future from the point of view of `state`'s self snake.
/// `None` when the future has no first move or self is absent.
pub fn score_future(
    future: &Future,
    state: &GameState,
    preferred: Option<Direction>,
    rules: &Ruleset,
    scores: &ScoresConfig,
) -> Option<i64> {
    let me = state.me()?;
    let direction = future.first_move?;
    let no_meals = Vec::new();
    let food_ticks = future.foods_eaten.get(&me.id).unwrap_or(&no_meals);

    let mut limit = future.obituaries.get(&me.id).copied();
    let mut lower = |tick: u32| {
        limit = Some(limit.map_or(tick, |l| l.min(tick)));
    };

    let starves_at = starvation_tick(me.health, food_ticks, rules);
    if starves_at <= future.turns {
        lower(starves_at);
    }

    let spaces = state.spaces_in(direction);
    if (spaces as usize) < me.len() {
        lower(spaces);
    }

    if could_end_up_corner_adjacent_to_bigger_snake(state, direction) {
        lower(scores.corner_danger_turns);
    }

    if let Some(tick) = limit {
        return Some(tick as i64 * scores.death_turn_weight);
    }

    let kills = future
        .obituaries
        .keys()
        .filter(|id| **id != me.id)
        .count() as i64;
    let mut score = scores.survival_score
        + feeding_bonus(me.health, food_ticks, rules, scores)
        + kills * scores.murder_bonus;
    if preferred == Some(direction) {
        score += scores.preferred_direction_bonus;
    }
    Some(score)
}

type GroupKey = (usize, Vec<Direction>, Direction);

struct Group<'a> {
    worst: DirectionScore<'a>,
    best: DirectionScore<'a>,
}

/// Best first move over all futures, `None` if no future has one
pub fn best_move(
    futures: &[Future],
    state: &GameState,
    preferred: Option<Direction>,
    rules: &Ruleset,
    scores: &ScoresConfig,
) -> Option<Direction> {
    best_score(futures, state, preferred, rules, scores).map(|s| s.direction)
}

/// The deciding score behind `best_move`, with the future it came from
pub fn best_score<'a>(
    futures: &'a [Future],
    state: &GameState,
    preferred: Option<Direction>,
    rules: &Ruleset,
    scores: &ScoresConfig,
) -> Option<DirectionScore<'a>> {
    let _guard = ProfileGuard::new(Category::Scoring);

    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();
    for future in futures {
        let score = match score_future(future, state, preferred, rules, scores) {
            Some(s) => s,
            None => continue,
        };
        let direction = match future.first_move {
            Some(d) => d,
            None => continue,
        };
        let scored = DirectionScore {
            direction,
            score,
            future,
        };
        let key = (
            future.source.strategy_index,
            future.source.prefix.clone(),
            direction,
        );
        groups
            .entry(key)
            .and_modify(|g| {
                if scored.score < g.worst.score {
                    g.worst = scored;
                }
                if scored.score > g.best.score {
                    g.best = scored;
                }
            })
            .or_insert(Group {
                worst: scored,
                best: scored,
            });
    }

    let safest = highest(groups.values().map(|g| g.worst))?;
    if safest.score >= scores.probably_dying_threshold {
        log::debug!(
            "Worst case of {} is {} ({:?})",
            safest.direction,
            safest.score,
            safest.future.termination_reason
        );
        return Some(safest);
    }

    let hopeful = highest(groups.values().map(|g| g.best))?;
    log::debug!(
        "Every option looks fatal, best case of {} is {} ({:?})",
        hopeful.direction,
        hopeful.score,
        hopeful.future.termination_reason
    );
    Some(hopeful)
}

/// First highest score; later equal scores do not displace it
fn highest<'a, I>(scores: I) -> Option<DirectionScore<'a>>
where
    I: Iterator<Item = DirectionScore<'a>>,
{
    scores.fold(None, |acc, s| match acc {
        Some(a) if a.score >= s.score => Some(a),
        _ => Some(s),
    })
}
