// Profiling report of a decision
//
// Kept in its own test binary: the profiling switch is read once per process.

mod common;

use std::env;

use common::parse_world;
use futures_snake::config::Config;
use futures_snake::engine::{DefaultSelector, Engine};
use futures_snake::simple_profiler::Category;

#[test]
fn test_report_counts_work_done_on_the_deciding_thread() {
    env::set_var("BATTLESNAKE_PROFILE", "1");

    let mut config = Config::default_hardcoded();
    config.pool.worker_threads = 2;
    config.pool.idle_spin_ms = 0;
    let engine = Engine::new(config).expect("engine starts");
    let world = parse_world(&[
        "_ _ _ _ _ _",
        "_ > 0 _ _ _",
        "_ _ _ _ * _",
        "_ _ _ 1 < _",
        "_ _ _ _ _ _",
    ]);

    for _ in 0..2 {
        let decision = engine.decide_verbose(world.clone(), &DefaultSelector, 5, 500);
        let report = decision.profile.expect("profiling is on");

        // Scoring runs once per decision, on the caller's thread
        assert_eq!(report.calls(Category::Scoring), 1);
        assert!(report.calls(Category::BranchStep) > 0);
        assert!(report.calls(Category::Pathfinding) > 0);
    }
    engine.shutdown();
}
