// Library exports for the futures snake
// The engine decides by simulating many possible futures on a worker pool;
// the binary in main.rs only wraps it in the Battlesnake HTTP API.

pub mod astar;
pub mod board;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod game_state;
pub mod movement;
pub mod orchestrator;
pub mod rules;
pub mod scorer;
pub mod simple_profiler;
pub mod simulator;
pub mod strategies;
pub mod strategy;
pub mod types;
pub mod worker_pool;
