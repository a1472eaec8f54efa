// Configuration module for reading Snake.toml
// Every tunable of the engine lives here: time budget, worker pool, scoring, game rules

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::rules::Ruleset;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub pool: PoolConfig,
    pub scores: ScoresConfig,
    pub game_rules: GameRulesConfig,
    pub debug: DebugConfig,
}

/// Timing and horizon constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    pub max_turns: u32,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Worker pool sizing and idle behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    pub worker_threads: usize,
    pub idle_spin_ms: u64,
    pub sleep_interval_ms: u64,
}

impl PoolConfig {
    /// Number of workers to spawn; 0 in the file means one per available core
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn idle_spin(&self) -> Duration {
        Duration::from_millis(self.idle_spin_ms)
    }

    pub fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval_ms)
    }
}

/// Constants used to turn simulated futures into a move
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    // Survival
    pub survival_score: i64,
    pub death_turn_weight: i64,
    pub probably_dying_threshold: i64,
    pub corner_danger_turns: u32,

    // Feeding
    pub ideal_health_at_feeding: i32,
    pub feeding_bonus_max: i64,
    pub early_feeding_penalty: i64,
    pub late_feeding_penalty: i64,

    // Aggression and tie-breaking
    pub murder_bonus: i64,
    pub preferred_direction_bonus: i64,
}

/// Game rules constants
#[derive(Debug, Deserialize, Clone)]
pub struct GameRulesConfig {
    pub health_on_food: i32,
    pub health_loss_per_turn: i32,
}

impl GameRulesConfig {
    pub fn ruleset(&self) -> Ruleset {
        Ruleset {
            health_on_food: self.health_on_food,
            health_loss_per_turn: self.health_loss_per_turn,
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 100,
                max_turns: 10000,
            },
            pool: PoolConfig {
                worker_threads: 0,
                idle_spin_ms: 1000,
                sleep_interval_ms: 10,
            },
            scores: ScoresConfig {
                survival_score: 1_000_000,
                death_turn_weight: 100,
                probably_dying_threshold: 500_000,
                corner_danger_turns: 2,
                ideal_health_at_feeding: 30,
                feeding_bonus_max: 1000,
                early_feeding_penalty: 10,
                late_feeding_penalty: 30,
                murder_bonus: 500,
                preferred_direction_bonus: 50,
            },
            game_rules: GameRulesConfig {
                health_on_food: 100,
                health_loss_per_turn: 1,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Could not load Snake.toml ({}), using hardcoded defaults", e);
                Self::default_hardcoded()
            })
    }
}
