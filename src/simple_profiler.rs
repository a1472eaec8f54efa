//! Simple profiling guards using thread-local storage
//!
//! This module provides lightweight profiling without changing function signatures.
//! Enable with environment variable: BATTLESNAKE_PROFILE=1
//!
//! Worker threads accumulate into thread-local counters and fold them into the
//! global aggregators with `merge_thread_local` after every batch.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// What a profiled section is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pathfinding,
    ApplyMoves,
    FloodFill,
    BranchStep,
    Scoring,
}

impl Category {
    const COUNT: usize = 5;

    fn all() -> [Category; Category::COUNT] {
        [
            Category::Pathfinding,
            Category::ApplyMoves,
            Category::FloodFill,
            Category::BranchStep,
            Category::Scoring,
        ]
    }

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Category::Pathfinding => "Pathfinding (A*)",
            Category::ApplyMoves => "Tick Advance",
            Category::FloodFill => "Flood Fill",
            Category::BranchStep => "Branch Step",
            Category::Scoring => "Scoring",
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Counter {
    time_ns: u64,
    calls: u64,
}

thread_local! {
    static LOCAL: RefCell<[Counter; Category::COUNT]> = RefCell::new([Counter::default(); Category::COUNT]);
}

// Global aggregators
static GLOBAL_TIME: [AtomicU64; Category::COUNT] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_CALLS: [AtomicU64; Category::COUNT] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];

#[inline]
pub fn is_profiling_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("BATTLESNAKE_PROFILE").is_ok())
}

pub struct ProfileGuard {
    start: Instant,
    category: Category,
}

impl ProfileGuard {
    pub fn new(category: Category) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let idx = self.category.index();
        LOCAL.with(|local| {
            let mut local = local.borrow_mut();
            local[idx].time_ns += elapsed_ns;
            local[idx].calls += 1;
        });
    }
}

pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    LOCAL.with(|local| {
        let mut local = local.borrow_mut();
        for category in Category::all().iter() {
            let idx = category.index();
            GLOBAL_TIME[idx].fetch_add(local[idx].time_ns, Ordering::Relaxed);
            GLOBAL_CALLS[idx].fetch_add(local[idx].calls, Ordering::Relaxed);
            local[idx] = Counter::default();
        }
    });
}

/// Global totals of one decision, taken with `take_report`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileReport {
    time_ns: [u64; Category::COUNT],
    calls: [u64; Category::COUNT],
}

impl ProfileReport {
    pub fn calls(&self, category: Category) -> u64 {
        self.calls[category.index()]
    }

    pub fn time_ns(&self, category: Category) -> u64 {
        self.time_ns[category.index()]
    }

    pub fn print(&self, total_time_ms: u64) {
        let total_ns = total_time_ms * 1_000_000;

        eprintln!("\n═══════════════════════════════════════════════════════════");
        eprintln!("                 PERFORMANCE PROFILE");
        eprintln!("═══════════════════════════════════════════════════════════");
        eprintln!("Wall Time: {}ms (section times are summed over all workers)\n", total_time_ms);

        for category in Category::all().iter() {
            let time = self.time_ns(*category);
            let calls = self.calls(*category);
            let ms = time as f64 / 1_000_000.0;
            let pct = if total_ns > 0 { 100.0 * time as f64 / total_ns as f64 } else { 0.0 };
            let avg_us = if calls > 0 { time as f64 / (calls * 1000) as f64 } else { 0.0 };

            eprintln!("{}:", category.label());
            eprintln!("  Time:     {:.2}ms ({:.1}%)", ms, pct);
            eprintln!("  Calls:    {}", calls);
            eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
        }

        eprintln!("═══════════════════════════════════════════════════════════\n");
    }
}

/// Folds the calling thread's counters in, then drains the global totals.
/// `None` when profiling is off.
pub fn take_report() -> Option<ProfileReport> {
    if !is_profiling_enabled() {
        return None;
    }
    merge_thread_local();

    let mut report = ProfileReport::default();
    for idx in 0..Category::COUNT {
        report.time_ns[idx] = GLOBAL_TIME[idx].swap(0, Ordering::Relaxed);
        report.calls[idx] = GLOBAL_CALLS[idx].swap(0, Ordering::Relaxed);
    }
    Some(report)
}
