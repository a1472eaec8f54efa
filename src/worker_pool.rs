// Persistent simulation workers
//
// Each worker owns one OS thread for the life of the pool. Between batches a
// worker yield-spins for `idle_spin` so back-to-back moves start instantly,
// then parks on its condition variable, re-checking every `sleep_interval`.
// Handing it a job wakes it immediately.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use parking_lot::{Condvar, Mutex};

use crate::board::World;
use crate::config::PoolConfig;
use crate::rules::Ruleset;
use crate::simple_profiler;
use crate::simulator::{run_branches, AlgorithmBranch, Future};
use crate::strategy::BranchId;

/// Countdown released once every worker of a batch has stored its result
pub struct BatchLatch {
    remaining: Mutex<usize>,
    released: Condvar,
}

impl BatchLatch {
    pub fn new(count: usize) -> Self {
        BatchLatch {
            remaining: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.released.notify_all();
        }
    }

    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.released.wait(&mut remaining);
        }
    }
}

/// Everything a worker needs to run one batch
pub struct Job {
    pub branches: Vec<AlgorithmBranch>,
    pub world: World,
    pub rules: Ruleset,
    pub max_turns: u32,
    pub deadline: Instant,
    pub latch: Arc<BatchLatch>,
}

#[derive(Default)]
struct Slot {
    job: Option<Job>,
    result: Vec<Future>,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    has_work: AtomicBool,
    sleeping: AtomicBool,
    quit: AtomicBool,
    last_active: Mutex<Instant>,
}

pub struct Worker {
    id: usize,
    shared: Arc<Shared>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Worker {
    fn spawn(id: usize, idle_spin: Duration, sleep_interval: Duration) -> Result<Self, String> {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
            has_work: AtomicBool::new(false),
            sleeping: AtomicBool::new(false),
            quit: AtomicBool::new(false),
            last_active: Mutex::new(Instant::now()),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("sim-worker-{}", id))
            .spawn(move || work_loop(id, &worker_shared, idle_spin, sleep_interval))
            .map_err(|e| format!("Failed to spawn simulation worker {}: {}", id, e))?;

        Ok(Worker {
            id,
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Hands a batch to the worker without waiting for it
    pub fn start_work(&self, job: Job) {
        self.shared.has_work.store(true, Ordering::Release);
        self.shared.slot.lock().job = Some(job);
        self.shared.wake.notify_one();
    }

    /// No batch pending or running
    pub fn done(&self) -> bool {
        !self.shared.has_work.load(Ordering::Acquire)
    }

    pub fn take_result(&self) -> Vec<Future> {
        std::mem::take(&mut self.shared.slot.lock().result)
    }

    pub fn is_sleeping(&self) -> bool {
        self.shared.sleeping.load(Ordering::Acquire)
    }

    fn stop(&self) {
        self.shared.quit.store(true, Ordering::Release);
        {
            let _slot = self.shared.slot.lock();
            self.shared.wake.notify_all();
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                error!("Simulation worker {} panicked during shutdown", self.id);
            }
        }
    }
}

fn work_loop(id: usize, shared: &Shared, idle_spin: Duration, sleep_interval: Duration) {
    while !shared.quit.load(Ordering::Acquire) {
        let job = shared.slot.lock().job.take();
        match job {
            Some(job) => {
                shared.sleeping.store(false, Ordering::Release);
                let futures = run_job(id, &job);
                shared.slot.lock().result = futures;
                *shared.last_active.lock() = Instant::now();
                shared.has_work.store(false, Ordering::Release);
                job.latch.count_down();
            }
            None if shared.last_active.lock().elapsed() < idle_spin => thread::yield_now(),
            None => {
                shared.sleeping.store(true, Ordering::Release);
                let mut slot = shared.slot.lock();
                if slot.job.is_none() && !shared.quit.load(Ordering::Acquire) {
                    shared.wake.wait_for(&mut slot, sleep_interval);
                }
            }
        }
    }
}

fn run_job(id: usize, job: &Job) -> Vec<Future> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_branches(&job.branches, &job.world, job.rules, job.max_turns, job.deadline)
    }));
    simple_profiler::merge_thread_local();
    match outcome {
        Ok(futures) => futures,
        Err(_) => {
            error!(
                "Simulation worker {} panicked while running {} branches",
                id,
                job.branches.len()
            );
            Vec::new()
        }
    }
}

/// Fixed set of simulation workers plus the branch id counter
pub struct WorkerPool {
    workers: Vec<Worker>,
    next_branch_id: AtomicU64,
    dispatch: Mutex<()>,
    stopped: AtomicBool,
}

impl WorkerPool {
    /// Spawns the workers described by `config`
    pub fn start(config: &PoolConfig) -> Result<Self, String> {
        Self::with_threads(
            config.resolved_worker_threads(),
            config.idle_spin(),
            config.sleep_interval(),
        )
    }

    pub fn with_threads(
        threads: usize,
        idle_spin: Duration,
        sleep_interval: Duration,
    ) -> Result<Self, String> {
        if threads == 0 {
            return Err("Worker pool needs at least one thread".to_string());
        }
        let workers = (0..threads)
            .map(|id| Worker::spawn(id, idle_spin, sleep_interval))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Started {} simulation workers", threads);

        Ok(WorkerPool {
            workers,
            next_branch_id: AtomicU64::new(0),
            dispatch: Mutex::new(()),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn next_branch_id(&self) -> BranchId {
        self.next_branch_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn sleeping_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.is_sleeping()).count()
    }

    /// Runs `batches[i]` on worker `i` and blocks until all of them are done.
    /// One caller at a time; a second caller waits for the first to finish.
    ///
    /// Batches beyond the pool size are ignored, so callers partition with
    /// `size()` in mind.
    pub fn execute(
        &self,
        batches: Vec<Vec<AlgorithmBranch>>,
        world: &World,
        rules: Ruleset,
        max_turns: u32,
        deadline: Instant,
    ) -> Vec<Future> {
        let _dispatch = self.dispatch.lock();
        if self.stopped.load(Ordering::Acquire) {
            warn!("Worker pool is shut down, nothing simulated");
            return Vec::new();
        }

        let batches: Vec<Vec<AlgorithmBranch>> = batches
            .into_iter()
            .filter(|b| !b.is_empty())
            .take(self.workers.len())
            .collect();
        let latch = Arc::new(BatchLatch::new(batches.len()));
        let busy = batches.len();

        for (worker, branches) in self.workers.iter().zip(batches) {
            debug!("Worker {} gets {} branches", worker.id(), branches.len());
            worker.start_work(Job {
                branches,
                world: world.clone(),
                rules,
                max_turns,
                deadline,
                latch: Arc::clone(&latch),
            });
        }
        latch.wait();

        self.workers[..busy]
            .iter()
            .flat_map(|w| w.take_result())
            .collect()
    }

    /// Signals every worker to exit and joins it. Safe to call twice.
    pub fn shutdown(&self) {
        let _dispatch = self.dispatch.lock();
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        for worker in &self.workers {
            worker.stop();
        }
        debug!("Simulation workers stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threads_is_an_error() {
        let result = WorkerPool::with_threads(0, Duration::ZERO, Duration::from_millis(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_latch_releases_after_last_count_down() {
        let latch = Arc::new(BatchLatch::new(3));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || latch.count_down())
            })
            .collect();
        latch.wait();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*latch.remaining.lock(), 0);
    }

    #[test]
    fn test_idle_workers_fall_asleep_and_shut_down() {
        let pool = WorkerPool::with_threads(2, Duration::ZERO, Duration::from_millis(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while pool.sleeping_workers() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(pool.sleeping_workers(), 2);
        assert!(pool.workers().iter().all(|w| w.done()));

        pool.shutdown();
        pool.shutdown();
        assert!(pool
            .workers()
            .iter()
            .all(|w| w.handle.lock().is_none()));
    }

    #[test]
    fn test_branch_ids_are_unique() {
        let pool = WorkerPool::with_threads(1, Duration::ZERO, Duration::from_millis(5)).unwrap();
        let a = pool.next_branch_id();
        let b = pool.next_branch_id();
        assert_ne!(a, b);
    }
}
