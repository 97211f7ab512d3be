//! CPU search worker
//!
//! Races several independent search tasks over the same root, each seeded
//! with its own random starting nonce. The first task to find a valid nonce
//! sends it on a channel; the coordinator cancels the rest and returns it.

use super::{compute_hash_rate, search_span, PowWorker, WorkerStats};
use crate::{pow, Difficulty, Error, Nonce, Result, Root};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Nonces examined per task between cancellation checks
const BATCH_SIZE: u64 = 10_000;

/// CPU search worker running multiple concurrent tasks
pub struct CpuWorker {
    worker_count: usize,
    stats: Arc<CpuWorkerStats>,
}

/// Thread-safe search statistics for the CPU worker
#[derive(Debug)]
struct CpuWorkerStats {
    total_hashes: AtomicU64,
    solutions_found: AtomicU64,
    start_time: Instant,
    is_searching: AtomicBool,
}

impl CpuWorkerStats {
    fn new() -> Self {
        Self {
            total_hashes: AtomicU64::new(0),
            solutions_found: AtomicU64::new(0),
            start_time: Instant::now(),
            is_searching: AtomicBool::new(false),
        }
    }

    fn reset(&self) {
        self.total_hashes.store(0, Ordering::Relaxed);
        self.solutions_found.store(0, Ordering::Relaxed);
        self.is_searching.store(false, Ordering::Relaxed);
    }

    fn to_worker_stats(&self) -> WorkerStats {
        let total_hashes = self.total_hashes.load(Ordering::Relaxed);
        let solutions = self.solutions_found.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        WorkerStats {
            total_hashes,
            solutions_found: solutions,
            search_time_secs: elapsed.as_secs(),
            average_hash_rate: compute_hash_rate(total_hashes, elapsed),
        }
    }
}

impl CpuWorker {
    /// Create a new CPU worker; a count of 0 uses all available cores
    pub fn new(worker_count: usize) -> Self {
        let worker_count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };

        info!("creating CPU worker with {} search tasks", worker_count);

        Self {
            worker_count,
            stats: Arc::new(CpuWorkerStats::new()),
        }
    }

    /// Get the configured number of search tasks
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Run one search task until it finds a nonce or is cancelled.
    ///
    /// The task owns its nonce; nothing but the immutable root is shared
    /// with its siblings. Cancellation is checked between batches.
    async fn search_task(
        task_id: usize,
        root: Root,
        difficulty: Difficulty,
        stats: Arc<CpuWorkerStats>,
        cancellation: CancellationToken,
        solution_tx: mpsc::UnboundedSender<Nonce>,
    ) {
        let mut nonce = pow::random_nonce();
        debug!("search task {} seeded at {}", task_id, nonce);

        loop {
            if cancellation.is_cancelled() {
                debug!("search task {} cancelled", task_id);
                return;
            }

            if let Some(found) = pow::search_batch(&root, nonce, BATCH_SIZE, difficulty) {
                info!("search task {} found valid nonce {}", task_id, found);

                // The winning batch still examined every nonce up to and
                // including the solution
                let examined = found.value().wrapping_sub(nonce.value()).wrapping_add(1);
                stats.total_hashes.fetch_add(examined, Ordering::Relaxed);
                stats.solutions_found.fetch_add(1, Ordering::Relaxed);

                // Send the solution (ignore if a sibling already won)
                let _ = solution_tx.send(found);
                return;
            }

            nonce.add(BATCH_SIZE);
            stats.total_hashes.fetch_add(BATCH_SIZE, Ordering::Relaxed);

            // Keep the runtime responsive between batches
            task::yield_now().await;
        }
    }
}

#[async_trait]
impl PowWorker for CpuWorker {
    fn worker_type(&self) -> &'static str {
        "cpu"
    }

    async fn generate(
        &mut self,
        root: Root,
        difficulty: Difficulty,
        cancellation: CancellationToken,
        stats_tx: Option<mpsc::UnboundedSender<WorkerStats>>,
    ) -> Result<Nonce> {
        let _span = search_span(self.worker_type(), difficulty);

        info!(
            "starting CPU search with {} tasks at difficulty {} (about {:.0} expected attempts)",
            self.worker_count,
            difficulty,
            difficulty.expected_attempts()
        );

        self.stats.reset();
        self.stats.is_searching.store(true, Ordering::Relaxed);

        // Channel for solutions from search tasks
        let (solution_tx, mut solution_rx) = mpsc::unbounded_channel();

        let mut handles = Vec::new();
        for task_id in 0..self.worker_count {
            let stats = Arc::clone(&self.stats);
            let cancellation = cancellation.clone();
            let solution_tx = solution_tx.clone();

            handles.push(task::spawn(Self::search_task(
                task_id,
                root,
                difficulty,
                stats,
                cancellation,
                solution_tx,
            )));
        }

        // Drop the original sender so the channel closes if all tasks exit
        drop(solution_tx);

        // Periodic statistics reporting while the search runs
        let stats_handle = stats_tx.map(|tx| {
            let stats = Arc::clone(&self.stats);
            let stats_cancellation = cancellation.clone();
            task::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(5));
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let _ = tx.send(stats.to_worker_stats());
                        }
                        _ = stats_cancellation.cancelled() => break,
                    }
                }
            })
        });

        // First solution wins; an external cancellation aborts the search
        let result = tokio::select! {
            solution = solution_rx.recv() => {
                match solution {
                    Some(nonce) => Ok(nonce),
                    None => {
                        warn!("all search tasks exited without a solution");
                        Err(Error::worker("cpu", "all search tasks exited"))
                    }
                }
            }
            _ = cancellation.cancelled() => {
                info!("CPU search cancelled");
                Err(Error::cancelled("cpu search"))
            }
        };

        // Stop the losing tasks and wait for them to unwind
        cancellation.cancel();

        for handle in handles {
            let _ = handle.await;
        }

        if let Some(handle) = stats_handle {
            let _ = handle.await;
        }

        self.stats.is_searching.store(false, Ordering::Relaxed);

        let final_stats = self.stats.to_worker_stats();
        info!(
            "CPU search finished: {} hashes at {:.0} H/s",
            final_stats.total_hashes, final_stats.average_hash_rate
        );

        result
    }

    fn stats(&self) -> WorkerStats {
        self.stats.to_worker_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::validate_work;
    use assert_matches::assert_matches;

    #[test]
    fn test_cpu_worker_creation() {
        let worker = CpuWorker::new(2);
        assert_eq!(worker.worker_count(), 2);
        assert_eq!(worker.worker_type(), "cpu");
    }

    #[test]
    fn test_cpu_worker_zero_uses_all_cores() {
        let worker = CpuWorker::new(0);
        assert!(worker.worker_count() >= 1);
    }

    #[tokio::test]
    async fn test_generate_finds_valid_nonce() {
        let mut worker = CpuWorker::new(4);
        let root = Root::new([0x42; 32]);
        let cancellation = CancellationToken::new();

        let nonce = worker
            .generate(root, Difficulty::TEST, cancellation, None)
            .await
            .unwrap();

        assert!(validate_work(&root, nonce, Difficulty::TEST));
    }

    #[tokio::test]
    async fn test_generate_trivial_difficulty() {
        // At difficulty zero the first examined nonce wins immediately
        let mut worker = CpuWorker::new(1);
        let root = Root::new([0u8; 32]);
        let cancellation = CancellationToken::new();

        let nonce = worker
            .generate(root, Difficulty::new(0), cancellation, None)
            .await
            .unwrap();

        assert!(validate_work(&root, nonce, Difficulty::new(0)));
    }

    #[tokio::test]
    async fn test_generate_cancellation() {
        let mut worker = CpuWorker::new(1);
        let root = Root::new([0x42; 32]);
        let cancellation = CancellationToken::new();

        // A threshold of u64::MAX is practically unreachable, so the only
        // way out is the cancellation we issue up front.
        cancellation.cancel();

        let result = worker
            .generate(root, Difficulty::new(u64::MAX), cancellation, None)
            .await;

        assert_matches!(result, Err(Error::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_stats_report_hashes() {
        let mut worker = CpuWorker::new(2);
        let root = Root::new([0x42; 32]);
        let cancellation = CancellationToken::new();

        worker
            .generate(root, Difficulty::TEST, cancellation, None)
            .await
            .unwrap();

        // More than one task may find a nonce before cancellation lands
        let stats = worker.stats();
        assert!(stats.solutions_found >= 1);
    }

    #[tokio::test]
    async fn test_stats_count_winning_batch() {
        // At difficulty zero the very first batch wins; the nonces it
        // examined must still show up in the hash count
        let mut worker = CpuWorker::new(1);
        let root = Root::new([0x42; 32]);
        let cancellation = CancellationToken::new();

        worker
            .generate(root, Difficulty::new(0), cancellation, None)
            .await
            .unwrap();

        let stats = worker.stats();
        assert!(stats.total_hashes >= 1);
    }
}
