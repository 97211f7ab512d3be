//! Search worker implementations
//!
//! Workers run the proof-of-work search; the CPU worker races several
//! independent search tasks and surfaces the first valid nonce.

use crate::{Difficulty, Nonce, Result, Root};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub mod cpu;

pub use cpu::CpuWorker;

/// Search statistics for a worker
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    /// Total digests computed
    pub total_hashes: u64,
    /// Number of valid nonces found
    pub solutions_found: u64,
    /// Time spent searching (seconds)
    pub search_time_secs: u64,
    /// Average hash rate (hashes per second)
    pub average_hash_rate: f64,
}

/// Proof-of-work search worker trait.
///
/// The worker must respect the cancellation token and stop searching when
/// cancelled; on success it returns the first valid nonce it found.
#[async_trait]
pub trait PowWorker: Send + Sync {
    /// Get the worker type name for logging
    fn worker_type(&self) -> &'static str;

    /// Search for a nonce whose digest over `root` meets `difficulty`
    async fn generate(
        &mut self,
        root: Root,
        difficulty: Difficulty,
        cancellation: CancellationToken,
        stats_tx: Option<mpsc::UnboundedSender<WorkerStats>>,
    ) -> Result<Nonce>;

    /// Get current search statistics
    fn stats(&self) -> WorkerStats {
        WorkerStats::default()
    }
}

/// Utility function to compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Create a tracing span for search operations
pub fn search_span(worker_type: &str, difficulty: Difficulty) -> Span {
    tracing::info_span!(
        "search",
        worker_type = worker_type,
        difficulty = %difficulty,
    )
}
