//! Nano Work Client - Main Application
//!
//! Parses the root, races the configured number of CPU search workers, and
//! prints the winning work string on stdout. Exit codes: 0 on success, 2
//! for malformed input, 1 for everything else.

use nano_work_client::{
    config::Config,
    pow,
    worker::{CpuWorker, PowWorker, WorkerStats},
    Result, WorkString, APP_NAME, APP_VERSION,
};

use clap::Parser;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(&config);

    match run(config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(category = e.category(), "{}", e);
            if e.is_input_error() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` overrides the flag.
fn init_tracing(config: &Config) {
    let level: tracing::Level = config.log_level.into();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run the selected mode and return the process exit code.
///
/// Termination policy lives here: workers report results, they never exit
/// the process themselves.
async fn run(config: Config) -> Result<u8> {
    config.validate()?;

    if config.info {
        print_info();
        return Ok(0);
    }

    if config.print_config {
        print_configuration(&config)?;
        return Ok(0);
    }

    let root = config.parsed_root()?;
    let difficulty = config.threshold();

    if let Some(work_str) = &config.verify {
        let nonce = work_str.parse::<WorkString>()?.to_nonce()?;
        return if pow::validate_work(&root, nonce, difficulty) {
            println!("valid");
            Ok(0)
        } else {
            println!("invalid");
            Ok(1)
        };
    }

    info!(
        "starting {} v{}: {} workers, difficulty {}",
        APP_NAME, APP_VERSION, config.worker_count, difficulty
    );

    let mut worker = CpuWorker::new(config.worker_count);
    let cancellation = CancellationToken::new();

    // Periodic progress reporting from the worker
    let (stats_tx, mut stats_rx) = mpsc::unbounded_channel::<WorkerStats>();
    let stats_handle = tokio::spawn(async move {
        while let Some(stats) = stats_rx.recv().await {
            debug!(
                "searched {} nonces at {:.0} H/s",
                stats.total_hashes, stats.average_hash_rate
            );
        }
    });

    let nonce = worker
        .generate(root, difficulty, cancellation, Some(stats_tx))
        .await?;
    stats_handle.abort();

    debug_assert!(pow::validate_work(&root, nonce, difficulty));
    println!("{}", WorkString::from(nonce));
    Ok(0)
}

/// Print basic program information
fn print_info() {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!("Proof-of-work nonce generator for Nano-style block lattices");
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use nano_work_client::Error;

    const GENESIS_ROOT: &str =
        "e89208dd038fbb269987689621d52292ae9c35941a7484756ecced92a65093ba";

    #[tokio::test]
    async fn test_run_rejects_short_root() {
        let config =
            Config::try_parse_from(["nano-work-client", &GENESIS_ROOT[..63]]).unwrap();
        assert_matches!(run(config).await, Err(Error::Parse { .. }));
    }

    #[tokio::test]
    async fn test_run_verify_known_good_work() {
        // Work string for the genesis open block nonce, little-endian hex
        let config = Config::try_parse_from([
            "nano-work-client",
            "--verify",
            "91b63fdd1754f062",
            GENESIS_ROOT,
        ])
        .unwrap();
        assert_eq!(run(config).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_verify_rejects_bad_work() {
        // All-zero work does not reach the full threshold for this root
        let config = Config::try_parse_from([
            "nano-work-client",
            "--verify",
            "0000000000000000",
            GENESIS_ROOT,
        ])
        .unwrap();
        assert_eq!(run(config).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_verify_malformed_work() {
        let config = Config::try_parse_from([
            "nano-work-client",
            "--verify",
            "not-hex",
            GENESIS_ROOT,
        ])
        .unwrap();
        assert_matches!(run(config).await, Err(Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_run_generates_at_test_difficulty() {
        let config = Config::try_parse_from([
            "nano-work-client",
            "--difficulty",
            "test",
            "-c",
            "4",
            GENESIS_ROOT,
        ])
        .unwrap();
        assert_eq!(run(config).await.unwrap(), 0);
    }

    #[test]
    fn test_info_functions() {
        print_info();
        let config = Config::try_parse_from(["nano-work-client", "--print-config"]).unwrap();
        print_configuration(&config).unwrap();
    }
}
