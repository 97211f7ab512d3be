//! Nano Work Client
//!
//! A proof-of-work nonce generator for Nano-style block lattices:
//! - Blake2b-8 work digest, bit-compatible with existing ledger verifiers
//! - Multi-worker CPU search racing independent random starting nonces
//! - First valid nonce wins; the rest are cancelled

pub mod config;
pub mod error;
pub mod pow;
pub mod types;
pub mod worker;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{Difficulty, Nonce, Root, WorkString};

/// Application information
pub const APP_NAME: &str = "nano-work-client";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
