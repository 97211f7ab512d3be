//! Proof-of-work engine
//!
//! Pure functions computing and verifying the work digest, plus the
//! sequential brute-force search run by each worker thread.
//!
//! The digest is Blake2b with an 8-byte output over `nonce_le || root`,
//! read as a little-endian unsigned 64-bit integer. This construction is
//! bit-for-bit compatible with `crypto_generichash_blake2b` at output
//! length 8 as used by Nano work validation, so any nonce produced here
//! verifies against existing ledger tooling.

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::{Difficulty, Nonce, Root};

type Blake2bWork = Blake2b<U8>;

/// Compute the work digest for a (root, nonce) pair.
///
/// Deterministic and side-effect free. A higher value means more work.
pub fn work_value(root: &Root, nonce: Nonce) -> u64 {
    let mut hasher = Blake2bWork::new();
    hasher.update(nonce.to_bytes());
    hasher.update(root.as_bytes());
    let digest = hasher.finalize();

    let mut output = [0u8; 8];
    output.copy_from_slice(&digest);
    u64::from_le_bytes(output)
}

/// Check whether a nonce meets the difficulty threshold for a root.
pub fn validate_work(root: &Root, nonce: Nonce, difficulty: Difficulty) -> bool {
    difficulty.is_met_by(work_value(root, nonce))
}

/// Sequential brute-force search starting at `start`.
///
/// Increments by one per attempt, wrapping at the 64-bit boundary, and
/// returns the first nonce that validates. The loop is unbounded: it never
/// fails or times out on its own. At the full publish threshold the
/// expected attempt count is about 2^26, so termination is a statistical
/// certainty in practice.
pub fn search_from(root: &Root, start: Nonce, difficulty: Difficulty) -> Nonce {
    let mut nonce = start;
    while !validate_work(root, nonce, difficulty) {
        nonce.increment();
    }
    nonce
}

/// Bounded search over `count` consecutive nonces starting at `start`.
///
/// Returns the first valid nonce, or `None` if the batch is exhausted.
/// Workers call this between cancellation checks so a winning sibling can
/// stop them without a shared mutable stop flag.
pub fn search_batch(
    root: &Root,
    start: Nonce,
    count: u64,
    difficulty: Difficulty,
) -> Option<Nonce> {
    let mut nonce = start;
    for _ in 0..count {
        if validate_work(root, nonce, difficulty) {
            return Some(nonce);
        }
        nonce.increment();
    }
    None
}

/// Draw a fresh random starting nonce from the OS CSPRNG.
///
/// Each worker seeds its own search range from the full 64-bit space so
/// concurrent workers do not duplicate each other's attempts.
pub fn random_nonce() -> Nonce {
    Nonce::new(OsRng.next_u64())
}
