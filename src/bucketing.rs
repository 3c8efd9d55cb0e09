//! Deterministic percentage bucketing.
//!
//! An identity lands in bucket `u32_be(sha256("{flag_key}:{identity}")[..4]) % 100`
//! and is in the rollout iff that bucket is below the percentage. The flag key
//! is part of the hashed input so buckets are independent across flags.

use sha2::{Digest, Sha256};

/// Number of buckets a rollout percentage is measured against.
pub const BUCKET_COUNT: u32 = 100;

/// Stable bucket in `0..100` for an identity under a flag.
pub fn bucket_of(identity: &str, flag_key: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(flag_key.as_bytes());
    hasher.update(b":");
    hasher.update(identity.as_bytes());
    let digest = hasher.finalize();

    let prefix = [digest[0], digest[1], digest[2], digest[3]];
    u32::from_be_bytes(prefix) % BUCKET_COUNT
}

/// Whether `identity` falls inside a `percentage` rollout of `flag_key`.
///
/// Out-of-range percentages clamp: `<= 0` is never in, `>= 100` always is.
pub fn bucket(identity: &str, flag_key: &str, percentage: i32) -> bool {
    if percentage <= 0 {
        return false;
    }
    if percentage >= 100 {
        return true;
    }
    bucket_of(identity, flag_key) < percentage as u32
}
