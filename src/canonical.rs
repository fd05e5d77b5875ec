//! Stable xxh64 digests of the values a run is identified by.
//!
//! Three things in this crate are hashed, all through [`canonical_hash_hex`]:
//!
//! - `ExpansionConfig::params_hash`: config with floats quantized to
//!   integers, combined with the termination policy's own hash
//! - `PathSignature::digest`: seed pair plus the canonically oriented route
//! - `ExpansionResult::fingerprint`: seeds, paths, sampled nodes and edges
//!   and the termination reason
//!
//! A value is hashed as its compact `serde_json` encoding, streamed
//! straight into the hasher. Inputs must only contain ordered containers
//! (`Vec`, `BTreeMap`, `BTreeSet`); a `HashMap` would make the digest
//! depend on iteration order.

use serde::Serialize;
use std::io;
use xxhash_rust::xxh64::Xxh64;

/// Seed of every digest. Changing it changes every stored hash.
const DIGEST_SEED: u64 = 0;

/// Feeds serializer output into an xxh64 state.
struct DigestWriter(Xxh64);

impl io::Write for DigestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compact JSON encoding of `value`, the exact bytes [`canonical_hash`]
/// digests.
///
/// # Panics
///
/// If `value`'s `Serialize` impl fails, e.g. a map with non-string keys.
/// No type in this crate does.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("hashed values serialize to JSON")
}

/// xxh64 digest of `value`'s canonical encoding.
///
/// # Panics
///
/// Under the same condition as [`to_canonical_bytes`].
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let mut writer = DigestWriter(Xxh64::new(DIGEST_SEED));
    serde_json::to_writer(&mut writer, value).expect("hashed values serialize to JSON");
    writer.0.digest()
}

/// [`canonical_hash`] as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
