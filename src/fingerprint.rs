//! Case-insensitive 64-bit fingerprints used as dedup keys.
//!
//! Module names and rendered error messages are keyed by the XXH3 hash of
//! their lowercased text, so `"Payments"` and `"payments"` fingerprint
//! identically.

use xxhash_rust::xxh3::Xxh3;

/// Fingerprints `input` by streaming its lowercased characters through XXH3.
#[inline]
pub(crate) fn fingerprint(input: &str) -> u64 {
    let mut hasher = Xxh3::new();
    let mut buf = [0u8; 4];
    for ch in input.chars().flat_map(char::to_lowercase) {
        hasher.update(ch.encode_utf8(&mut buf).as_bytes());
    }
    hasher.digest()
}
