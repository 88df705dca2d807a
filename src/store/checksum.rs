//! CRC32 (IEEE) over the compact JSON text of a stored record body.
//!
//! Every scan recomputes and compares; a mismatch aborts the scan.

use crc32fast::Hasher;

/// Checksum of the compact serialization of `body`.
pub fn body_checksum(body: &serde_json::Value) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(body.to_string().as_bytes());
    hasher.finalize()
}

pub fn verify_body(body: &serde_json::Value, expected: u32) -> bool {
    body_checksum(body) == expected
}
