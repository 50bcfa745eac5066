//! Content-addressed entry key generation.

use sha2::{Digest, Sha256};

/// Compute the entry key for a URL within a namespace.
pub fn entry_key(namespace: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
