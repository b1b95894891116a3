//! SHA-256 digests of bearer token values

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a token value
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
