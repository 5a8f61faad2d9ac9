use sha2::{Digest, Sha256};

/// SHA-256 of `raw`, as lowercase hex.  Used only to notice changed content.
pub fn content_hash(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}
