//! Deterministic point ids.
//!
//! Qdrant point ids must be UUIDs or integers, so string document ids are
//! mapped through UUIDv5. Re-upserting the same document overwrites its point
//! instead of duplicating it.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Short hex digest of document content, used inside composite ids so the
/// same user with changed resume text gets a fresh point.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(16);
    for b in &digest[..8] {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_stable() {
        assert_eq!(stable_uuid("resume_u1"), stable_uuid("resume_u1"));
        assert_ne!(stable_uuid("resume_u1"), stable_uuid("resume_u2"));
    }

    #[test]
    fn content_hash_is_stable_and_short() {
        let a = content_hash("some resume text");
        let b = content_hash("some resume text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, content_hash("other text"));
    }
}
