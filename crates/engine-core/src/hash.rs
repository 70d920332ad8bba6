use model::events::PURCHASE_EVENT_NAME;
use sha2::{Digest, Sha256};

/// One-way hash applied to identity fields before they leave the process.
///
/// The value is trimmed and lower-cased first so `" A@B.com"` and `"a@b.com"`
/// hash identically. Output is lower-case hex SHA-256.
pub fn hash_pii(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable event id for a purchase, shared by every submission of the same
/// order to the same namespace.
pub fn dedup_event_id(namespace: &str, order_id: &str) -> String {
    hash_pii(&format!("{namespace}|{PURCHASE_EVENT_NAME}|{order_id}"))
}
