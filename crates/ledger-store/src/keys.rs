//! Key encoding utilities for `RocksDB`.
//!
//! User IDs are opaque variable-length strings; `UserId` validation forbids
//! the `/` byte, which is used here as the composite-key separator, so
//! per-user prefixes are unambiguous.

use ledger_core::{EntryId, IdempotencyKey, UserId};

/// Separator between the user ID and the ULID in composite keys.
const SEPARATOR: u8 = b'/';

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a ledger entry key from an entry ID.
#[must_use]
pub fn entry_key(entry_id: &EntryId) -> Vec<u8> {
    entry_id.to_bytes().to_vec()
}

/// Create a user-entry index key.
///
/// Format: `user_id || '/' || entry_id (16 bytes)`
///
/// Since ULIDs are time-ordered, entries for a user sort chronologically.
#[must_use]
pub fn user_entry_key(user_id: &UserId, entry_id: &EntryId) -> Vec<u8> {
    composite_key(user_id, &entry_id.to_bytes())
}

/// Create a prefix for iterating all entries for a user.
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(user_id.as_bytes().len() + 1);
    prefix.extend_from_slice(user_id.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Extract the entry ID from a composite `user_id / ulid` key.
///
/// # Panics
///
/// Panics if the key does not end in 16 ULID bytes.
#[must_use]
pub fn extract_entry_id(key: &[u8]) -> EntryId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[key.len() - 16..]);
    EntryId::from_bytes(bytes)
}

/// Create an idempotency key from the caller-supplied token.
#[must_use]
pub fn idempotency_key(key: &IdempotencyKey) -> Vec<u8> {
    key.as_bytes().to_vec()
}

/// Create an activity record key: `user_id || '/' || activity_id`.
#[must_use]
pub fn activity_key(user_id: &UserId, activity_id: &EntryId) -> Vec<u8> {
    composite_key(user_id, &activity_id.to_bytes())
}

fn composite_key(user_id: &UserId, ulid_bytes: &[u8; 16]) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.as_bytes().len() + 1 + 16);
    key.extend_from_slice(user_id.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(ulid_bytes);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn user_entry_key_format() {
        let user_id = user();
        let entry_id = EntryId::generate();
        let key = user_entry_key(&user_id, &entry_id);

        assert_eq!(key.len(), user_id.as_bytes().len() + 1 + 16);
        assert!(key.starts_with(user_id.as_bytes()));
        assert_eq!(key[user_id.as_bytes().len()], b'/');
        assert_eq!(&key[key.len() - 16..], entry_id.to_bytes());
    }

    #[test]
    fn prefix_matches_own_keys_only() {
        let a = UserId::new("alice").unwrap();
        let b = UserId::new("alice2").unwrap();
        let entry_id = EntryId::generate();

        let key = user_entry_key(&a, &entry_id);
        assert!(key.starts_with(&user_prefix(&a)));
        // "alice2/"-prefixed keys never collide with "alice/" thanks to the
        // separator byte.
        assert!(!key.starts_with(&user_prefix(&b)));
    }

    #[test]
    fn extract_entry_id_roundtrip() {
        let entry_id = EntryId::generate();
        let key = user_entry_key(&user(), &entry_id);
        assert_eq!(extract_entry_id(&key), entry_id);
    }
}
