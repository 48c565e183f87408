//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use ledger_core::{Account, EntryId, IdempotencyKey, LedgerEntry, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{
    all_column_families, cf, ActivityRecord, IdempotencyRecord, StoredAccount, Version,
    VERSION_ABSENT,
};
use crate::{AccountSnapshot, Store};

/// RocksDB-backed storage implementation.
///
/// `RocksDB` has no native conditional put, so the version compare and the
/// batch write inside [`Store::commit`] run under a short internal mutex.
/// Reads never take the lock; the optimistic read-compute-commit cycle in the
/// engine stays lock-free outside the final compare-and-write step.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    commit_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read the stored account record, if any.
    fn get_stored_account(&self, user_id: &UserId) -> Result<Option<StoredAccount>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Current version of an account, [`VERSION_ABSENT`] if none.
    fn current_version(&self, user_id: &UserId) -> Result<Version> {
        Ok(self
            .get_stored_account(user_id)?
            .map_or(VERSION_ABSENT, |stored| stored.version))
    }
}

impl Store for RocksStore {
    fn read_account(&self, user_id: &UserId) -> Result<AccountSnapshot> {
        match self.get_stored_account(user_id)? {
            Some(stored) => Ok(AccountSnapshot {
                account: Some(stored.account),
                version: stored.version,
            }),
            None => Ok(AccountSnapshot {
                account: None,
                version: VERSION_ABSENT,
            }),
        }
    }

    fn commit(
        &self,
        user_id: &UserId,
        expected_version: Version,
        account: &Account,
        entries: &[LedgerEntry],
        idempotency_key: Option<&IdempotencyKey>,
    ) -> Result<()> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_entries = self.cf(cf::ENTRIES)?;
        let cf_by_user = self.cf(cf::ENTRIES_BY_USER)?;
        let cf_idempotency = self.cf(cf::IDEMPOTENCY)?;

        // The compare and the batch write must be atomic with respect to
        // other commits; the lock covers only this section.
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| StoreError::Database("commit lock poisoned".into()))?;

        let actual = self.current_version(user_id)?;
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual,
            });
        }

        let mut batch = WriteBatch::default();

        if let Some(key) = idempotency_key {
            let key_bytes = keys::idempotency_key(key);
            let already_applied = self
                .db
                .get_cf(&cf_idempotency, &key_bytes)
                .map_err(|e| StoreError::Database(e.to_string()))?
                .is_some();
            if already_applied {
                return Err(StoreError::DuplicateKey {
                    key: key.to_string(),
                });
            }

            let record = IdempotencyRecord {
                key: key.to_string(),
                user_id: user_id.clone(),
                entry_id: entries
                    .first()
                    .map_or_else(EntryId::generate, |entry| entry.id),
                amount: entries.iter().map(|entry| entry.amount).sum(),
                applied_at: chrono::Utc::now(),
            };
            batch.put_cf(&cf_idempotency, &key_bytes, Self::serialize(&record)?);
        }

        let stored = StoredAccount {
            version: expected_version + 1,
            account: account.clone(),
        };
        batch.put_cf(
            &cf_accounts,
            keys::account_key(user_id),
            Self::serialize(&stored)?,
        );

        for entry in entries {
            let value = Self::serialize(entry)?;
            batch.put_cf(&cf_entries, keys::entry_key(&entry.id), &value);
            batch.put_cf(&cf_by_user, keys::user_entry_key(user_id, &entry.id), []);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(
            user_id = %user_id,
            version = stored.version,
            entries = entries.len(),
            "Committed account state"
        );

        Ok(())
    }

    fn get_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(cf::ENTRIES)?;
        let key = keys::entry_key(entry_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_entries_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let cf_by_user = self.cf(cf::ENTRIES_BY_USER)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULIDs sort oldest-first; collect all matching keys then reverse for
        // newest-first listing.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        let mut entries = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if entries.len() >= limit {
                break;
            }

            let entry_id = keys::extract_entry_id(&key);
            if let Some(entry) = self.get_entry(&entry_id)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn get_idempotency_record(&self, key: &IdempotencyKey) -> Result<Option<IdempotencyRecord>> {
        let cf = self.cf(cf::IDEMPOTENCY)?;

        self.db
            .get_cf(&cf, keys::idempotency_key(key))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_activity(&self, record: &ActivityRecord) -> Result<()> {
        let cf = self.cf(cf::ACTIVITY)?;
        let key = keys::activity_key(&record.user_id, &record.id);
        let value = Self::serialize(record)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_activity_by_user(&self, user_id: &UserId, limit: usize) -> Result<Vec<ActivityRecord>> {
        let cf = self.cf(cf::ACTIVITY)?;
        let prefix = keys::user_prefix(user_id);

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, rocksdb::Direction::Forward));

        let mut records = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            records.push(Self::deserialize(&value)?);
        }

        records.reverse();
        records.truncate(limit);

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn user(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn read_absent_account() {
        let (store, _dir) = create_test_store();

        let snapshot = store.read_account(&user("nobody")).unwrap();
        assert!(snapshot.account.is_none());
        assert_eq!(snapshot.version, VERSION_ABSENT);
    }

    #[test]
    fn commit_and_read_back() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");

        let mut account = Account::new(user_id.clone());
        account.credits_remaining = 10;
        let entry = LedgerEntry::purchase(user_id.clone(), 10, "Purchase of starter pack");

        store
            .commit(&user_id, VERSION_ABSENT, &account, &[entry.clone()], None)
            .unwrap();

        let snapshot = store.read_account(&user_id).unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.account.unwrap().credits_remaining, 10);

        let stored = store.get_entry(&entry.id).unwrap().unwrap();
        assert_eq!(stored.amount, 10);
    }

    #[test]
    fn commit_with_stale_version_conflicts() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");

        let mut account = Account::new(user_id.clone());
        account.credits_remaining = 10;
        store
            .commit(&user_id, VERSION_ABSENT, &account, &[], None)
            .unwrap();

        // A second writer using the stale version must lose.
        account.credits_remaining = 20;
        let result = store.commit(&user_id, VERSION_ABSENT, &account, &[], None);
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict {
                expected: 0,
                actual: 1
            })
        ));

        // The stored state is the first commit's.
        let snapshot = store.read_account(&user_id).unwrap();
        assert_eq!(snapshot.account.unwrap().credits_remaining, 10);
    }

    #[test]
    fn conflicting_commit_writes_nothing() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");

        let account = Account::new(user_id.clone());
        store
            .commit(&user_id, VERSION_ABSENT, &account, &[], None)
            .unwrap();

        let entry = LedgerEntry::debit(user_id.clone(), 1, "gpt-4");
        let result = store.commit(&user_id, VERSION_ABSENT, &account, &[entry.clone()], None);
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        // Neither the entry nor its index row exists.
        assert!(store.get_entry(&entry.id).unwrap().is_none());
        assert!(store
            .list_entries_by_user(&user_id, 10, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn duplicate_idempotency_key_rejected_atomically() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");
        let key = IdempotencyKey::new("evt_1").unwrap();

        let mut account = Account::new(user_id.clone());
        account.credits_remaining = 10;
        let entry = LedgerEntry::purchase(user_id.clone(), 10, "starter pack");
        store
            .commit(&user_id, VERSION_ABSENT, &account, &[entry], Some(&key))
            .unwrap();

        let record = store.get_idempotency_record(&key).unwrap().unwrap();
        assert_eq!(record.amount, 10);
        assert_eq!(record.user_id, user_id);

        // Replaying the key with a fresh version must fail and write nothing.
        account.credits_remaining = 20;
        let entry = LedgerEntry::purchase(user_id.clone(), 10, "starter pack");
        let result = store.commit(&user_id, 1, &account, &[entry.clone()], Some(&key));
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));

        let snapshot = store.read_account(&user_id).unwrap();
        assert_eq!(snapshot.account.unwrap().credits_remaining, 10);
        assert!(store.get_entry(&entry.id).unwrap().is_none());
    }

    #[test]
    fn list_entries_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");

        let mut account = Account::new(user_id.clone());
        let mut version = VERSION_ABSENT;
        for (i, details) in ["first", "second", "third"].iter().enumerate() {
            account.credits_remaining += 10;
            let entry = LedgerEntry::purchase(user_id.clone(), 10, *details);
            store
                .commit(&user_id, version, &account, &[entry], None)
                .unwrap();
            version = u64::try_from(i).unwrap() + 1;

            // ULIDs need distinct timestamps to order deterministically.
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let all = store.list_entries_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].details, "third");
        assert_eq!(all[2].details, "first");

        let page = store.list_entries_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].details, "second");
    }

    #[test]
    fn entries_do_not_leak_across_users() {
        let (store, _dir) = create_test_store();
        let alice = user("alice");
        let alice2 = user("alice2");

        let mut account = Account::new(alice.clone());
        account.credits_remaining = 10;
        let entry = LedgerEntry::purchase(alice.clone(), 10, "pack");
        store
            .commit(&alice, VERSION_ABSENT, &account, &[entry], None)
            .unwrap();

        assert_eq!(store.list_entries_by_user(&alice, 10, 0).unwrap().len(), 1);
        assert!(store.list_entries_by_user(&alice2, 10, 0).unwrap().is_empty());
    }

    #[test]
    fn activity_log_roundtrip() {
        let (store, _dir) = create_test_store();
        let user_id = user("alice");

        let record = ActivityRecord::new(
            user_id.clone(),
            "summarizer",
            serde_json::json!({"prompt": "hello"}),
            serde_json::json!({"result": "hi"}),
        );
        store.put_activity(&record).unwrap();

        let records = store.list_activity_by_user(&user_id, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tool_id, "summarizer");
    }
}
