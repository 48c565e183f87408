//! `RocksDB` storage layer for the credit ledger.
//!
//! This crate provides persistent storage for accounts, ledger entries,
//! idempotency records, and the premium activity log, using `RocksDB` with
//! column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Versioned account records, keyed by `user_id`
//! - `entries`: Ledger entries, keyed by `entry_id` (ULID)
//! - `entries_by_user`: Index for listing entries by user
//! - `idempotency`: Applied purchase keys, keyed by the idempotency key
//! - `activity`: Premium activity log, keyed by `user_id / activity_id`
//!
//! # Concurrency
//!
//! Accounts carry a monotonically increasing version. `read_account` returns
//! the version observed; `commit` only succeeds if the stored version still
//! matches, so callers can implement optimistic read-modify-write without
//! holding locks across the compute step. All writes inside one `commit` are
//! applied in a single atomic batch.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use schema::{ActivityRecord, IdempotencyRecord, Version};

use ledger_core::{Account, EntryId, IdempotencyKey, LedgerEntry, UserId};

/// A versioned account read.
///
/// `version` is the token to pass back to [`Store::commit`]; it is
/// [`schema::VERSION_ABSENT`] (zero) when no account exists yet, which lets a
/// first purchase provision the account with the same conditional-write
/// discipline as an update.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// The account, if one exists.
    pub account: Option<Account>,

    /// The version observed at read time.
    pub version: Version,
}

/// The storage trait defining all database operations.
///
/// All mutation of accounts and ledger entries goes exclusively through
/// [`Store::commit`]; nothing else writes those column families.
pub trait Store: Send + Sync {
    /// Read an account together with its current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn read_account(&self, user_id: &UserId) -> Result<AccountSnapshot>;

    /// Conditionally commit an account state plus its ledger entries.
    ///
    /// The write succeeds only if the stored version still equals
    /// `expected_version`. On success the account is written with
    /// `expected_version + 1`, every entry is appended (with its per-user
    /// index row), and the idempotency key, if any, is recorded — all in one
    /// atomic batch.
    ///
    /// # Errors
    ///
    /// - `StoreError::VersionConflict` if another commit won the race.
    /// - `StoreError::DuplicateKey` if the idempotency key was already
    ///   recorded. Nothing is written in either case.
    fn commit(
        &self,
        user_id: &UserId,
        expected_version: Version,
        account: &Account,
        entries: &[LedgerEntry],
        idempotency_key: Option<&IdempotencyKey>,
    ) -> Result<()>;

    /// Get a ledger entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>>;

    /// List ledger entries for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_entries_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>>;

    /// Look up an applied idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_idempotency_record(&self, key: &IdempotencyKey) -> Result<Option<IdempotencyRecord>>;

    /// Append a premium activity record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_activity(&self, record: &ActivityRecord) -> Result<()>;

    /// List activity records for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_activity_by_user(&self, user_id: &UserId, limit: usize) -> Result<Vec<ActivityRecord>>;
}
