//! Storage schema: column families and stored record envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledger_core::{Account, EntryId, UserId};

/// Account version token. Zero means the account does not exist yet.
pub type Version = u64;

/// Version reported for an absent account.
pub const VERSION_ABSENT: Version = 0;

/// Column family names.
pub mod cf {
    /// Versioned account records, keyed by user ID.
    pub const ACCOUNTS: &str = "accounts";

    /// Ledger entries, keyed by entry ID (ULID).
    pub const ENTRIES: &str = "entries";

    /// Per-user entry index, keyed by `user_id / entry_id`.
    pub const ENTRIES_BY_USER: &str = "entries_by_user";

    /// Applied idempotency keys.
    pub const IDEMPOTENCY: &str = "idempotency";

    /// Premium activity log, keyed by `user_id / activity_id`.
    pub const ACTIVITY: &str = "activity";
}

/// All column families, for database open.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::ENTRIES,
        cf::ENTRIES_BY_USER,
        cf::IDEMPOTENCY,
        cf::ACTIVITY,
    ]
}

/// The account record as stored: the account plus its CAS version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAccount {
    /// Monotonically increasing version, bumped on every commit.
    pub version: Version,

    /// The account state.
    pub account: Account,
}

/// Record of an applied idempotency key.
///
/// Kept so a replayed purchase event can be diagnosed, not just rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// The key that was applied.
    pub key: String,

    /// The user whose account was credited.
    pub user_id: UserId,

    /// The ledger entry written by the original commit.
    pub entry_id: EntryId,

    /// The amount credited.
    pub amount: i64,

    /// When the original commit happened.
    pub applied_at: DateTime<Utc>,
}

/// A premium activity log record.
///
/// Written only for users whose entitlement is current; never consulted by
/// the balance path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Unique record ID (ULID for time-ordering).
    pub id: EntryId,

    /// The user who ran the tool.
    pub user_id: UserId,

    /// The tool that was run.
    pub tool_id: String,

    /// Tool inputs as provided by the caller.
    pub inputs: serde_json::Value,

    /// Tool outputs as provided by the caller.
    pub outputs: serde_json::Value,

    /// When the activity was logged.
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a new activity record with a fresh ID and timestamp.
    #[must_use]
    pub fn new(
        user_id: UserId,
        tool_id: impl Into<String>,
        inputs: serde_json::Value,
        outputs: serde_json::Value,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            user_id,
            tool_id: tool_id.into(),
            inputs,
            outputs,
            created_at: Utc::now(),
        }
    }
}
