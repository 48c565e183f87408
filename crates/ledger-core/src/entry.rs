//! Ledger entry types.
//!
//! Every balance-affecting event appends exactly one entry, committed in the
//! same atomic unit as the balance change. Entries are write-once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntryId, UserId};

/// An immutable record of one balance-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID (ULID for time-ordering).
    pub id: EntryId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// What kind of event this was.
    pub kind: EntryKind,

    /// Signed amount: negative for debits, positive for purchases.
    pub amount: i64,

    /// Free-text context: the billed model for a debit, the pack description
    /// for a purchase.
    pub details: String,

    /// When the entry was created (server-assigned).
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a debit entry. The stored amount is always negative.
    #[must_use]
    pub fn debit(user_id: UserId, amount: i64, details: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            user_id,
            kind: EntryKind::Debit,
            amount: -amount.abs(),
            details: details.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a purchase entry. The stored amount is always positive.
    #[must_use]
    pub fn purchase(user_id: UserId, amount: i64, details: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            user_id,
            kind: EntryKind::Purchase,
            amount: amount.abs(),
            details: details.into(),
            created_at: Utc::now(),
        }
    }
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Credits consumed by a billable tool run.
    Debit,

    /// Credits granted by a confirmed purchase.
    Purchase,
}

impl EntryKind {
    /// The wire name of the kind, matching its serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Purchase => "purchase",
        }
    }
}
