//! Account types for the credit ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A per-user credit account.
///
/// The account caches the current balance and premium entitlement window.
/// The ledger entries are the source of truth: the sum of all entry amounts
/// for a user must equal `credits_remaining` after every committed
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The user this account belongs to.
    pub user_id: UserId,

    /// Current credit balance. Never negative after a committed transaction.
    pub credits_remaining: i64,

    /// Whether a premium entitlement has been purchased.
    ///
    /// Only meaningful while `premium_expires` is in the future; staleness
    /// is resolved at read time, never by a background job.
    pub is_premium: bool,

    /// When the premium entitlement window ends, if one was ever granted.
    pub premium_expires: Option<DateTime<Utc>>,

    /// When the account was created. Set once, on first purchase.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance and no entitlement.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            credits_remaining: 0,
            is_premium: false,
            premium_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the account can cover a debit of `amount` credits.
    #[must_use]
    pub fn has_sufficient_credits(&self, amount: i64) -> bool {
        self.credits_remaining >= amount
    }
}
