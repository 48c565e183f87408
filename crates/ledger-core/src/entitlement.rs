//! Premium entitlement evaluation.
//!
//! Premium status is derived from the stored expiry timestamp at read time.
//! Expiry is implicit: `is_premium` is never eagerly flipped back to false,
//! and nothing here caches or writes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Account;

/// A point-in-time entitlement snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitlementStatus {
    /// Whether the account is premium at the evaluated instant.
    pub is_premium: bool,

    /// The stored expiry, if a premium window was ever granted.
    pub premium_expires: Option<DateTime<Utc>>,
}

impl EntitlementStatus {
    /// Evaluate premium status at `now`.
    ///
    /// Returns premium only when the flag is set and the expiry is strictly
    /// in the future.
    #[must_use]
    pub fn evaluate(account: &Account, now: DateTime<Utc>) -> Self {
        let is_premium = account.is_premium
            && account.premium_expires.is_some_and(|expires| expires > now);

        Self {
            is_premium,
            premium_expires: account.premium_expires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::UserId;

    fn account() -> Account {
        Account::new(UserId::new("user-1").unwrap())
    }

    #[test]
    fn non_premium_account() {
        let now = Utc::now();
        assert!(!EntitlementStatus::evaluate(&account(), now).is_premium);
    }

    #[test]
    fn premium_with_future_expiry() {
        let now = Utc::now();
        let mut account = account();
        account.is_premium = true;
        account.premium_expires = Some(now + Duration::days(30));

        assert!(EntitlementStatus::evaluate(&account, now).is_premium);
    }

    #[test]
    fn premium_lapses_after_expiry_without_write() {
        let now = Utc::now();
        let mut account = account();
        account.is_premium = true;
        account.premium_expires = Some(now + Duration::days(30));

        // Simulated clock advance past the expiry: no mutation, just a later `now`.
        let later = now + Duration::days(31);
        let status = EntitlementStatus::evaluate(&account, later);
        assert!(!status.is_premium);

        // The stored flag is untouched; expiry is implicit.
        assert!(account.is_premium);
    }

    #[test]
    fn premium_flag_without_expiry_is_not_premium() {
        let mut account = account();
        account.is_premium = true;

        assert!(!EntitlementStatus::evaluate(&account, Utc::now()).is_premium);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let mut account = account();
        account.is_premium = true;
        account.premium_expires = Some(now);

        assert!(!EntitlementStatus::evaluate(&account, now).is_premium);
    }
}
