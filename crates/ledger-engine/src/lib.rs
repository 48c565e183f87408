//! Balance transaction engine.
//!
//! All balance mutation flows through [`TransactionEngine`]: it reads a
//! versioned account snapshot, runs a pure state-transition closure, and
//! conditionally commits the result together with its ledger entries. A lost
//! race retries the whole read-compute-commit cycle from scratch, bounded by
//! a small ceiling. The engine performs no network calls and holds no state
//! beyond the injected store handle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::sync::Arc;

use chrono::{Duration, Utc};

use ledger_core::{
    Account, EntitlementStatus, IdempotencyKey, LedgerEntry, LedgerError, Result, UserId,
};
use ledger_store::{Store, StoreError};

/// Maximum read-compute-commit attempts before surfacing `Contention`.
pub const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// The state transition produced by a mutation closure: the new account
/// state plus the ledger entries to append in the same atomic unit.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// The account state to commit.
    pub account: Account,

    /// Ledger entries appended atomically with the account write.
    pub entries: Vec<LedgerEntry>,
}

/// Executes atomic read-modify-write transactions against the ledger store.
pub struct TransactionEngine<S: Store> {
    store: Arc<S>,
}

impl<S: Store> TransactionEngine<S> {
    /// Create an engine backed by the given store handle.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run one atomic transaction for `user_id`.
    ///
    /// `mutate` receives the current account snapshot (`None` if absent) and
    /// must be pure: it may be called several times if the commit loses a
    /// race. Domain errors returned from `mutate` abort immediately without
    /// retry; only version conflicts are retried, up to
    /// [`MAX_COMMIT_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// - Any domain error raised by `mutate`, unchanged.
    /// - `LedgerError::DuplicateIdempotencyKey` if the key was applied before.
    /// - `LedgerError::Contention` when retries are exhausted.
    /// - `LedgerError::Storage` if the store is unreachable.
    pub fn apply<F>(
        &self,
        user_id: &UserId,
        idempotency_key: Option<&IdempotencyKey>,
        mutate: F,
    ) -> Result<Account>
    where
        F: Fn(Option<&Account>) -> Result<Mutation>,
    {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let snapshot = self
                .store
                .read_account(user_id)
                .map_err(map_store_error)?;

            let mutation = mutate(snapshot.account.as_ref())?;

            match self.store.commit(
                user_id,
                snapshot.version,
                &mutation.account,
                &mutation.entries,
                idempotency_key,
            ) {
                Ok(()) => return Ok(mutation.account),
                Err(StoreError::VersionConflict { expected, actual }) => {
                    tracing::debug!(
                        user_id = %user_id,
                        attempt,
                        expected,
                        actual,
                        "Commit lost race, retrying"
                    );
                }
                Err(err) => return Err(map_store_error(err)),
            }
        }

        tracing::warn!(
            user_id = %user_id,
            attempts = MAX_COMMIT_ATTEMPTS,
            "Transaction retries exhausted"
        );

        Err(LedgerError::Contention {
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }

    /// Consume `amount` credits for a billable action.
    ///
    /// Returns the remaining balance after the debit.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` unless `amount > 0`.
    /// - `LedgerError::AccountNotFound` if the user has no account; debits
    ///   never provision one.
    /// - `LedgerError::InsufficientCredits` if the balance cannot cover the
    ///   debit. The transaction aborts with zero writes.
    pub fn debit(&self, user_id: &UserId, amount: i64, context: &str) -> Result<i64> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let context = context.to_string();
        let account = self.apply(user_id, None, |current| {
            let current = current.ok_or_else(|| LedgerError::AccountNotFound {
                user_id: user_id.to_string(),
            })?;

            if !current.has_sufficient_credits(amount) {
                return Err(LedgerError::InsufficientCredits {
                    balance: current.credits_remaining,
                    required: amount,
                });
            }

            let mut account = current.clone();
            account.credits_remaining -= amount;
            account.updated_at = Utc::now();

            let entry = LedgerEntry::debit(user_id.clone(), amount, context.clone());

            Ok(Mutation {
                account,
                entries: vec![entry],
            })
        })?;

        tracing::info!(
            user_id = %user_id,
            amount,
            remaining = account.credits_remaining,
            "Debit committed"
        );

        Ok(account.credits_remaining)
    }

    /// Add `amount` credits from a confirmed purchase.
    ///
    /// A first purchase provisions the account. When
    /// `premium_extension_days` is positive, the premium window is set to
    /// `now + days` — replacing any remaining window rather than extending
    /// it; repeated purchases do not stack time.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` unless `amount > 0` (checked before
    ///   any storage access), or if the credited balance or premium expiry
    ///   would overflow.
    /// - `LedgerError::DuplicateIdempotencyKey` if this purchase event was
    ///   already applied.
    pub fn credit(
        &self,
        user_id: &UserId,
        amount: i64,
        details: &str,
        idempotency_key: &IdempotencyKey,
        premium_extension_days: Option<i64>,
    ) -> Result<Account> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        // Fast-path rejection; the commit enforces the same check atomically.
        if let Some(record) = self
            .store
            .get_idempotency_record(idempotency_key)
            .map_err(map_store_error)?
        {
            tracing::info!(
                user_id = %user_id,
                key = %idempotency_key,
                applied_at = %record.applied_at,
                "Purchase event already applied"
            );
            return Err(LedgerError::DuplicateIdempotencyKey {
                key: idempotency_key.to_string(),
            });
        }

        let details = details.to_string();
        let account = self.apply(user_id, Some(idempotency_key), |current| {
            let now = Utc::now();
            let mut account = current
                .cloned()
                .unwrap_or_else(|| Account::new(user_id.clone()));

            account.credits_remaining = account
                .credits_remaining
                .checked_add(amount)
                .ok_or(LedgerError::InvalidAmount(amount))?;
            account.updated_at = now;

            if let Some(days) = premium_extension_days.filter(|days| *days > 0) {
                let expires = Duration::try_days(days)
                    .and_then(|window| now.checked_add_signed(window))
                    .ok_or(LedgerError::InvalidAmount(days))?;
                account.is_premium = true;
                account.premium_expires = Some(expires);
            }

            let entry = LedgerEntry::purchase(user_id.clone(), amount, details.clone());

            Ok(Mutation {
                account,
                entries: vec![entry],
            })
        })?;

        tracing::info!(
            user_id = %user_id,
            amount,
            balance = account.credits_remaining,
            is_premium = account.is_premium,
            "Purchase credited"
        );

        Ok(account)
    }

    /// Read-only account fetch for callers that display balance state.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the user has no account.
    pub fn account(&self, user_id: &UserId) -> Result<Account> {
        self.store
            .read_account(user_id)
            .map_err(map_store_error)?
            .account
            .ok_or_else(|| LedgerError::AccountNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Evaluate the user's premium entitlement at the current instant.
    ///
    /// Pure read: expiry is resolved lazily, no write ever happens here.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the user has no account.
    pub fn entitlement(&self, user_id: &UserId) -> Result<EntitlementStatus> {
        let account = self.account(user_id)?;
        Ok(EntitlementStatus::evaluate(&account, Utc::now()))
    }

    /// The underlying store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

fn map_store_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::DuplicateKey { key } => LedgerError::DuplicateIdempotencyKey { key },
        StoreError::VersionConflict { .. }
        | StoreError::Database(_)
        | StoreError::Serialization(_) => LedgerError::Storage(err.to_string()),
    }
}
