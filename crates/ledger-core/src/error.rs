//! Error types for the credit ledger.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by ledger operations.
///
/// Policy rejections (`InsufficientCredits`, `InvalidAmount`,
/// `DuplicateIdempotencyKey`, `AccountNotFound`) are expected business
/// outcomes and are never retried. `Contention` is transient and only
/// surfaced after the engine exhausts its retry budget.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Insufficient credits to cover a debit.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance in credits.
        balance: i64,
        /// Required amount in credits.
        required: i64,
    },

    /// No account exists for the user. Debits never provision accounts.
    #[error("account not found: {user_id}")]
    AccountNotFound {
        /// The user ID that was not found.
        user_id: String,
    },

    /// Zero or negative amount, rejected before any storage access.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// A purchase with this idempotency key was already applied.
    #[error("duplicate idempotency key: {key}")]
    DuplicateIdempotencyKey {
        /// The key that was replayed.
        key: String,
    },

    /// Optimistic-concurrency retries exhausted; the caller may retry.
    #[error("transaction contention after {attempts} attempts")]
    Contention {
        /// Number of commit attempts made.
        attempts: u32,
    },

    /// The underlying store failed or is unreachable.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
