//! Core types for the credit ledger.
//!
//! This crate provides the foundational types used throughout the tool-store
//! credit ledger:
//!
//! - **Identifiers**: `UserId`, `EntryId`, `IdempotencyKey`
//! - **Accounts**: `Account` (balance + premium entitlement window)
//! - **Ledger**: `LedgerEntry`, `EntryKind`
//! - **Entitlement**: `EntitlementStatus` (lazy premium evaluation)
//! - **Pricing**: `CostTable` (per-model debit cost)
//!
//! # Credit unit
//!
//! Credits are whole units (a tool run costs 1 or 2 credits, a pack purchase
//! grants tens of credits). Balances are stored as `i64` and are never
//! allowed to go negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod entitlement;
pub mod entry;
pub mod error;
pub mod ids;
pub mod pricing;

pub use account::Account;
pub use entitlement::EntitlementStatus;
pub use entry::{EntryKind, LedgerEntry};
pub use error::{LedgerError, Result};
pub use ids::{EntryId, IdError, IdempotencyKey, UserId};
pub use pricing::CostTable;
