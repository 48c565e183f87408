//! Tool-store credit ledger HTTP API service.
//!
//! This crate provides the HTTP surface over the credit ledger:
//!
//! - Tool execution with atomic credit debiting
//! - Purchase webhook crediting (idempotent)
//! - Balance, ledger history, and entitlement reads
//! - Premium-gated activity logging
//!
//! # Authentication
//!
//! End-user requests carry an identity-provider JWT validated against the
//! provider's JWKS endpoint. The purchase webhook is unauthenticated here;
//! provider signature verification happens upstream of this service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
