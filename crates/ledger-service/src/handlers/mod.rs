//! API handlers.

pub mod activity;
pub mod credits;
pub mod health;
pub mod tools;
pub mod webhooks;
