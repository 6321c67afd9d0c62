//! Data models
//!
//! Shared between order-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod history;
pub mod order;
pub mod stats;

// Re-exports
pub use history::*;
pub use order::*;
pub use stats::*;
