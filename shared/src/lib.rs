//! Shared types for the order tracker
//!
//! Data models exchanged between the order server and its clients
//! (HTTP JSON bodies), plus small utilities used on both sides.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
