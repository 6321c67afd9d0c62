//! Order lifecycle module
//!
//! - **lifecycle**: create / update / delete with atomic archival on settlement
//! - **money**: decimal arithmetic and line item validation
//!
//! # Data Flow
//!
//! ```text
//! Request → LifecycleManager → validate → transaction
//!                                 ├─ orders / order_items write
//!                                 └─ history snapshot (pending → paid|cancelled)
//! ```

pub mod lifecycle;
pub mod money;

// Re-exports
pub use lifecycle::{LifecycleManager, should_archive};
