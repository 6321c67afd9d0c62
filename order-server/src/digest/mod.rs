//! Sales digest: build (pt-BR), dispatch, schedule
//!
//! ```text
//! scheduler / manual trigger → stats::daily_snapshot → builder::build → DigestDispatcher::send
//! ```

pub mod builder;
pub mod dispatcher;
pub mod scheduler;
pub mod service;

pub use builder::Digest;
pub use dispatcher::{
    DEFAULT_API_URL, DigestDispatcher, DispatchError, HttpMessageChannel, MessageChannel,
    Recipient,
};
pub use scheduler::DigestScheduler;
pub use service::DigestService;
