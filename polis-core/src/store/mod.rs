//! The external state store: a single mutually-authenticated TLS
//! connection, guarded by a process-wide mutex, plus the amortized
//! security-level poller that rides on top of it.

pub mod client;
pub mod poller;

pub use client::{StateStoreClient, StoreLookup};
pub use poller::SecurityLevelPoller;
