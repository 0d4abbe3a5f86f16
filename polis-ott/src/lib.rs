//! The approval-rewrite REQMOD service: scans request bodies for an
//! approval link, mints a one-time token against the state store, and
//! substitutes it in place when the link is backed by a real pending
//! approval.

pub mod adapter;
pub mod rewriter;
pub mod service;
pub mod token;

pub use adapter::ServiceContext;
pub use rewriter::{RewriteOutcome, BODY_MAX, OTT_TTL_SECS};
pub use service::{OttService, RequestState};
