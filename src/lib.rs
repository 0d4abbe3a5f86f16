//! Thin re-export crate: a single place to pull in both REQMOD
//! services for a host module that wants to register both adaptations
//! (DLP scanning and approval-link rewriting) from one binary.

pub use polis_core as core;
pub use polis_dlp as dlp;
pub use polis_ott as ott;
