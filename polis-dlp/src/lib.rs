//! The DLP REQMOD service: scans request bodies for credential material
//! and blocks requests to hosts the configured security level does not
//! trust, per the pattern configuration loaded at startup.

pub mod adapter;
pub mod pattern_store;
pub mod policy;
pub mod service;

pub use adapter::{build_block_response, BlockResponse, ServiceContext};
pub use pattern_store::{CredentialPattern, PatternStore, PatternStoreError};
pub use policy::Verdict;
pub use service::{DlpService, EndOfDataOutcome, RequestState};
