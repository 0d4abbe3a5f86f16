// Copyright polis Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared, framework-agnostic primitives used by both REQMOD services:
//! the streaming body accumulator, the known-host matcher, the security
//! level and its poller, the state-store client, and the audit record
//! types. Nothing in this crate knows about credential regexes, OTT
//! tokens, or HTTP response construction — that lives in `polis-dlp`
//! and `polis-ott`.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod host_match;
pub mod records;
pub mod runtime;
pub mod security_level;
pub mod store;
pub mod telemetry;

pub mod prelude {
	pub use crate::error::CoreError;
	pub use std::sync::{Arc, Mutex};
	pub use std::time::{Duration, Instant};
	pub use tracing::{debug, error, info, trace, warn};
}
