//! Amortized polling of the security level. Called from every request
//! thread; only actually hits the state store every `poll_interval`
//! calls, with exponential backoff on failure. The mutex discipline that
//! makes "single outstanding poll" true lives in [`crate::runtime`],
//! which owns both this state and the store connection under one lock.

use crate::records::SECURITY_LEVEL_KEY;
use crate::security_level::SecurityLevel;
use crate::store::client::{StateStoreClient, StoreLookup};

pub const POLL_MIN: u64 = 1;
pub const POLL_MAX: u64 = 256;

#[derive(Debug)]
pub struct SecurityLevelPoller {
	request_counter: u64,
	poll_interval: u64,
	current_level: SecurityLevel,
}

impl Default for SecurityLevelPoller {
	fn default() -> Self {
		Self {
			request_counter: 0,
			poll_interval: POLL_MIN,
			current_level: SecurityLevel::default(),
		}
	}
}

impl SecurityLevelPoller {
	pub fn poll_interval(&self) -> u64 {
		self.poll_interval
	}

	pub fn current_level(&self) -> SecurityLevel {
		self.current_level
	}

	/// Called once per request under the runtime mutex. Increments the
	/// counter and, if this call lands on the poll boundary, fetches the
	/// key and updates `current_level` and `poll_interval` accordingly.
	/// Always returns the (possibly just-refreshed) cached level.
	pub fn tick(&mut self, store: &mut StateStoreClient) -> SecurityLevel {
		self.request_counter = self.request_counter.wrapping_add(1);
		if self.request_counter % self.poll_interval != 0 {
			return self.current_level;
		}

		match store.get(SECURITY_LEVEL_KEY) {
			StoreLookup::Found(raw) => {
				self.current_level = SecurityLevel::parse(&raw);
				self.poll_interval = POLL_MIN;
			},
			StoreLookup::Missing => {
				// A confirmed answer, not a failure: an absent key means
				// Balanced. The store is reachable, so this resets backoff
				// the same as a successful lookup.
				self.current_level = SecurityLevel::default();
				self.poll_interval = POLL_MIN;
			},
			StoreLookup::Unreachable => {
				self.poll_interval = (self.poll_interval.saturating_mul(2)).min(POLL_MAX);
			},
		}
		self.current_level
	}
}
