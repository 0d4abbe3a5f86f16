//! The process-wide `Runtime`: the single owned value that replaces the
//! legacy module's global mutable state (cached security level, polling
//! counters, store connection). One [`std::sync::Mutex`] guards both the
//! connection and the poller state together, since they are always
//! mutated as one step.

use crate::config::RuntimeConfig;
use crate::security_level::SecurityLevel;
use crate::store::client::StateStoreClient;
use crate::store::poller::SecurityLevelPoller;
use std::sync::Mutex;

struct RuntimeInner {
	store: StateStoreClient,
	poller: SecurityLevelPoller,
}

pub struct Runtime {
	inner: Mutex<RuntimeInner>,
}

impl Runtime {
	/// Connects the state-store client (non-fatal if it fails) and starts
	/// the poller at its default, unpolled state.
	pub fn new(cfg: &RuntimeConfig) -> Result<Self, crate::error::CoreError> {
		let store = StateStoreClient::connect(cfg)?;
		Ok(Self {
			inner: Mutex::new(RuntimeInner { store, poller: SecurityLevelPoller::default() }),
		})
	}

	/// Runs one amortized poll tick and returns the (possibly cached)
	/// current security level. Called once per DLP request.
	pub fn current_security_level(&self) -> SecurityLevel {
		let mut guard = self.inner.lock().expect("runtime mutex poisoned");
		let inner = &mut *guard;
		inner.poller.tick(&mut inner.store)
	}

	/// Grants exclusive access to the store connection for the duration of
	/// `f`, e.g. for the OTT rewriter's existence-check/mint/store/audit
	/// sequence, which must run as one critical section.
	pub fn with_store<R>(&self, f: impl FnOnce(&mut StateStoreClient) -> R) -> R {
		let mut guard = self.inner.lock().expect("runtime mutex poisoned");
		f(&mut guard.store)
	}
}
