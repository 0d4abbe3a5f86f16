//! Wires the accumulator and rewriter together into the per-request
//! state machine, mirroring `polis_dlp::service`.

use crate::rewriter::{self, RewriteOutcome, BODY_MAX};
use polis_core::accumulator::Accumulator;
use polis_core::runtime::Runtime;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct OttService {
	runtime: Arc<Runtime>,
	time_gate: Duration,
}

pub struct RequestState {
	accumulator: Accumulator,
	host: Option<String>,
}

impl OttService {
	pub fn new(runtime: Arc<Runtime>, time_gate: Duration) -> Self {
		Self { runtime, time_gate }
	}

	pub fn init_request(&self, host: Option<String>) -> RequestState {
		RequestState { accumulator: Accumulator::new(BODY_MAX, 0), host }
	}

	pub fn on_chunk(&self, state: &mut RequestState, chunk: &[u8]) {
		state.accumulator.push(chunk);
	}

	#[instrument(skip_all, fields(host = state.host.as_deref().unwrap_or("")))]
	pub fn end_of_data(&self, state: &RequestState) -> RewriteOutcome {
		rewriter::rewrite(
			&self.runtime,
			self.time_gate.as_secs(),
			state.accumulator.total_len(),
			state.accumulator.head(),
			state.host.as_deref(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn on_chunk_feeds_the_accumulator() {
		let mut state = RequestState { accumulator: Accumulator::new(BODY_MAX, 0), host: Some("x".into()) };
		state.accumulator.push(b"/polis-approve req-0123abcd");
		assert_eq!(state.accumulator.head(), b"/polis-approve req-0123abcd");
	}
}
