//! Wires the pattern store, accumulator, and runtime-held security
//! level together into the per-request state machine. This module has
//! no knowledge of the host framework's FFI shape — that lives in
//! [`crate::adapter`] — so it can be driven directly from tests.

use crate::pattern_store::PatternStore;
use crate::policy::{self, Verdict};
use polis_core::accumulator::Accumulator;
use polis_core::runtime::Runtime;
use std::sync::Arc;
use tracing::instrument;

pub const HEAD_MAX: usize = 1024 * 1024;
pub const TAIL_MAX: usize = 10 * 1024;

pub struct DlpService {
	patterns: Arc<PatternStore>,
	runtime: Arc<Runtime>,
}

pub struct RequestState {
	accumulator: Accumulator,
	host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOfDataOutcome {
	Allow,
	Block { reason: String },
}

impl DlpService {
	pub fn new(patterns: Arc<PatternStore>, runtime: Arc<Runtime>) -> Self {
		Self { patterns, runtime }
	}

	pub fn init_request(&self, host: Option<String>) -> RequestState {
		RequestState { accumulator: Accumulator::new(HEAD_MAX, TAIL_MAX), host }
	}

	pub fn on_chunk(&self, state: &mut RequestState, chunk: &[u8]) {
		state.accumulator.push(chunk);
	}

	#[instrument(skip_all, fields(host = state.host.as_deref().unwrap_or("")))]
	pub fn end_of_data(&self, state: &RequestState) -> EndOfDataOutcome {
		let level = self.runtime.current_security_level();
		let tail = state.accumulator.tail();
		let verdict = policy::evaluate(&self.patterns, state.accumulator.head(), &tail, state.host.as_deref(), level);
		match verdict {
			Verdict::Allow => EndOfDataOutcome::Allow,
			Verdict::Block { reason } => {
				tracing::info!(reason = %reason, "blocking request");
				EndOfDataOutcome::Block { reason }
			},
		}
	}
}
