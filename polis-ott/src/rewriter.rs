//! The approval-rewrite state machine: scan for an approval link,
//! validate its request id, confirm a matching blocked entry exists,
//! mint an OTT, store it with collision retry, audit, and substitute it
//! back into the body in place.

use crate::token::{self, APPROVAL_SCAN};
use polis_core::records::{self, AuditEvent, OttEntry};
use polis_core::runtime::Runtime;
use tracing::{debug, warn};

pub const BODY_MAX: usize = 2 * 1024 * 1024;
pub const OTT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
	/// No rewrite performed; forward the body unmodified.
	PassThrough,
	/// Substitution succeeded; caller should forward this body.
	Rewritten(Vec<u8>),
}

/// Runs the full state machine over the accumulated head buffer. `host`
/// is the captured `Host` header. `total_len` is the accumulator's
/// total observed length, used for the size gate, which must see the
/// true total even though only `head` is scanned.
pub fn rewrite(runtime: &Runtime, time_gate_secs: u64, total_len: usize, head: &[u8], host: Option<&str>) -> RewriteOutcome {
	if total_len > BODY_MAX {
		debug!(total_len, "body exceeds BODY_MAX; skipping OTT scan");
		return RewriteOutcome::PassThrough;
	}

	let Some(caps) = APPROVAL_SCAN.captures(head) else {
		return RewriteOutcome::PassThrough;
	};
	let Some(matched) = caps.get(1) else {
		return RewriteOutcome::PassThrough;
	};
	let request_id_bytes = matched.as_bytes();

	if !token::is_valid_request_id(request_id_bytes) {
		debug!("captured request id failed validation");
		return RewriteOutcome::PassThrough;
	}
	let request_id = String::from_utf8_lossy(request_id_bytes).into_owned();

	let exists = runtime.with_store(|store| store.exists(&records::blocked_entry_key(&request_id)));
	if !exists {
		debug!(request_id, "no matching blocked entry; passing through");
		return RewriteOutcome::PassThrough;
	}

	let Some(origin_host) = host else {
		debug!("no Host header captured; passing through");
		return RewriteOutcome::PassThrough;
	};

	let Some((ott_code, entry)) = mint_and_store(runtime, &request_id, origin_host, time_gate_secs) else {
		warn!(request_id, "OTT mint/store failed; passing through unmodified");
		return RewriteOutcome::PassThrough;
	};

	audit(runtime, &entry);

	let start = matched.start();
	let end = matched.end();
	if ott_code.len() != end - start {
		warn!(request_id, "OTT length mismatch with captured request id; aborting rewrite");
		return RewriteOutcome::PassThrough;
	}

	let mut rewritten = head.to_vec();
	rewritten[start..end].copy_from_slice(ott_code.as_bytes());
	RewriteOutcome::Rewritten(rewritten)
}

/// Generates an OTT and stores it with `NX EX`, retrying once on
/// collision. Returns `None` on RNG failure or two collisions in a row.
fn mint_and_store(runtime: &Runtime, request_id: &str, origin_host: &str, time_gate_secs: u64) -> Option<(String, OttEntry)> {
	for attempt in 0..2 {
		let ott_code = match token::generate_ott() {
			Ok(code) => code,
			Err(_) => {
				warn!("system RNG unavailable; aborting OTT mint");
				return None;
			},
		};
		let now = records::now_epoch_secs();
		let entry = OttEntry {
			ott_code: ott_code.clone(),
			request_id: request_id.to_string(),
			armed_after: now + time_gate_secs,
			origin_host: origin_host.to_string(),
		};
		let payload = serde_json::to_string(&entry).expect("OttEntry always serializes");

		let set_result = runtime.with_store(|store| store.set_nx_ex(&records::ott_entry_key(&ott_code), &payload, OTT_TTL_SECS));
		match set_result {
			Some(true) => return Some((ott_code, entry)),
			Some(false) => {
				debug!(attempt, "OTT collision, retrying");
				continue;
			},
			None => {
				warn!("state store unreachable during OTT store");
				return None;
			},
		}
	}
	warn!(request_id, "two OTT collisions in a row; failing closed");
	None
}

fn audit(runtime: &Runtime, entry: &OttEntry) {
	let now = records::now_epoch_secs();
	let event = AuditEvent::ott_minted(entry, now);
	let Ok(payload) = serde_json::to_string(&event) else {
		warn!("failed to serialize audit event");
		return;
	};
	let result = runtime.with_store(|store| store.zadd(records::AUDIT_LOG_KEY, now, &payload));
	if let Err(e) = result {
		warn!(error = %e, "audit log write failed; mint already committed");
	}
}
