//! JSON record shapes written to the state store. Kept here, rather than
//! in `polis-ott`, because the DLP side's diagnostics may one day want to
//! read them back; neither record ever carries credential material.

use serde::{Deserialize, Serialize};

pub fn blocked_entry_key(request_id: &str) -> String {
	format!("polis:blocked:{request_id}")
}

pub fn ott_entry_key(ott_code: &str) -> String {
	format!("polis:ott:{ott_code}")
}

pub const AUDIT_LOG_KEY: &str = "polis:log:events";
pub const SECURITY_LEVEL_KEY: &str = "polis:config:security_level";

/// The value stored under `polis:ott:<ott_code>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OttEntry {
	pub ott_code: String,
	pub request_id: String,
	pub armed_after: u64,
	pub origin_host: String,
}

/// One record appended to `polis:log:events` per successful OTT mint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
	pub event: &'static str,
	pub ott_code: String,
	pub request_id: String,
	pub origin_host: String,
	pub armed_after: u64,
	pub timestamp: u64,
}

impl AuditEvent {
	pub fn ott_minted(entry: &OttEntry, timestamp: u64) -> Self {
		Self {
			event: "ott_minted",
			ott_code: entry.ott_code.clone(),
			request_id: entry.request_id.clone(),
			origin_host: entry.origin_host.clone(),
			armed_after: entry.armed_after,
			timestamp,
		}
	}
}

/// Seconds since the Unix epoch, as used for TTLs and audit scores.
pub fn now_epoch_secs() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_formats_match_the_wire_contract() {
		assert_eq!(blocked_entry_key("req-abc12345"), "polis:blocked:req-abc12345");
		assert_eq!(ott_entry_key("ott-AbCdEfGh"), "polis:ott:ott-AbCdEfGh");
	}

	#[test]
	fn audit_event_carries_no_extra_fields_beyond_the_contract() {
		let entry = OttEntry {
			ott_code: "ott-AbCdEfGh".into(),
			request_id: "req-abc12345".into(),
			armed_after: 1000,
			origin_host: "chat.example".into(),
		};
		let event = AuditEvent::ott_minted(&entry, 985);
		let json = serde_json::to_value(&event).unwrap();
		let obj = json.as_object().unwrap();
		assert_eq!(obj.len(), 5);
		assert_eq!(obj["event"], "ott_minted");
	}
}
