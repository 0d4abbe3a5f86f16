//! Exercises the approval-rewrite state machine against a `Runtime`
//! pointed at an unreachable state store, the way `polis_end_of_data`
//! would at the FFI boundary minus the boundary itself. The happy path
//! (existence check hits, mint succeeds) needs a live store and is out
//! of scope for these tests; the fail-closed paths below are what this
//! component promises regardless of store state.

use polis_core::config::RuntimeConfig;
use polis_core::runtime::Runtime;
use polis_ott::service::OttService;
use polis_ott::RewriteOutcome;
use std::sync::Arc;
use std::time::Duration;

fn unreachable_runtime() -> Arc<Runtime> {
	let dir = tempfile::tempdir().unwrap();
	let secret = dir.path().join("secret");
	let ca = dir.path().join("ca.pem");
	let cert = dir.path().join("client.pem");
	let key = dir.path().join("client-key.pem");
	std::fs::write(&secret, "hunter2\n").unwrap();
	std::fs::write(&ca, b"not a real cert").unwrap();
	std::fs::write(&cert, b"not a real cert").unwrap();
	std::fs::write(&key, b"not a real key").unwrap();

	let cfg = RuntimeConfig {
		state_host: "127.0.0.1".into(),
		state_port: 1,
		state_user: "polis".into(),
		state_password_file: secret,
		state_ca_path: ca,
		state_cert_path: cert,
		state_key_path: key,
		approval_time_gate: Duration::from_secs(15),
		dlp_config_path: "/dev/null".into(),
	};
	Arc::new(Runtime::new(&cfg).expect("connect() degrades to unreachable rather than erroring"))
}

#[test]
fn no_approval_link_passes_through() {
	let runtime = unreachable_runtime();
	let svc = OttService::new(runtime, Duration::from_secs(15));
	let mut state = svc.init_request(Some("chat.example".into()));
	svc.on_chunk(&mut state, b"an ordinary request body");
	assert_eq!(svc.end_of_data(&state), RewriteOutcome::PassThrough);
}

#[test]
fn malformed_request_id_passes_through() {
	let runtime = unreachable_runtime();
	let svc = OttService::new(runtime, Duration::from_secs(15));
	let mut state = svc.init_request(Some("chat.example".into()));
	svc.on_chunk(&mut state, b"/polis-approve req-ZZZZZZZZ");
	assert_eq!(svc.end_of_data(&state), RewriteOutcome::PassThrough);
}

#[test]
fn valid_link_fails_closed_when_store_is_unreachable() {
	let runtime = unreachable_runtime();
	let svc = OttService::new(runtime, Duration::from_secs(15));
	let mut state = svc.init_request(Some("chat.example".into()));
	svc.on_chunk(&mut state, b"please open /polis-approve req-0123abcd to continue");
	assert_eq!(svc.end_of_data(&state), RewriteOutcome::PassThrough);
}

#[test]
fn oversized_body_skips_scanning_entirely() {
	let runtime = unreachable_runtime();
	let svc = OttService::new(runtime, Duration::from_secs(15));
	let mut state = svc.init_request(Some("chat.example".into()));
	// Push past BODY_MAX so the size gate trips before any regex scan.
	svc.on_chunk(&mut state, &vec![b'a'; polis_ott::BODY_MAX + 1]);
	assert_eq!(svc.end_of_data(&state), RewriteOutcome::PassThrough);
}
