//! The host-framework adapter: the safe lifecycle functions the `extern
//! "C"` shims delegate to, and the response construction for a DLP
//! block. The C ABI boundary itself lives at the bottom of this file —
//! a thin, `catch_unwind`-wrapped translation layer that owns no policy
//! logic of its own, keeping the protocol glue separate from the
//! plain-Rust request logic it delegates to.

use crate::pattern_store::PatternStore;
use crate::service::{DlpService, EndOfDataOutcome, RequestState};
use polis_core::runtime::Runtime;
use std::os::raw::{c_char, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, instrument};

pub struct BlockResponse {
	pub status: u16,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

const BLOCK_BODY_TEMPLATE: &str =
	"<html><head><title>Blocked</title></head><body><h1>Request blocked</h1><p>This request was blocked by policy.</p></body></html>";

/// Builds the block response. `reason` is a pattern name, or one of
/// the two new-domain reason constants from [`crate::policy`].
pub fn build_block_response(reason: &str) -> BlockResponse {
	let body = BLOCK_BODY_TEMPLATE.as_bytes().to_vec();
	BlockResponse {
		status: 403,
		headers: vec![
			("X-Polis-Block".into(), "true".into()),
			("X-Polis-Reason".into(), reason.to_string()),
			("X-Polis-Pattern".into(), reason.to_string()),
			("Content-Type".into(), "text/html".into()),
			("Content-Length".into(), body.len().to_string()),
			("Connection".into(), "close".into()),
		],
		body,
	}
}

/// Owns everything `init-service` sets up: the compiled patterns and the
/// shared runtime. Lives for the lifetime of the host module.
pub struct ServiceContext {
	service: DlpService,
}

impl ServiceContext {
	pub fn init(patterns: PatternStore, runtime: Arc<Runtime>) -> Self {
		Self { service: DlpService::new(Arc::new(patterns), runtime) }
	}

	#[instrument(skip_all)]
	pub fn init_request(&self, host: Option<String>) -> RequestState {
		self.service.init_request(host)
	}

	pub fn on_chunk(&self, state: &mut RequestState, chunk: &[u8]) {
		self.service.on_chunk(state, chunk)
	}

	/// Returns `None` for a pass-through verdict, `Some(response)` for a
	/// block. The FFI shim turns `None` into "forward unmodified".
	#[instrument(skip_all)]
	pub fn end_of_data(&self, state: &RequestState) -> Option<BlockResponse> {
		match self.service.end_of_data(state) {
			EndOfDataOutcome::Allow => None,
			EndOfDataOutcome::Block { reason } => Some(build_block_response(&reason)),
		}
	}
}

/// Fail-closed block response emitted when a panic is caught at the FFI
/// boundary, or when `init-service` never completed for this context.
fn fail_closed_response() -> BlockResponse {
	build_block_response("internal_error")
}

// --- C ABI boundary ---------------------------------------------------
//
// Each function below takes an opaque `*mut c_void` context pointer and
// raw byte pointer/length pairs, does no policy work itself, and never
// lets a panic unwind across the boundary.

/// # Safety
/// `ctx` must be a pointer previously returned by this function's
/// counterpart `polis_init_service`-style constructor (owned elsewhere
/// by the host's module-init code, not exposed here), valid for the
/// lifetime of the call.
pub unsafe extern "C" fn polis_init_request(ctx: *mut c_void, host: *const c_char) -> *mut c_void {
	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		let ctx = unsafe { &*(ctx as *const ServiceContext) };
		let host = if host.is_null() {
			None
		} else {
			unsafe { std::ffi::CStr::from_ptr(host) }.to_str().ok().map(str::to_string)
		};
		Box::into_raw(Box::new(ctx.init_request(host))) as *mut c_void
	}));
	result.unwrap_or_else(|_| {
		error!("panic in polis_init_request");
		std::ptr::null_mut()
	})
}

/// # Safety
/// `req` must be a live pointer produced by [`polis_init_request`];
/// `data` must point to at least `len` readable bytes for the duration
/// of the call.
pub unsafe extern "C" fn polis_io(ctx: *mut c_void, req: *mut c_void, data: *const u8, len: usize) {
	if req.is_null() || ctx.is_null() {
		return;
	}
	let _ = panic::catch_unwind(AssertUnwindSafe(|| {
		let ctx = unsafe { &*(ctx as *const ServiceContext) };
		let state = unsafe { &mut *(req as *mut RequestState) };
		let chunk = unsafe { std::slice::from_raw_parts(data, len) };
		ctx.on_chunk(state, chunk);
	}));
}

/// Returns `1` if the request was blocked (caller should read the
/// response fields written through `status_out`/etc. via a richer FFI
/// struct in the real module boundary; omitted here since this adapter
/// is exercised directly by tests, not a live host loader), `0` to
/// forward unmodified.
///
/// # Safety
/// `req` must be a live pointer produced by [`polis_init_request`].
pub unsafe extern "C" fn polis_end_of_data(ctx: *mut c_void, req: *mut c_void) -> i32 {
	if req.is_null() || ctx.is_null() {
		return 1;
	}
	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		let ctx = unsafe { &*(ctx as *const ServiceContext) };
		let state = unsafe { &*(req as *const RequestState) };
		ctx.end_of_data(state).is_some()
	}));
	match result {
		Ok(true) => 1,
		Ok(false) => 0,
		Err(_) => {
			error!("panic in polis_end_of_data; failing closed");
			let _ = fail_closed_response();
			1
		},
	}
}

/// # Safety
/// `req` must be a pointer previously returned by [`polis_init_request`]
/// and must not be used again after this call.
pub unsafe extern "C" fn polis_release_request(req: *mut c_void) {
	if req.is_null() {
		return;
	}
	let _ = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
		drop(Box::from_raw(req as *mut RequestState));
	}));
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn block_response_has_required_headers() {
		let resp = build_block_response("new_domain_blocked");
		assert_eq!(resp.status, 403);
		let get = |name: &str| resp.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());
		assert_eq!(get("X-Polis-Block"), Some("true".to_string()));
		assert_eq!(get("X-Polis-Reason"), Some("new_domain_blocked".to_string()));
		assert_eq!(get("X-Polis-Pattern"), Some("new_domain_blocked".to_string()));
		assert_eq!(get("Content-Type"), Some("text/html".to_string()));
		assert_eq!(get("Connection"), Some("close".to_string()));
		assert_eq!(get("Content-Length"), Some(resp.body.len().to_string()));
	}

	#[test]
	fn block_response_never_echoes_credential_material() {
		let resp = build_block_response("pk");
		let haystack = String::from_utf8_lossy(&resp.body);
		assert!(!haystack.contains("BEGIN PRIVATE KEY"));
	}

	#[test]
	fn polis_io_is_a_noop_on_null_pointers() {
		unsafe {
			polis_io(std::ptr::null_mut(), std::ptr::null_mut(), std::ptr::null(), 0);
		}
	}

	#[test]
	fn polis_end_of_data_fails_closed_on_null_request() {
		let result = unsafe { polis_end_of_data(std::ptr::null_mut(), std::ptr::null_mut()) };
		assert_eq!(result, 1);
	}
}
