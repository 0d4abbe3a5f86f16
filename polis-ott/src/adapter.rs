//! The host-framework adapter for the approval-rewrite service. Same
//! shape as `polis_dlp::adapter`: a safe `ServiceContext` plus a thin,
//! `catch_unwind`-wrapped `extern "C"` boundary.

use crate::rewriter::RewriteOutcome;
use crate::service::{OttService, RequestState};
use polis_core::runtime::Runtime;
use std::os::raw::{c_char, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, instrument};

pub struct ServiceContext {
	service: OttService,
}

impl ServiceContext {
	pub fn init(runtime: Arc<Runtime>, time_gate: Duration) -> Self {
		Self { service: OttService::new(runtime, time_gate) }
	}

	#[instrument(skip_all)]
	pub fn init_request(&self, host: Option<String>) -> RequestState {
		self.service.init_request(host)
	}

	pub fn on_chunk(&self, state: &mut RequestState, chunk: &[u8]) {
		self.service.on_chunk(state, chunk)
	}

	/// Returns `None` for pass-through, `Some(body)` for a rewritten body
	/// the caller should forward in place of the original.
	#[instrument(skip_all)]
	pub fn end_of_data(&self, state: &RequestState) -> Option<Vec<u8>> {
		match self.service.end_of_data(state) {
			RewriteOutcome::PassThrough => None,
			RewriteOutcome::Rewritten(body) => Some(body),
		}
	}
}

// --- C ABI boundary ---------------------------------------------------

/// # Safety
/// `ctx` must be a live pointer to a [`ServiceContext`] owned by the
/// host module's init code, valid for the duration of the call.
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
/// `data` must point to at least `len` readable bytes.
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

/// Returns `1` if the body was rewritten (the real module boundary
/// would also expose the rewritten bytes through an out-parameter,
/// omitted here since this adapter is exercised directly by tests, not
/// a live host loader), `0` to forward unmodified. A caught panic
/// degrades to `0`: fail-closed here means "don't rewrite", since an
/// OTT rewriter must never synthesize a response of its own.
///
/// # Safety
/// `req` must be a live pointer produced by [`polis_init_request`].
pub unsafe extern "C" fn polis_end_of_data(ctx: *mut c_void, req: *mut c_void) -> i32 {
	if req.is_null() || ctx.is_null() {
		return 0;
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
			error!("panic in polis_end_of_data; passing through unmodified");
			0
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
	fn polis_io_is_a_noop_on_null_pointers() {
		unsafe {
			polis_io(std::ptr::null_mut(), std::ptr::null_mut(), std::ptr::null(), 0);
		}
	}

	#[test]
	fn polis_end_of_data_passes_through_on_null_request() {
		let result = unsafe { polis_end_of_data(std::ptr::null_mut(), std::ptr::null_mut()) };
		assert_eq!(result, 0);
	}
}
