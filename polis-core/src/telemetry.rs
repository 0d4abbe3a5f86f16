//! Logging setup. This core is a callback plugin loaded into a host
//! process, not a long-running server with its own log-shipping
//! concerns, so a plain `tracing-subscriber` `fmt` layer driven by
//! `RUST_LOG` is enough.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Idempotent: safe to call from every service's `init-service` callback
/// even if the host framework loads more than one REQMOD module into the
/// same process.
pub fn init_logging() {
	INIT.call_once(|| {
		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
			.with_writer(std::io::stderr)
			.with_ansi(false)
			.init();
	});
}
