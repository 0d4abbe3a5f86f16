use thiserror::Error;

/// Errors raised by shared infrastructure. Component-specific errors
/// (pattern compilation, OTT validation) live in their own crates.
#[derive(Error, Debug)]
pub enum CoreError {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("state store unavailable: {0}")]
	StoreUnavailable(String),

	#[error("tls setup failed: {0}")]
	Tls(#[source] anyhow::Error),

	#[error("randomness source unavailable")]
	Randomness,
}
