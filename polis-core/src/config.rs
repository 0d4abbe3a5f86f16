//! Process-wide runtime configuration, read once at `init-service` from
//! environment variables. Keeping this in one place avoids scattering
//! `std::env::var` calls through the policy engines.

use crate::error::CoreError;
use std::path::PathBuf;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
	std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
	pub state_host: String,
	pub state_port: u16,
	pub state_user: String,
	pub state_password_file: PathBuf,
	pub state_ca_path: PathBuf,
	pub state_cert_path: PathBuf,
	pub state_key_path: PathBuf,
	pub approval_time_gate: Duration,
	pub dlp_config_path: PathBuf,
}

impl RuntimeConfig {
	/// Builds the runtime config from environment variables, applying the
	/// documented defaults. A malformed (non-numeric, non-positive) port or
	/// time gate is a configuration error and should abort startup.
	pub fn from_env() -> Result<Self, CoreError> {
		let port_str = env_or("POLIS_STATE_PORT", "6379");
		let state_port: u16 = port_str
			.parse()
			.map_err(|_| CoreError::Config(format!("invalid POLIS_STATE_PORT: {port_str}")))?;

		let gate_str = env_or("POLIS_APPROVAL_TIME_GATE_SECS", "15");
		let gate_secs: u64 = gate_str
			.parse()
			.map_err(|_| CoreError::Config(format!("invalid POLIS_APPROVAL_TIME_GATE_SECS: {gate_str}")))?;
		if gate_secs == 0 {
			return Err(CoreError::Config(
				"POLIS_APPROVAL_TIME_GATE_SECS must be positive".to_string(),
			));
		}

		Ok(Self {
			state_host: env_or("POLIS_STATE_HOST", "valkey"),
			state_port,
			state_user: env_or("POLIS_STATE_USER", "polis"),
			state_password_file: PathBuf::from(env_or("POLIS_STATE_PASSWORD_FILE", "/etc/polis/state.secret")),
			state_ca_path: PathBuf::from(env_or("POLIS_STATE_CA", "/etc/polis/tls/ca.pem")),
			state_cert_path: PathBuf::from(env_or("POLIS_STATE_CERT", "/etc/polis/tls/client.pem")),
			state_key_path: PathBuf::from(env_or("POLIS_STATE_KEY", "/etc/polis/tls/client-key.pem")),
			approval_time_gate: Duration::from_secs(gate_secs),
			dlp_config_path: PathBuf::from(env_or("POLIS_DLP_CONFIG", "/etc/c-icap/polis-dlp.conf")),
		})
	}
}
