//! A single shared, mutually-authenticated TLS connection to the state
//! store. The `redis` wire protocol (Valkey/Redis-compatible) is used
//! for `GET`/`EXISTS`/`SET NX EX`/`ZADD`.
//!
//! This client is intentionally synchronous/blocking: the host framework
//! invokes the policy engines from its own native worker threads with no
//! async executor underneath, so there is nowhere to `.await`.

use crate::config::RuntimeConfig;
use crate::error::CoreError;
use redis::{Client, Commands, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, TlsCertificates};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const OP_TIMEOUT: Duration = Duration::from_secs(2);

pub struct StateStoreClient {
	client: Client,
	conn: Option<Connection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLookup {
	Found(String),
	Missing,
	Unreachable,
}

impl StateStoreClient {
	/// Builds the client and performs the initial connect + `AUTH`.
	/// Failure here is non-fatal to the service: the caller keeps the
	/// client around and every operation degrades to fail-closed until
	/// `ensure_connected` succeeds.
	pub fn connect(cfg: &RuntimeConfig) -> Result<Self, CoreError> {
		let password = read_password_file(&cfg.state_password_file)?;
		let certs = load_tls_certificates(cfg)?;

		let connection_info = ConnectionInfo {
			addr: ConnectionAddr::TcpTls {
				host: cfg.state_host.clone(),
				port: cfg.state_port,
				insecure: false,
				tls_params: None,
			},
			redis: RedisConnectionInfo {
				db: 0,
				username: Some(cfg.state_user.clone()),
				password: Some(password.expose_secret().to_string()),
				protocol: Default::default(),
			},
		};
		// `password` is dropped (and zeroized by `secrecy`) as soon as we
		// hand its exposed contents to the connection info above.

		let client = Client::build_with_tls(connection_info, certs).map_err(|e| CoreError::Tls(e.into()))?;
		let conn = open_connection(&client).ok();
		Ok(Self { client, conn })
	}

	pub fn is_connected(&self) -> bool {
		self.conn.is_some()
	}

	/// Cheap health probe; on failure attempts exactly one reconnect. Must
	/// be called (and must succeed) before any operation below; every
	/// operation calls this itself so callers never forget.
	pub fn ensure_connected(&mut self) -> bool {
		if let Some(conn) = self.conn.as_mut() {
			if redis::cmd("PING").query::<String>(conn).is_ok() {
				return true;
			}
		}
		self.conn = open_connection(&self.client).ok();
		self.conn.is_some()
	}

	/// Distinguishes "key absent" from "couldn't ask", which matters to
	/// callers like the security-level poller that treat a missing key as
	/// a normal, expected outcome rather than a store failure.
	pub fn get(&mut self, key: &str) -> StoreLookup {
		if !self.ensure_connected() {
			return StoreLookup::Unreachable;
		}
		let Some(conn) = self.conn.as_mut() else {
			return StoreLookup::Unreachable;
		};
		match conn.get::<_, Option<String>>(key) {
			Ok(Some(v)) => StoreLookup::Found(v),
			Ok(None) => StoreLookup::Missing,
			Err(_) => StoreLookup::Unreachable,
		}
	}

	pub fn exists(&mut self, key: &str) -> bool {
		if !self.ensure_connected() {
			return false;
		}
		let Some(conn) = self.conn.as_mut() else {
			return false;
		};
		conn.exists::<_, bool>(key).unwrap_or(false)
	}

	/// `SET key value NX EX ttl_secs`. Returns `Some(true)` if the key was
	/// set, `Some(false)` if it already existed (NX rejected the write),
	/// and `None` if the store was unreachable.
	pub fn set_nx_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Option<bool> {
		if !self.ensure_connected() {
			return None;
		}
		let conn = self.conn.as_mut()?;
		let result: redis::RedisResult<Option<String>> = redis::cmd("SET")
			.arg(key)
			.arg(value)
			.arg("NX")
			.arg("EX")
			.arg(ttl_secs)
			.query(conn);
		match result {
			Ok(Some(_)) => Some(true),
			Ok(None) => Some(false),
			Err(_) => None,
		}
	}

	/// `ZADD key score member`. Failure is reported but never aborts the
	/// caller's in-progress rewrite.
	pub fn zadd(&mut self, key: &str, score: u64, member: &str) -> Result<(), CoreError> {
		if !self.ensure_connected() {
			return Err(CoreError::StoreUnavailable("not connected".into()));
		}
		let conn = self
			.conn
			.as_mut()
			.ok_or_else(|| CoreError::StoreUnavailable("not connected".into()))?;
		conn
			.zadd::<_, _, _, i64>(key, member, score)
			.map(|_| ())
			.map_err(|e| CoreError::StoreUnavailable(e.to_string()))
	}
}

fn open_connection(client: &Client) -> redis::RedisResult<Connection> {
	let mut conn = client.get_connection_with_timeout(CONNECT_TIMEOUT)?;
	conn.set_read_timeout(Some(OP_TIMEOUT))?;
	conn.set_write_timeout(Some(OP_TIMEOUT))?;
	Ok(conn)
}

fn read_password_file(path: &std::path::Path) -> Result<SecretString, CoreError> {
	let raw = std::fs::read_to_string(path)
		.map_err(|e| CoreError::Config(format!("reading state store secret {}: {e}", path.display())))?;
	Ok(SecretString::from(raw.trim_end_matches(['\n', '\r']).to_string()))
}

fn load_tls_certificates(cfg: &RuntimeConfig) -> Result<TlsCertificates, CoreError> {
	let root_cert = std::fs::read(&cfg.state_ca_path)
		.map_err(|e| CoreError::Tls(anyhow::anyhow!("reading CA {}: {e}", cfg.state_ca_path.display())))?;
	let client_cert = std::fs::read(&cfg.state_cert_path)
		.map_err(|e| CoreError::Tls(anyhow::anyhow!("reading client cert {}: {e}", cfg.state_cert_path.display())))?;
	let client_key = std::fs::read(&cfg.state_key_path)
		.map_err(|e| CoreError::Tls(anyhow::anyhow!("reading client key {}: {e}", cfg.state_key_path.display())))?;

	Ok(TlsCertificates {
		client_tls: Some(redis::ClientTlsConfig { client_cert, client_key }),
		root_cert: Some(root_cert),
	})
}
