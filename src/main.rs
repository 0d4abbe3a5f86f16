//! `polisctl-dev`: a developer-only harness that drives either REQMOD
//! pipeline over a file or stdin, without standing up the host
//! content-adaptation framework or a real state store. Not the
//! out-of-scope operator management CLI; this exists purely for local
//! testing of the policy engines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polis_core::config::RuntimeConfig;
use polis_core::runtime::Runtime;
use polis_dlp::pattern_store::{self, PatternStore};
use polis_dlp::policy::{self, Verdict};
use polis_ott::rewriter::{self, RewriteOutcome};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the DLP scan over a request body and print the verdict.
	Dlp {
		/// Body file to scan; reads stdin if omitted.
		#[arg(short, long, value_name = "file")]
		file: Option<PathBuf>,
		/// Pattern config path; overrides POLIS_DLP_CONFIG.
		#[arg(short, long, value_name = "config")]
		config: Option<PathBuf>,
		/// Host header value to evaluate against.
		#[arg(long)]
		host: Option<String>,
	},
	/// Run the OTT rewrite state machine over a request body.
	Ott {
		/// Body file to scan; reads stdin if omitted.
		#[arg(short, long, value_name = "file")]
		file: Option<PathBuf>,
		/// Host header value to evaluate against.
		#[arg(long)]
		host: Option<String>,
	},
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
		.with_writer(std::io::stderr)
		.with_ansi(false)
		.init();

	let args = Args::parse();
	match args.command {
		Command::Dlp { file, config, host } => run_dlp(file, config, host),
		Command::Ott { file, host } => run_ott(file, host),
	}
}

fn read_body(file: Option<PathBuf>) -> Result<Vec<u8>> {
	match file {
		Some(path) => std::fs::read(&path).with_context(|| format!("reading {}", path.display())),
		None => {
			let mut buf = Vec::new();
			std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
			Ok(buf)
		},
	}
}

fn run_dlp(file: Option<PathBuf>, config: Option<PathBuf>, host: Option<String>) -> Result<()> {
	let cfg = RuntimeConfig::from_env()?;
	let config_path = config.unwrap_or(cfg.dlp_config_path.clone());
	let patterns = pattern_store::require_nonempty(PatternStore::load_from_config(&config_path)?)?;

	let body = read_body(file)?;
	let level = match Runtime::new(&cfg) {
		Ok(runtime) => runtime.current_security_level(),
		Err(e) => {
			tracing::warn!(error = %e, "state store unreachable; using default security level");
			polis_core::security_level::SecurityLevel::default()
		},
	};
	// The dev CLI has no real-time window to exceed HEAD_MAX, so it scans
	// the whole buffer as a single head view with an empty tail.
	let verdict = policy::evaluate(&patterns, &body, &[], host.as_deref(), level);

	match verdict {
		Verdict::Allow => println!("allow"),
		Verdict::Block { reason } => println!("block: {reason}"),
	}
	Ok(())
}

fn run_ott(file: Option<PathBuf>, host: Option<String>) -> Result<()> {
	let cfg = RuntimeConfig::from_env()?;
	let runtime = Arc::new(Runtime::new(&cfg)?);
	let body = read_body(file)?;

	match rewriter::rewrite(&runtime, cfg.approval_time_gate.as_secs(), body.len(), &body, host.as_deref()) {
		RewriteOutcome::PassThrough => println!("pass-through"),
		RewriteOutcome::Rewritten(rewritten) => {
			println!("rewritten:");
			std::io::Write::write_all(&mut std::io::stdout(), &rewritten)?;
		},
	}
	Ok(())
}
