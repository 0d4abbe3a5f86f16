//! The dynamic security-level knob that governs new-domain behavior.
//! Mutated only by the poller ([`crate::store::poller`]); read by every
//! request thread under the runtime mutex.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
	Relaxed,
	Balanced,
	Strict,
}

impl Default for SecurityLevel {
	fn default() -> Self {
		SecurityLevel::Balanced
	}
}

impl SecurityLevel {
	/// Parses the raw string value read from the state store. Accepts
	/// optional surrounding ASCII quotes and is case-insensitive. Any
	/// unrecognized value maps to the safe default, `Balanced`.
	pub fn parse(raw: &str) -> SecurityLevel {
		let trimmed = raw.trim().trim_matches('"').trim_matches('\'');
		match trimmed.to_ascii_lowercase().as_str() {
			"relaxed" => SecurityLevel::Relaxed,
			"strict" => SecurityLevel::Strict,
			"balanced" => SecurityLevel::Balanced,
			other => {
				if !other.is_empty() {
					tracing::warn!(value = %raw, "unknown security level, defaulting to balanced");
				}
				SecurityLevel::Balanced
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_known_values_case_insensitively() {
		assert_eq!(SecurityLevel::parse("Relaxed"), SecurityLevel::Relaxed);
		assert_eq!(SecurityLevel::parse("STRICT"), SecurityLevel::Strict);
		assert_eq!(SecurityLevel::parse("balanced"), SecurityLevel::Balanced);
	}

	#[test]
	fn strips_surrounding_quotes() {
		assert_eq!(SecurityLevel::parse("\"strict\""), SecurityLevel::Strict);
		assert_eq!(SecurityLevel::parse("'relaxed'"), SecurityLevel::Relaxed);
	}

	#[test]
	fn unknown_value_defaults_to_balanced() {
		assert_eq!(SecurityLevel::parse("paranoid"), SecurityLevel::Balanced);
		assert_eq!(SecurityLevel::parse(""), SecurityLevel::Balanced);
	}

	#[test]
	fn default_is_balanced() {
		assert_eq!(SecurityLevel::default(), SecurityLevel::Balanced);
	}
}
