//! Request-id validation and OTT code generation. Pure, synchronous,
//! and the only place that touches the system RNG.

use rand_core::{OsRng, TryRngCore};
use regex::bytes::Regex as BytesRegex;
use std::sync::LazyLock;
use thiserror::Error;

const OTT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const OTT_SUFFIX_LEN: usize = 8;

pub static APPROVAL_SCAN: LazyLock<BytesRegex> =
	LazyLock::new(|| BytesRegex::new(r"/polis-approve[\s]+(req-[0-9a-f]{8})").expect("static regex"));

#[derive(Debug, Error)]
pub enum TokenError {
	#[error("system RNG unavailable or returned a short read")]
	RngUnavailable,
}

/// Validates that `candidate` is exactly `"req-"` followed by 8 lowercase
/// hex characters. The scan regex already enforces this structurally,
/// but inputs can reach this function from other callers, so it is
/// re-checked independently.
pub fn is_valid_request_id(candidate: &[u8]) -> bool {
	candidate.len() == 12 && candidate.starts_with(b"req-") && candidate[4..].iter().all(u8::is_ascii_hexdigit) && candidate[4..].iter().all(|b| !b.is_ascii_uppercase())
}

/// Generates a 12-byte OTT code: `"ott-"` plus 8 characters drawn from a
/// 62-character alphanumeric alphabet, using a cryptographically secure
/// source. No PRNG fallback: a short read or an RNG failure aborts the
/// mint.
pub fn generate_ott() -> Result<String, TokenError> {
	let mut raw = [0u8; OTT_SUFFIX_LEN];
	OsRng.try_fill_bytes(&mut raw).map_err(|_| TokenError::RngUnavailable)?;

	let mut code = String::with_capacity(12);
	code.push_str("ott-");
	for byte in raw {
		let idx = (byte as usize) % OTT_ALPHABET.len();
		code.push(OTT_ALPHABET[idx] as char);
	}
	Ok(code)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_well_formed_request_id() {
		assert!(is_valid_request_id(b"req-0123abcd"));
	}

	#[test]
	fn rejects_wrong_length() {
		assert!(!is_valid_request_id(b"req-0123"));
		assert!(!is_valid_request_id(b"req-0123abcde"));
	}

	#[test]
	fn rejects_uppercase_hex() {
		assert!(!is_valid_request_id(b"req-0123ABCD"));
	}

	#[test]
	fn rejects_non_hex_characters() {
		assert!(!is_valid_request_id(b"req-0123abcz"));
	}

	#[test]
	fn rejects_wrong_prefix() {
		assert!(!is_valid_request_id(b"xxx-0123abcd"));
	}

	#[test]
	fn generated_ott_has_expected_shape() {
		let ott = generate_ott().unwrap();
		assert_eq!(ott.len(), 12);
		assert!(ott.starts_with("ott-"));
		assert!(ott[4..].chars().all(|c| c.is_ascii_alphanumeric()));
	}

	#[test]
	fn generated_otts_are_not_trivially_repeating() {
		let a = generate_ott().unwrap();
		let b = generate_ott().unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn scan_regex_captures_the_request_id() {
		let hay = b"please visit /polis-approve   req-0123abcd now";
		let caps = APPROVAL_SCAN.captures(hay).unwrap();
		assert_eq!(&caps[1], b"req-0123abcd");
	}

	#[test]
	fn scan_regex_does_not_match_malformed_ids() {
		assert!(APPROVAL_SCAN.captures(b"/polis-approve req-ZZZZZZZZ").is_none());
	}
}
