//! Dot-boundary host matching: the built-in known-host list and the
//! suffix rule both the DLP new-domain check and any allow-list reuse.

/// Built-in, immutable list of hosts the new-domain check treats as
/// already known. Stored without the leading dot; [`matches_known_host`]
/// applies the dot-boundary rule.
pub const KNOWN_HOSTS: &[&str] = &[
	"anthropic.com",
	"api.anthropic.com",
	"openai.com",
	"api.openai.com",
	"github.com",
	"api.github.com",
	"googleapis.com",
	"slack.com",
];

/// True if `host` is case-insensitively equal to `domain` or ends with
/// `.domain`. An empty or absent host is never considered known.
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
	if host.is_empty() || domain.is_empty() {
		return false;
	}
	if host.eq_ignore_ascii_case(domain) {
		return true;
	}
	// Compare on bytes rather than slicing the `&str`: `host` is untrusted
	// `Host` header input and may contain multi-byte UTF-8, so indexing at
	// `len - domain.len()` could land inside a char and panic.
	let host = host.as_bytes();
	let domain = domain.as_bytes();
	host.len() > domain.len() && host[host.len() - domain.len() - 1] == b'.' && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
}

/// True if `host` matches any entry in the built-in known-host list.
pub fn is_known_host(host: Option<&str>) -> bool {
	let Some(host) = host else {
		return false;
	};
	if host.is_empty() {
		return false;
	}
	KNOWN_HOSTS.iter().any(|d| host_matches_domain(host, d))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exact_match() {
		assert!(host_matches_domain("github.com", "github.com"));
		assert!(host_matches_domain("GitHub.COM", "github.com"));
	}

	#[test]
	fn subdomain_match() {
		assert!(host_matches_domain("api.github.com", "github.com"));
		assert!(host_matches_domain("deeply.nested.api.github.com", "github.com"));
	}

	#[test]
	fn rejects_substring_spoof() {
		assert!(!host_matches_domain("evil-github.com", "github.com"));
		assert!(!host_matches_domain("notgithub.com", "github.com"));
		assert!(!host_matches_domain("github.com.evil.net", "github.com"));
	}

	#[test]
	fn empty_host_is_never_known() {
		assert!(!is_known_host(None));
		assert!(!is_known_host(Some("")));
	}

	#[test]
	fn known_hosts_cover_builtin_list() {
		assert!(is_known_host(Some("api.anthropic.com")));
		assert!(is_known_host(Some("chat.openai.com")));
		assert!(!is_known_host(Some("unknown.example")));
	}
}
