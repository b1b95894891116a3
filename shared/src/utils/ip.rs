//! IP address utilities
//!
//! Normalization of client addresses and matching against the scope patterns a
//! token family is bound to. A scope pattern is one of:
//! - an exact address literal (`203.0.113.7`)
//! - a wildcard pattern where `*` stands for any run of characters (`192.168.1.*`)
//! - a CIDR block (`10.0.0.0/8`)

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use moka::sync::Cache;
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical IPv4 loopback address
pub const LOOPBACK_V4: &str = "127.0.0.1";

/// Prefix of an IPv4-mapped IPv6 address
const IPV4_MAPPED_PREFIX: &str = "::ffff:";

// A wildcard pattern: dotted segments that are each `*` or a decimal octet
static WILDCARD_PATTERN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*|25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(\.(\*|25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)){0,3}$")
        .unwrap()
});

/// Upper bound on the number of compiled wildcard patterns kept in memory
pub const WILDCARD_CACHE_CAPACITY: u64 = 1024;

// Compiled wildcard patterns, keyed by the raw pattern string
static WILDCARD_CACHE: Lazy<Cache<String, Regex>> =
    Lazy::new(|| Cache::builder().max_capacity(WILDCARD_CACHE_CAPACITY).build());

/// Normalize an address into the form scope patterns are written in
///
/// IPv6 loopback forms collapse to `127.0.0.1` and IPv4-mapped IPv6 addresses lose
/// their `::ffff:` prefix. Anything else, including strings that are not addresses
/// at all, passes through unchanged apart from surrounding whitespace.
pub fn normalize(address: &str) -> String {
    let address = address.trim();

    if address == "::1" || address == "::ffff:127.0.0.1" {
        return LOOPBACK_V4.to_string();
    }

    match address.strip_prefix(IPV4_MAPPED_PREFIX) {
        Some(rest) => rest.to_string(),
        None => address.to_string(),
    }
}

/// Check whether an address is permitted by a list of scope patterns
///
/// An empty pattern list allows any address; callers that must never grant an open
/// scope are responsible for never passing one. Patterns are tried in order and the
/// first match wins.
pub fn matches<S: AsRef<str>>(address: &str, patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    let normalized = normalize(address);
    patterns
        .iter()
        .any(|pattern| matches_pattern(&normalized, pattern.as_ref()))
}

/// Check a single, already-normalized address against one pattern
fn matches_pattern(address: &str, pattern: &str) -> bool {
    if pattern == address || normalize(pattern) == address {
        return true;
    }

    if pattern.contains('*') {
        return matches_wildcard(address, pattern);
    }

    if pattern.contains('/') {
        return matches_cidr(address, pattern);
    }

    false
}

fn matches_wildcard(address: &str, pattern: &str) -> bool {
    if let Some(regex) = WILDCARD_CACHE.get(pattern) {
        return regex.is_match(address);
    }

    let Some(regex) = compile_wildcard(pattern) else {
        return false;
    };
    let is_match = regex.is_match(address);
    WILDCARD_CACHE.insert(pattern.to_string(), regex);

    is_match
}

/// Translate a wildcard pattern into an anchored regular expression
///
/// Dots are escaped before `*` is expanded, so `192.168.1.*` becomes
/// `^192\.168\.1\..*$`.
fn compile_wildcard(pattern: &str) -> Option<Regex> {
    let expression = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{}$", expression)).ok()
}

fn matches_cidr(address: &str, pattern: &str) -> bool {
    let Ok(network) = pattern.parse::<IpNetwork>() else {
        return false;
    };

    match address.parse::<IpAddr>() {
        Ok(ip) => network.contains(ip),
        Err(_) => false,
    }
}

/// Check whether a string is a well-formed scope pattern
pub fn validate_pattern(pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }

    if pattern.contains('*') {
        return WILDCARD_PATTERN_REGEX.is_match(pattern);
    }

    if pattern.contains('/') {
        return pattern.parse::<IpNetwork>().is_ok();
    }

    normalize(pattern).parse::<IpAddr>().is_ok()
}

/// Check whether a string is a literal IP address after normalization
pub fn is_ip_address(address: &str) -> bool {
    normalize(address).parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_loopback_forms() {
        assert_eq!(normalize("::1"), "127.0.0.1");
        assert_eq!(normalize("::ffff:127.0.0.1"), "127.0.0.1");
        assert_eq!(normalize("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_normalize_strips_mapped_prefix() {
        assert_eq!(normalize("::ffff:10.1.2.3"), "10.1.2.3");
        assert_eq!(normalize(" 10.1.2.3 "), "10.1.2.3");
    }

    #[test]
    fn test_normalize_passes_through_non_addresses() {
        assert_eq!(normalize("unknown"), "unknown");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("2001:db8::1"), "2001:db8::1");
    }

    #[test]
    fn test_exact_match() {
        assert!(matches("127.0.0.1", &["127.0.0.1"]));
        assert!(!matches("127.0.0.2", &["127.0.0.1"]));
    }

    #[test]
    fn test_exact_match_after_normalization() {
        assert!(matches("::1", &["127.0.0.1"]));
        assert!(matches("::ffff:192.168.1.10", &["192.168.1.10"]));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(matches("192.168.1.42", &["192.168.1.*"]));
        assert!(!matches("192.168.2.1", &["192.168.1.*"]));
        assert!(matches("10.20.30.40", &["10.*"]));
    }

    #[test]
    fn test_wildcard_dots_are_literal() {
        // An unescaped dot would let this through
        assert!(!matches("192x168x1x5", &["192.168.1.*"]));
        assert!(!matches("1921681.5", &["192.168.1.*"]));
    }

    #[test]
    fn test_wildcard_is_anchored() {
        assert!(!matches("10.192.168.1.5", &["192.168.1.*"]));
    }

    #[test]
    fn test_cidr_match() {
        assert!(matches("10.1.2.3", &["10.0.0.0/8"]));
        assert!(!matches("11.1.2.3", &["10.0.0.0/8"]));
        assert!(matches("::ffff:172.16.5.4", &["172.16.0.0/12"]));
        assert!(!matches("unknown", &["10.0.0.0/8"]));
    }

    #[test]
    fn test_any_pattern_in_list_matches() {
        let patterns = vec!["10.0.0.1".to_string(), "192.168.1.*".to_string()];
        assert!(matches("192.168.1.7", &patterns));
        assert!(matches("10.0.0.1", &patterns));
        assert!(!matches("10.0.0.2", &patterns));
    }

    #[test]
    fn test_empty_list_allows_any() {
        let patterns: Vec<String> = Vec::new();
        assert!(matches("203.0.113.9", &patterns));
    }

    #[test]
    fn test_cached_pattern_gives_same_answer() {
        assert!(matches("172.31.0.9", &["172.31.*"]));
        assert!(matches("172.31.200.1", &["172.31.*"]));
        assert!(!matches("172.32.0.1", &["172.31.*"]));
    }

    #[test]
    fn test_literal_patterns_match_in_normalized_form() {
        assert!(validate_pattern("::1"));
        assert!(matches("::1", &["::1"]));
        assert!(matches("127.0.0.1", &["::1"]));
        assert!(matches("10.0.0.1", &["::ffff:10.0.0.1"]));
        assert!(matches("::ffff:10.0.0.1", &["::ffff:10.0.0.1"]));
        assert!(!matches("10.0.0.2", &["::ffff:10.0.0.1"]));
    }

    #[test]
    fn test_wildcard_cache_is_bounded() {
        for a in 0..50 {
            for b in 0..200 {
                let pattern = format!("{}.{}.*", a, b);
                assert!(validate_pattern(&pattern));
                matches("203.0.113.9", &[pattern]);
            }
        }

        WILDCARD_CACHE.run_pending_tasks();
        assert!(WILDCARD_CACHE.entry_count() <= WILDCARD_CACHE_CAPACITY);

        // Evicted patterns are recompiled on demand
        assert!(matches("0.0.1.2", &["0.0.*"]));
        assert!(!matches("0.1.1.2", &["0.0.*"]));
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("192.168.1.10"));
        assert!(validate_pattern("192.168.1.*"));
        assert!(validate_pattern("10.*"));
        assert!(validate_pattern("10.0.0.0/8"));
        assert!(validate_pattern("::1"));
        assert!(validate_pattern("2001:db8::/32"));

        assert!(!validate_pattern(""));
        assert!(!validate_pattern("not-an-ip"));
        assert!(!validate_pattern("192.168.1.300"));
        assert!(!validate_pattern("192.168.*.*.*"));
        assert!(!validate_pattern("10.0.0.0/99"));
    }

    #[test]
    fn test_is_ip_address() {
        assert!(is_ip_address("8.8.8.8"));
        assert!(is_ip_address("::ffff:8.8.8.8"));
        assert!(!is_ip_address("unknown"));
    }
}
