//! Input classification predicates.
//!
//! Pure, side-effect-free checks for IP addresses, hostnames, fully
//! qualified domain names, and email addresses. These never fail; they
//! return `bool` and are applied by every engine before any I/O happens.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

/// Dotted labels ending in an alphabetic TLD of at least two characters.
/// Labels are 1-63 characters, alphanumeric with internal hyphens only.
static FQDN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("FQDN pattern is valid")
});

/// Bare local names: a single alphanumeric token.
static SINGLE_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("label pattern is valid"));

/// Classic local-part@domain pattern, lowercase. No DNS verification.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z0-9]([a-z0-9-]*[a-z0-9])?$",
    )
    .expect("email pattern is valid")
});

/// Hostnames must fit DNS length rules: at least 4 and at most 253 bytes.
fn length_ok(name: &str) -> bool {
    (4..=253).contains(&name.len())
}

/// Returns `true` if `ip` is a valid IPv4 or IPv6 literal.
pub fn is_ip(ip: &str) -> bool {
    is_ipv4(ip) || is_ipv6(ip)
}

/// Returns `true` if `ip` is a well-formed dotted-quad IPv4 literal.
pub fn is_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Returns `true` if `ip` is a well-formed colon-hex IPv6 literal.
pub fn is_ipv6(ip: &str) -> bool {
    ip.parse::<Ipv6Addr>().is_ok()
}

/// Returns `true` if `name` is a valid hostname.
///
/// Accepts fully qualified names (see [`is_fqdn`]) and, to tolerate bare
/// local names, any single alphanumeric token within the length bounds.
pub fn is_hostname(name: &str) -> bool {
    length_ok(name) && (FQDN_PATTERN.is_match(name) || SINGLE_LABEL_PATTERN.is_match(name))
}

/// Returns `true` if `name` is a fully qualified hostname: dotted labels
/// with an alphabetic final label of at least two characters.
pub fn is_fqdn(name: &str) -> bool {
    length_ok(name) && FQDN_PATTERN.is_match(name)
}

/// Returns `true` if `address` looks like an email address.
pub fn is_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_literals() {
        assert!(is_ipv4("192.0.2.1"));
        assert!(is_ipv4("0.0.0.0"));
        assert!(!is_ipv4("192.0.2.256"));
        assert!(!is_ipv4("192.0.2"));
        assert!(!is_ipv4("2001:db8::1"));
        assert!(!is_ipv4("host.example.com"));
    }

    #[test]
    fn ipv6_literals() {
        assert!(is_ipv6("2001:db8::1"));
        assert!(is_ipv6("::1"));
        assert!(!is_ipv6("2001:db8::g"));
        assert!(!is_ipv6("192.0.2.1"));
    }

    #[test]
    fn ipv4_and_ipv6_never_overlap() {
        for s in [
            "192.0.2.1",
            "2001:db8::1",
            "::1",
            "0.0.0.0",
            "not-an-ip",
            "",
        ] {
            assert!(
                !(is_ipv4(s) && is_ipv6(s)),
                "{s} classified as both IPv4 and IPv6"
            );
        }
    }

    #[test]
    fn hostnames() {
        assert!(is_hostname("example.com"));
        assert!(is_hostname("mail.example.co.uk"));
        assert!(is_hostname("a-b.example.com"));
        assert!(is_hostname("host1234"));
        assert!(!is_hostname("abc")); // below minimum length
        assert!(!is_hostname("-bad.example.com"));
        assert!(!is_hostname("example.c0m")); // numeric TLD
        assert!(!is_hostname("example.com."));
        assert!(!is_hostname(&"a".repeat(254)));
    }

    #[test]
    fn fqdn_rejects_bare_labels() {
        assert!(is_fqdn("example.com"));
        assert!(!is_fqdn("host1234"));
        assert!(!is_fqdn("example"));
    }

    #[test]
    fn label_length_limit() {
        let label63 = "a".repeat(63);
        let label64 = "a".repeat(64);
        assert!(is_hostname(&format!("{label63}.com")));
        assert!(!is_hostname(&format!("{label64}.com")));
    }

    #[test]
    fn emails() {
        assert!(is_email("abuse@example.com"));
        assert!(is_email("first.last@mail.example.org"));
        assert!(!is_email("abuse@"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("no-at-sign.example.com"));
    }
}
