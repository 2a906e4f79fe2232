//! Reverse-zone query name construction.
//!
//! Builds the standard `in-addr.arpa.` / `ip6.arpa.` names used for PTR
//! lookups, and their rewritten forms for DNS-based services (Abusix, Team
//! Cymru) that graft the address labels onto their own zone. The rewrite
//! replaces exactly the reverse-zone suffix; the address-derived labels are
//! untouched.

use std::net::IpAddr;

/// IPv4 reverse zone suffix.
pub(crate) const IN_ADDR_ARPA: &str = "in-addr.arpa.";

/// IPv6 reverse zone suffix.
pub(crate) const IP6_ARPA: &str = "ip6.arpa.";

/// Address-derived labels in reverse order: dotted octets for IPv4, dotted
/// nibbles for IPv6.
fn reverse_labels(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0])
        }
        IpAddr::V6(v6) => {
            let nibbles: Vec<String> = v6
                .octets()
                .iter()
                .rev()
                .flat_map(|octet| [octet & 0x0f, octet >> 4])
                .map(|nibble| format!("{nibble:x}"))
                .collect();
            nibbles.join(".")
        }
    }
}

/// The standard reverse-lookup name for `addr`, with trailing root dot.
pub(crate) fn reverse_name(addr: &IpAddr) -> String {
    let suffix = match addr {
        IpAddr::V4(_) => IN_ADDR_ARPA,
        IpAddr::V6(_) => IP6_ARPA,
    };
    format!("{}.{}", reverse_labels(addr), suffix)
}

/// The reverse-lookup name for `addr` rewritten into a service zone:
/// `v4_zone` replaces `in-addr.arpa.`, `v6_zone` replaces `ip6.arpa.`.
pub(crate) fn reverse_name_in_zone(addr: &IpAddr, v4_zone: &str, v6_zone: &str) -> String {
    let zone = match addr {
        IpAddr::V4(_) => v4_zone,
        IpAddr::V6(_) => v6_zone,
    };
    format!("{}.{}", reverse_labels(addr), zone)
}
