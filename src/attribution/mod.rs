//! AS, organization, and country attribution.
//!
//! Two interchangeable backends answer attribution queries:
//! - [`CymruEngine`]: Team Cymru's DNS-based IP-to-ASN service (TXT records
//!   under `*.asn.cymru.com`),
//! - [`MaxmindEngine`]: local MaxMind GeoLite2 Country/ASN databases.
//!
//! Which backend answers which attribute is selected per session in
//! [`Config`](crate::Config); the two keep independent caches.

mod cymru;
mod maxmind;

// Re-export public API
pub use cymru::CymruEngine;
pub use maxmind::{AsnEntry, GeoDatabase, GeoLite2Files, MaxmindEngine};

use serde::{Deserialize, Serialize};

/// Attribution attributes for one IP address. Partial records are valid: a
/// known AS number does not guarantee a resolvable organization, and vice
/// versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionRecord {
    /// Autonomous system number announcing the address, if known.
    pub asn: Option<u32>,
    /// Organization name. `Some("")` means the AS number is known but the
    /// organization name is not published.
    pub organization: Option<String>,
    /// ISO country code, if known.
    pub country: Option<String>,
}
