//! Error type definitions.
//!
//! "No record found" (NXDOMAIN, empty answer, address not in a local
//! database) is never an error in this crate: lookups return `Ok(None)` for
//! it. The variants below cover invalid input, transport failures that
//! survived the retry budget, malformed upstream data, and local database
//! problems.

use thiserror::Error;

/// Errors surfaced by the lookup engines and the dispatcher.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied hostname failed validation before any I/O.
    #[error("invalid hostname: {0}")]
    InvalidHostname(String),

    /// Caller-supplied IP address failed validation before any I/O.
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// Transport-level DNS failure (no reachable nameserver, timeout) after
    /// exhausting the retry budget. Batch drivers are expected to skip the
    /// item and continue.
    #[error("DNS lookup failed: {0}")]
    Dns(String),

    /// Malformed IP-to-ASN TXT payload from the routing-registry mirror
    /// (field count other than 5). Not retried: the payload shape is
    /// deterministic.
    #[error("malformed IP-to-ASN response: {0}")]
    IpToAsnFormat(String),

    /// Malformed AS-to-organization TXT payload (field count other than 5).
    #[error("malformed AS lookup response: {0}")]
    AsLookupFormat(String),

    /// Local GeoLite2 database missing or unreadable. Fatal at engine
    /// construction when the local-database backend is selected.
    #[error("MaxMind database error: {0}")]
    Maxmind(String),

    /// Invalid session configuration, rejected before any engine is built.
    #[error("configuration error: {0}")]
    Config(String),
}
