//! DNS resolution engine.
//!
//! Async DNS operations using `hickory-resolver`:
//! - forward resolution (A/AAAA records),
//! - reverse resolution (PTR records via the standard reverse zones),
//! - mail exchanger selection (MX records).
//!
//! All operations validate their input, memoize results per query type, and
//! retry transient transport failures up to the configured budget. "No such
//! record" is a first-class `Ok(None)` result, cached and never retried.

mod engine;
pub(crate) mod reverse;
mod transport;

// Re-export public API
pub use engine::DnsEngine;
pub use transport::{DnsTransport, HickoryTransport, RecordData};

pub(crate) use transport::query_with_retry;
