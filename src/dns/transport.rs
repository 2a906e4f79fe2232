//! DNS transport: the query seam between engines and the wire.
//!
//! Engines talk to a [`DnsTransport`] rather than to a resolver directly so
//! that tests can script responses and count queries. The production
//! implementation, [`HickoryTransport`], wraps a `TokioAsyncResolver` and
//! maps its errors onto the tri-state outcome the engines work with:
//!
//! - `Ok(Some(records))`: answer received,
//! - `Ok(None)`: terminal "name does not exist" / "no answer of this type",
//! - `Err(Error::Dns)`: transient transport failure (timeout, no reachable
//!   nameserver), eligible for retry.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::error::Error;

/// A single resource record, reduced to the fields the engines consume.
/// Response order is preserved by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// IPv4 address record.
    A(Ipv4Addr),
    /// IPv6 address record.
    Aaaa(Ipv6Addr),
    /// Reverse-lookup target name, as returned (may carry a root dot).
    Ptr(String),
    /// Mail exchanger with its preference value (lower = higher priority).
    Mx {
        /// MX preference value.
        preference: u16,
        /// MX target hostname, as returned.
        exchange: String,
    },
    /// TXT record: the character strings of one record, in order.
    ///
    /// The payloads consumed here (Abusix contacts, Cymru fields) are ASCII
    /// in practice, but the wire allows arbitrary bytes. Decoding is
    /// deliberately lenient: invalid UTF-8 sequences are replaced rather
    /// than failing the whole answer.
    Txt(Vec<String>),
}

/// One DNS query attempt. Implementations must not retry internally; the
/// retry budget is applied by [`query_with_retry`].
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Issues a single query for `name` / `record_type`.
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<Vec<RecordData>>, Error>;
}

/// Production transport backed by `hickory-resolver`.
pub struct HickoryTransport {
    resolver: TokioAsyncResolver,
}

impl HickoryTransport {
    /// Creates a transport with its own resolver handle.
    ///
    /// Uses the default resolver configuration with the per-attempt timeout
    /// from the session config. `attempts` is pinned to 1 because retries
    /// are owned by the engines, and `ndots` to 0 to prevent search-domain
    /// appending on the absolute-looking names this crate builds.
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.ndots = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl DnsTransport for HickoryTransport {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<Vec<RecordData>>, Error> {
        match self.resolver.lookup(name, record_type).await {
            Ok(lookup) => {
                let records: Vec<RecordData> = lookup
                    .iter()
                    .filter_map(|rdata| match rdata {
                        RData::A(a) => Some(RecordData::A(a.0)),
                        RData::AAAA(aaaa) => Some(RecordData::Aaaa(aaaa.0)),
                        RData::PTR(ptr) => Some(RecordData::Ptr(ptr.0.to_utf8())),
                        RData::MX(mx) => Some(RecordData::Mx {
                            preference: mx.preference(),
                            exchange: mx.exchange().to_utf8(),
                        }),
                        RData::TXT(txt) => Some(RecordData::Txt(
                            txt.iter()
                                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                                .collect(),
                        )),
                        _ => None,
                    })
                    .collect();
                Ok(Some(records))
            }
            Err(e) => match e.kind() {
                // NXDOMAIN and empty answers are terminal, not failures.
                ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                _ => Err(Error::Dns(e.to_string())),
            },
        }
    }
}

/// Runs a query with up to `retries + 1` total attempts.
///
/// Only transport errors are retried, immediately and without backoff.
/// Terminal "no record" outcomes come back as `Ok(None)` from the transport
/// and are returned as-is. The last transport error is surfaced once the
/// budget is exhausted.
pub(crate) async fn query_with_retry<T: DnsTransport>(
    transport: &T,
    retries: usize,
    name: &str,
    record_type: RecordType,
) -> Result<Option<Vec<RecordData>>, Error> {
    let strategy = FixedInterval::from_millis(0).take(retries);
    Retry::spawn(strategy, || transport.query(name, record_type))
        .await
        .map_err(|e| {
            log::warn!("DNS query for {name} ({record_type}) failed after {retries} retries: {e}");
            e
        })
}
