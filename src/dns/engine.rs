//! Forward, reverse, and mail-exchange resolution with memoized caching.

use std::net::IpAddr;

use hickory_resolver::proto::rr::RecordType;

use super::reverse::reverse_name;
use super::transport::{query_with_retry, DnsTransport, HickoryTransport, RecordData};
use crate::cache::MemoCache;
use crate::error::Error;
use crate::validate;

/// DNS resolution engine.
///
/// Owns one cache per query type, keyed on the raw query string. If a name
/// resolves to multiple records, only the first one in the response is used;
/// this engine does not disambiguate or load-balance.
pub struct DnsEngine<T: DnsTransport = HickoryTransport> {
    transport: T,
    retries: usize,
    ipv4_cache: MemoCache<String>,
    ipv6_cache: MemoCache<String>,
    ptr_cache: MemoCache<String>,
    mx_cache: MemoCache<String>,
}

impl<T: DnsTransport> DnsEngine<T> {
    /// Creates an engine over `transport` with empty caches. `retries` is
    /// the number of additional attempts after the first failed one.
    pub fn new(transport: T, retries: usize) -> Self {
        Self {
            transport,
            retries,
            ipv4_cache: MemoCache::new(),
            ipv6_cache: MemoCache::new(),
            ptr_cache: MemoCache::new(),
            mx_cache: MemoCache::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `hostname` to its first IPv4 address.
    ///
    /// Returns `Ok(None)` if the name has no A record. Both outcomes are
    /// cached for the session.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHostname` for malformed input, `Error::Dns` once the
    /// retry budget for transient transport failures is exhausted.
    pub async fn resolve_ipv4(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        if !validate::is_hostname(hostname) {
            return Err(Error::InvalidHostname(hostname.to_string()));
        }
        if let Some(cached) = self.ipv4_cache.get(hostname) {
            return Ok(cached.clone());
        }

        let records = query_with_retry(&self.transport, self.retries, hostname, RecordType::A)
            .await?
            .unwrap_or_default();
        let ip = records.iter().find_map(|record| match record {
            RecordData::A(addr) => Some(addr.to_string()),
            _ => None,
        });
        self.ipv4_cache.insert(hostname, ip.clone());
        Ok(ip)
    }

    /// Resolves `hostname` to its first IPv6 address. Same contract as
    /// [`resolve_ipv4`](Self::resolve_ipv4), for AAAA records.
    pub async fn resolve_ipv6(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        if !validate::is_hostname(hostname) {
            return Err(Error::InvalidHostname(hostname.to_string()));
        }
        if let Some(cached) = self.ipv6_cache.get(hostname) {
            return Ok(cached.clone());
        }

        let records = query_with_retry(&self.transport, self.retries, hostname, RecordType::AAAA)
            .await?
            .unwrap_or_default();
        let ip = records.iter().find_map(|record| match record {
            RecordData::Aaaa(addr) => Some(addr.to_string()),
            _ => None,
        });
        self.ipv6_cache.insert(hostname, ip.clone());
        Ok(ip)
    }

    /// Resolves `hostname` to an IP address, trying IPv4 first, then IPv6.
    pub async fn resolve_ip(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        if let Some(ip) = self.resolve_ipv4(hostname).await? {
            return Ok(Some(ip));
        }
        self.resolve_ipv6(hostname).await
    }

    /// Reverse lookup (PTR) for `ip`, with the trailing root dot stripped.
    ///
    /// Returns `Ok(None)` if the address has no PTR record.
    ///
    /// # Errors
    ///
    /// `Error::InvalidIp` for malformed input, `Error::Dns` on exhausted
    /// transport retries.
    pub async fn resolve_hostname(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.ptr_cache.get(ip) {
            return Ok(cached.clone());
        }

        let query = reverse_name(&addr);
        let records = query_with_retry(&self.transport, self.retries, &query, RecordType::PTR)
            .await?
            .unwrap_or_default();
        let hostname = records.iter().find_map(|record| match record {
            RecordData::Ptr(name) => Some(name.trim_end_matches('.').to_string()),
            _ => None,
        });
        self.ptr_cache.insert(ip, hostname.clone());
        Ok(hostname)
    }

    /// Returns the mail exchanger with the lowest preference value for
    /// `hostname` (lowest number = highest priority, ties broken by response
    /// order), with the trailing root dot stripped.
    ///
    /// Returns `Ok(None)` if no MX records are configured; that is a valid,
    /// cached result.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHostname` for malformed input or when the selected MX
    /// target itself is not a valid hostname (malformed zone data),
    /// `Error::Dns` on exhausted transport retries.
    pub async fn resolve_mx(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        if !validate::is_hostname(hostname) {
            return Err(Error::InvalidHostname(hostname.to_string()));
        }
        if let Some(cached) = self.mx_cache.get(hostname) {
            return Ok(cached.clone());
        }

        let records = query_with_retry(&self.transport, self.retries, hostname, RecordType::MX)
            .await?
            .unwrap_or_default();

        let mut best: Option<(u16, String)> = None;
        for record in &records {
            if let RecordData::Mx {
                preference,
                exchange,
            } = record
            {
                // Strictly-lower keeps the first-seen exchange on ties.
                if best.as_ref().is_none_or(|(pref, _)| preference < pref) {
                    best = Some((*preference, exchange.trim_end_matches('.').to_string()));
                }
            }
        }

        let mx = best.map(|(_, exchange)| exchange);
        if let Some(exchange) = &mx {
            if !validate::is_hostname(exchange) {
                return Err(Error::InvalidHostname(exchange.clone()));
            }
        }
        self.mx_cache.insert(hostname, mx.clone());
        Ok(mx)
    }
}
