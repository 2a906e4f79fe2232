//! Abuse-contact lookup via the Abusix DNS service.
//!
//! Abusix publishes abuse contacts as TXT records under
//! `abuse-contacts.abusix.org`, addressed by grafting the reverse-DNS labels
//! of an IP address onto that zone. The answer is free-text ASCII; if a
//! response carries multiple TXT records or strings, only the first string
//! of the first record is used.

use std::net::IpAddr;

use hickory_resolver::proto::rr::RecordType;

use crate::cache::MemoCache;
use crate::dns::reverse::reverse_name_in_zone;
use crate::dns::{query_with_retry, DnsTransport, HickoryTransport, RecordData};
use crate::error::Error;

/// Zone serving abuse-contact TXT records, shared by both address families.
const ABUSE_CONTACTS_ZONE: &str = "abuse-contacts.abusix.org";

/// Abuse-contact lookup engine with per-session memoization.
pub struct AbuseEngine<T: DnsTransport = HickoryTransport> {
    transport: T,
    retries: usize,
    cache: MemoCache<String>,
}

impl<T: DnsTransport> AbuseEngine<T> {
    /// Creates an engine over `transport` with an empty cache.
    pub fn new(transport: T, retries: usize) -> Self {
        Self {
            transport,
            retries,
            cache: MemoCache::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the abuse contact for `ip`, or `Ok(None)` if Abusix has no
    /// record for it. Both outcomes are cached for the session.
    ///
    /// # Errors
    ///
    /// `Error::InvalidIp` for malformed input, `Error::Dns` once the retry
    /// budget for transient transport failures is exhausted.
    pub async fn abuse_contact(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.cache.get(ip) {
            return Ok(cached.clone());
        }

        let query = reverse_name_in_zone(&addr, ABUSE_CONTACTS_ZONE, ABUSE_CONTACTS_ZONE);
        let records = query_with_retry(&self.transport, self.retries, &query, RecordType::TXT)
            .await?
            .unwrap_or_default();
        let contact = records.iter().find_map(|record| match record {
            RecordData::Txt(strings) => strings.first().cloned(),
            _ => None,
        });
        self.cache.insert(ip, contact.clone());
        Ok(contact)
    }
}
