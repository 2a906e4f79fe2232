//! AS attribution via Team Cymru's DNS-based IP-to-ASN service.
//!
//! Attribution is a two-stage TXT lookup:
//!
//! 1. `<reverse labels>.origin.asn.cymru.com` (or `origin6.` for IPv6)
//!    answers `"<asn> | <prefix> | <country> | <registry> | <allocated>"`.
//! 2. `AS<asn>.asn.cymru.com` answers
//!    `"<asn> | <country> | <registry> | <allocated> | <as name>"`.
//!
//! Both payloads are pipe-delimited with exactly 5 fields; any other field
//! count is malformed upstream data and is surfaced as an error without
//! populating the caches. If stage 1 finds no record, the address is not
//! announced: all three attributes are cached as absent and stage 2 is
//! skipped.

use std::net::IpAddr;
use std::sync::LazyLock;

use hickory_resolver::proto::rr::RecordType;
use regex::Regex;

use crate::cache::MemoCache;
use crate::dns::reverse::reverse_name_in_zone;
use crate::dns::{query_with_retry, DnsTransport, HickoryTransport, RecordData};
use crate::error::Error;

/// Stage 1 zone for IPv4 addresses.
const ORIGIN_ZONE_V4: &str = "origin.asn.cymru.com";

/// Stage 1 zone for IPv6 addresses.
const ORIGIN_ZONE_V6: &str = "origin6.asn.cymru.com";

/// Stage 2 zone for AS-number-to-organization lookups.
const ASN_ZONE: &str = "asn.cymru.com";

/// Trailing ", XX" country suffix on Cymru organization names.
static ORG_COUNTRY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", [A-Z]{2}$").expect("suffix pattern is valid"));

/// AS attribution engine backed by the Team Cymru DNS service.
pub struct CymruEngine<T: DnsTransport = HickoryTransport> {
    transport: T,
    retries: usize,
    asn_cache: MemoCache<u32>,
    organization_cache: MemoCache<String>,
    country_cache: MemoCache<String>,
}

/// Attributes fetched by one two-stage lookup.
struct CymruRecord {
    asn: Option<u32>,
    organization: Option<String>,
    country: Option<String>,
}

impl<T: DnsTransport> CymruEngine<T> {
    /// Creates an engine over `transport` with empty caches.
    pub fn new(transport: T, retries: usize) -> Self {
        Self {
            transport,
            retries,
            asn_cache: MemoCache::new(),
            organization_cache: MemoCache::new(),
            country_cache: MemoCache::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the AS number announcing `ip`, or `Ok(None)` if unknown.
    ///
    /// # Errors
    ///
    /// `Error::InvalidIp` for malformed input, `Error::Dns` on exhausted
    /// transport retries, `Error::IpToAsnFormat` / `Error::AsLookupFormat`
    /// for malformed upstream payloads.
    pub async fn asn(&mut self, ip: &str) -> Result<Option<u32>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.asn_cache.get(ip) {
            return Ok(*cached);
        }
        Ok(self.fetch_as_info(ip, &addr).await?.asn)
    }

    /// Returns the organization for `ip`, or `Ok(None)` if the AS number
    /// itself is unknown. `Ok(Some(""))` means the AS number is known but
    /// the organization name is not published.
    ///
    /// # Errors
    ///
    /// Same as [`asn`](Self::asn).
    pub async fn organization(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.organization_cache.get(ip) {
            return Ok(cached.clone());
        }
        Ok(self.fetch_as_info(ip, &addr).await?.organization)
    }

    /// Returns the country code for `ip`, or `Ok(None)` if unknown.
    ///
    /// # Errors
    ///
    /// Same as [`asn`](Self::asn).
    pub async fn country(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.country_cache.get(ip) {
            return Ok(cached.clone());
        }
        Ok(self.fetch_as_info(ip, &addr).await?.country)
    }

    /// Runs the two-stage lookup and populates all three caches.
    async fn fetch_as_info(&mut self, ip: &str, addr: &IpAddr) -> Result<CymruRecord, Error> {
        // Stage 1: IP to AS number and country.
        let query = reverse_name_in_zone(addr, ORIGIN_ZONE_V4, ORIGIN_ZONE_V6);
        let Some(payload) =
            first_txt_string(query_with_retry(&self.transport, self.retries, &query, RecordType::TXT).await?)
        else {
            // Address not announced: everything is confirmed absent and
            // stage 2 would have nothing to ask about.
            self.asn_cache.insert(ip, None);
            self.organization_cache.insert(ip, None);
            self.country_cache.insert(ip, None);
            return Ok(CymruRecord {
                asn: None,
                organization: None,
                country: None,
            });
        };

        let fields: Vec<&str> = payload.split('|').collect();
        if fields.len() != 5 {
            return Err(Error::IpToAsnFormat(payload.clone()));
        }
        // Multi-origin answers list several AS numbers; take the first.
        let asn_field = fields[0].trim();
        let asn: u32 = asn_field
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| Error::IpToAsnFormat(payload.clone()))?;
        let country = fields[2].trim().to_string();
        self.asn_cache.insert(ip, Some(asn));
        self.country_cache.insert(ip, Some(country.clone()));

        // Stage 2: AS number to organization.
        let query = format!("AS{asn}.{ASN_ZONE}");
        let organization = match first_txt_string(
            query_with_retry(&self.transport, self.retries, &query, RecordType::TXT).await?,
        ) {
            Some(payload) => {
                let fields: Vec<&str> = payload.split('|').collect();
                if fields.len() != 5 {
                    return Err(Error::AsLookupFormat(payload.clone()));
                }
                ORG_COUNTRY_SUFFIX.replace(fields[4].trim(), "").into_owned()
            }
            // AS number known, organization name not published.
            None => String::new(),
        };
        self.organization_cache.insert(ip, Some(organization.clone()));

        Ok(CymruRecord {
            asn: Some(asn),
            organization: Some(organization),
            country: Some(country),
        })
    }
}

/// First string of the first TXT record, if any.
fn first_txt_string(records: Option<Vec<RecordData>>) -> Option<String> {
    records?.iter().find_map(|record| match record {
        RecordData::Txt(strings) => strings.first().cloned(),
        _ => None,
    })
}
