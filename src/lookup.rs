//! The dispatcher: one façade over all lookup engines.
//!
//! [`Lookup`] is constructed once per session from a validated
//! [`Config`]. It owns one instance of each engine it needs (each DNS
//! engine with its own resolver handle) and routes attribution queries to
//! the backend configured per attribute. The dispatcher holds no cache of
//! its own; memoization lives in the engines.

use crate::abuse::AbuseEngine;
use crate::attribution::{AttributionRecord, CymruEngine, MaxmindEngine};
use crate::config::{AttributionSource, Config};
use crate::dns::{DnsEngine, DnsTransport, HickoryTransport};
use crate::error::Error;

/// Network-identity lookup dispatcher.
///
/// # Example
///
/// ```no_run
/// use netident::{Config, Lookup};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), netident::Error> {
/// let mut lookup = Lookup::new(Config::default())?;
/// let ip = lookup.resolve_ip("mail.example.com").await?;
/// if let Some(ip) = &ip {
///     let record = lookup.attribution(ip).await?;
///     println!("{ip} -> AS{:?} {:?}", record.asn, record.organization);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Lookup<T: DnsTransport = HickoryTransport> {
    config: Config,
    dns: DnsEngine<T>,
    abuse: AbuseEngine<T>,
    cymru: CymruEngine<T>,
    maxmind: Option<MaxmindEngine>,
}

impl<T: DnsTransport> std::fmt::Debug for Lookup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookup").finish_non_exhaustive()
    }
}

impl Lookup<HickoryTransport> {
    /// Validates `config` and constructs the engines.
    ///
    /// The MaxMind engine (and its database file handles) is only built
    /// when some attribute selects the local-database backend.
    ///
    /// # Errors
    ///
    /// `Error::Config` for invalid configuration, `Error::Maxmind` if a
    /// selected database file is missing or unreadable.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;

        let maxmind = if config.uses_maxmind() {
            Some(MaxmindEngine::new(
                &config.country_database()?,
                &config.asn_database()?,
            )?)
        } else {
            None
        };

        Ok(Self {
            dns: DnsEngine::new(HickoryTransport::new(config.timeout), config.retries),
            abuse: AbuseEngine::new(HickoryTransport::new(config.timeout), config.retries),
            cymru: CymruEngine::new(HickoryTransport::new(config.timeout), config.retries),
            maxmind,
            config,
        })
    }
}

impl<T: DnsTransport> Lookup<T> {
    /// Resolves `hostname` to an IP address, IPv4 first, then IPv6.
    pub async fn resolve_ip(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        self.dns.resolve_ip(hostname).await
    }

    /// Resolves `hostname` to its first IPv4 address.
    pub async fn resolve_ipv4(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        self.dns.resolve_ipv4(hostname).await
    }

    /// Resolves `hostname` to its first IPv6 address.
    pub async fn resolve_ipv6(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        self.dns.resolve_ipv6(hostname).await
    }

    /// Reverse lookup (PTR) for `ip`.
    pub async fn resolve_hostname(&mut self, ip: &str) -> Result<Option<String>, Error> {
        self.dns.resolve_hostname(ip).await
    }

    /// Returns the highest-priority mail exchanger for `hostname`.
    pub async fn resolve_mx(&mut self, hostname: &str) -> Result<Option<String>, Error> {
        self.dns.resolve_mx(hostname).await
    }

    /// Returns the abuse contact for `ip`.
    pub async fn abuse_contact(&mut self, ip: &str) -> Result<Option<String>, Error> {
        self.abuse.abuse_contact(ip).await
    }

    /// Returns the AS number announcing `ip`, from the configured backend.
    pub async fn asn(&mut self, ip: &str) -> Result<Option<u32>, Error> {
        match self.config.asn_source {
            AttributionSource::Cymru => self.cymru.asn(ip).await,
            AttributionSource::Maxmind => self.maxmind_engine()?.asn(ip),
        }
    }

    /// Returns the organization for `ip`, from the configured backend.
    pub async fn organization(&mut self, ip: &str) -> Result<Option<String>, Error> {
        match self.config.organization_source {
            AttributionSource::Cymru => self.cymru.organization(ip).await,
            AttributionSource::Maxmind => self.maxmind_engine()?.organization(ip),
        }
    }

    /// Returns the country code for `ip`, from the configured backend.
    pub async fn country(&mut self, ip: &str) -> Result<Option<String>, Error> {
        match self.config.country_source {
            AttributionSource::Cymru => self.cymru.country(ip).await,
            AttributionSource::Maxmind => self.maxmind_engine()?.country(ip),
        }
    }

    /// Returns all three attribution attributes for `ip` in one record.
    pub async fn attribution(&mut self, ip: &str) -> Result<AttributionRecord, Error> {
        Ok(AttributionRecord {
            asn: self.asn(ip).await?,
            organization: self.organization(ip).await?,
            country: self.country(ip).await?,
        })
    }

    /// The Maxmind engine, present whenever configuration selected it.
    fn maxmind_engine(&mut self) -> Result<&mut MaxmindEngine, Error> {
        self.maxmind.as_mut().ok_or_else(|| {
            Error::Config("local-database backend selected but not constructed".to_string())
        })
    }

    #[cfg(test)]
    pub(crate) fn has_maxmind(&self) -> bool {
        self.maxmind.is_some()
    }
}
