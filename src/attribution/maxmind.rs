//! AS attribution from local MaxMind GeoLite2 databases.
//!
//! Reads AS number and organization from `GeoLite2-ASN.mmdb` and the
//! country code from `GeoLite2-Country.mmdb`. Both readers are opened at
//! construction; a missing database file fails the whole session up front
//! rather than on first query. Lookups are pure disk reads, so the
//! accessors are synchronous.
//!
//! The engine reads through a [`GeoDatabase`] so that tests can script
//! entries and count reads, the same way DNS engines talk to a transport
//! rather than to a resolver directly.

use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, MaxMindDBError, Reader};

use crate::cache::MemoCache;
use crate::error::Error;

/// The fields the engine consumes from one ASN database entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnEntry {
    /// AS number, when the entry carries one.
    pub number: Option<u32>,
    /// AS organization name, when the entry carries one.
    pub organization: Option<String>,
}

/// One keyed read into the GeoLite2 databases.
///
/// Implementations map "address not in the database" to `Ok(None)` and
/// reserve `Err` for reader failures; the engine caches the former and
/// surfaces the latter uncached.
pub trait GeoDatabase {
    /// Reads the ASN entry for `addr`.
    fn asn_entry(&self, addr: IpAddr) -> Result<Option<AsnEntry>, Error>;

    /// Reads the registered country code for `addr`. An entry without a
    /// country code is indistinguishable from an absent address; both
    /// yield `Ok(None)`.
    fn country_code(&self, addr: IpAddr) -> Result<Option<String>, Error>;
}

/// Production database pair backed by `maxminddb` readers.
pub struct GeoLite2Files {
    country_db: Reader<Vec<u8>>,
    asn_db: Reader<Vec<u8>>,
}

impl GeoLite2Files {
    /// Opens the country and ASN database files.
    ///
    /// # Errors
    ///
    /// `Error::Maxmind` if either file is missing or unreadable.
    pub fn open(country_db_path: &Path, asn_db_path: &Path) -> Result<Self, Error> {
        Ok(Self {
            country_db: open_database(country_db_path, "GeoLite2 Country")?,
            asn_db: open_database(asn_db_path, "GeoLite2 ASN")?,
        })
    }
}

impl GeoDatabase for GeoLite2Files {
    fn asn_entry(&self, addr: IpAddr) -> Result<Option<AsnEntry>, Error> {
        match self.asn_db.lookup::<geoip2::Asn>(addr) {
            Ok(record) => Ok(Some(AsnEntry {
                number: record.autonomous_system_number,
                organization: record
                    .autonomous_system_organization
                    .map(|s| s.to_string()),
            })),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(Error::Maxmind(e.to_string())),
        }
    }

    fn country_code(&self, addr: IpAddr) -> Result<Option<String>, Error> {
        match self.country_db.lookup::<geoip2::Country>(addr) {
            Ok(record) => Ok(record
                .registered_country
                .and_then(|c| c.iso_code)
                .map(|s| s.to_string())),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(Error::Maxmind(e.to_string())),
        }
    }
}

/// AS attribution engine backed by local GeoLite2 databases.
pub struct MaxmindEngine<D: GeoDatabase = GeoLite2Files> {
    db: D,
    asn_cache: MemoCache<u32>,
    organization_cache: MemoCache<String>,
    country_cache: MemoCache<String>,
}

impl<D: GeoDatabase> std::fmt::Debug for MaxmindEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxmindEngine").finish_non_exhaustive()
    }
}

impl MaxmindEngine<GeoLite2Files> {
    /// Opens the country and ASN databases.
    ///
    /// # Errors
    ///
    /// `Error::Maxmind` if either file is missing or unreadable.
    pub fn new(country_db_path: &Path, asn_db_path: &Path) -> Result<Self, Error> {
        Ok(Self::with_database(GeoLite2Files::open(
            country_db_path,
            asn_db_path,
        )?))
    }
}

impl<D: GeoDatabase> MaxmindEngine<D> {
    /// Creates an engine over an already-opened database with empty caches.
    pub fn with_database(db: D) -> Self {
        Self {
            db,
            asn_cache: MemoCache::new(),
            organization_cache: MemoCache::new(),
            country_cache: MemoCache::new(),
        }
    }

    /// Returns the AS number announcing `ip`, or `Ok(None)` if the address
    /// is not in the database. Both outcomes are cached for the session.
    ///
    /// # Errors
    ///
    /// `Error::InvalidIp` for malformed input, `Error::Maxmind` for reader
    /// failures other than "address not found".
    pub fn asn(&mut self, ip: &str) -> Result<Option<u32>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.asn_cache.get(ip) {
            return Ok(*cached);
        }

        let asn = self.db.asn_entry(addr)?.and_then(|entry| entry.number);
        self.asn_cache.insert(ip, asn);
        Ok(asn)
    }

    /// Returns the organization for `ip`, or `Ok(None)` if the address is
    /// not in the database.
    ///
    /// # Errors
    ///
    /// Same as [`asn`](Self::asn).
    pub fn organization(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.organization_cache.get(ip) {
            return Ok(cached.clone());
        }

        let organization = self
            .db
            .asn_entry(addr)?
            .and_then(|entry| entry.organization);
        self.organization_cache.insert(ip, organization.clone());
        Ok(organization)
    }

    /// Returns the registered country code for `ip`, or `Ok(None)` if the
    /// address is not in the database.
    ///
    /// # Errors
    ///
    /// Same as [`asn`](Self::asn).
    pub fn country(&mut self, ip: &str) -> Result<Option<String>, Error> {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
        if let Some(cached) = self.country_cache.get(ip) {
            return Ok(cached.clone());
        }

        let country = self.db.country_code(addr)?;
        self.country_cache.insert(ip, country.clone());
        Ok(country)
    }
}

/// Opens one database file, reporting a missing file with its path.
fn open_database(path: &Path, label: &str) -> Result<Reader<Vec<u8>>, Error> {
    if !path.is_file() {
        return Err(Error::Maxmind(format!(
            "{label} database not found at {}",
            path.display()
        )));
    }
    Reader::open_readfile(path)
        .map_err(|e| Error::Maxmind(format!("failed to open {label} database: {e}")))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::*;

    /// In-memory database that records how many reads each accessor made.
    struct ScriptedDb {
        asn_entries: HashMap<IpAddr, AsnEntry>,
        countries: HashMap<IpAddr, String>,
        asn_reads: Cell<usize>,
        country_reads: Cell<usize>,
    }

    impl ScriptedDb {
        fn new() -> Self {
            Self {
                asn_entries: HashMap::new(),
                countries: HashMap::new(),
                asn_reads: Cell::new(0),
                country_reads: Cell::new(0),
            }
        }

        fn with_asn_entry(mut self, ip: &str, entry: AsnEntry) -> Self {
            self.asn_entries.insert(ip.parse().unwrap(), entry);
            self
        }

        fn with_country(mut self, ip: &str, code: &str) -> Self {
            self.countries.insert(ip.parse().unwrap(), code.to_string());
            self
        }
    }

    impl GeoDatabase for ScriptedDb {
        fn asn_entry(&self, addr: IpAddr) -> Result<Option<AsnEntry>, Error> {
            self.asn_reads.set(self.asn_reads.get() + 1);
            Ok(self.asn_entries.get(&addr).cloned())
        }

        fn country_code(&self, addr: IpAddr) -> Result<Option<String>, Error> {
            self.country_reads.set(self.country_reads.get() + 1);
            Ok(self.countries.get(&addr).cloned())
        }
    }

    #[test]
    fn absent_address_is_cached_as_absent() {
        let mut engine = MaxmindEngine::with_database(ScriptedDb::new());

        assert_eq!(engine.asn("198.51.100.7").unwrap(), None);
        assert_eq!(engine.asn("198.51.100.7").unwrap(), None);
        assert_eq!(engine.db.asn_reads.get(), 1);

        assert_eq!(engine.country("198.51.100.7").unwrap(), None);
        assert_eq!(engine.country("198.51.100.7").unwrap(), None);
        assert_eq!(engine.db.country_reads.get(), 1);
    }

    #[test]
    fn known_address_is_cached_per_attribute() {
        let db = ScriptedDb::new()
            .with_asn_entry(
                "192.0.2.10",
                AsnEntry {
                    number: Some(64500),
                    organization: Some("Example Net".to_string()),
                },
            )
            .with_country("192.0.2.10", "US");
        let mut engine = MaxmindEngine::with_database(db);

        assert_eq!(engine.asn("192.0.2.10").unwrap(), Some(64500));
        assert_eq!(
            engine.organization("192.0.2.10").unwrap(),
            Some("Example Net".to_string())
        );
        assert_eq!(engine.country("192.0.2.10").unwrap(), Some("US".to_string()));

        // Repeat each accessor; no further reads are made.
        assert_eq!(engine.asn("192.0.2.10").unwrap(), Some(64500));
        assert_eq!(
            engine.organization("192.0.2.10").unwrap(),
            Some("Example Net".to_string())
        );
        assert_eq!(engine.country("192.0.2.10").unwrap(), Some("US".to_string()));
        assert_eq!(engine.db.asn_reads.get(), 2);
        assert_eq!(engine.db.country_reads.get(), 1);
    }

    #[test]
    fn entry_without_number_is_absent() {
        let db = ScriptedDb::new().with_asn_entry(
            "192.0.2.20",
            AsnEntry {
                number: None,
                organization: Some("Example Net".to_string()),
            },
        );
        let mut engine = MaxmindEngine::with_database(db);

        assert_eq!(engine.asn("192.0.2.20").unwrap(), None);
        assert_eq!(
            engine.organization("192.0.2.20").unwrap(),
            Some("Example Net".to_string())
        );
    }

    #[test]
    fn malformed_ip_is_rejected_without_a_read() {
        let mut engine = MaxmindEngine::with_database(ScriptedDb::new());

        let err = engine.asn("not-an-ip").unwrap_err();
        assert!(matches!(err, Error::InvalidIp(_)));
        assert_eq!(engine.db.asn_reads.get(), 0);
    }

    #[test]
    fn missing_databases_fail_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let country = dir.path().join("GeoLite2-Country.mmdb");
        let asn = dir.path().join("GeoLite2-ASN.mmdb");

        let err = MaxmindEngine::new(&country, &asn).unwrap_err();
        assert!(matches!(err, Error::Maxmind(_)));
        assert!(err.to_string().contains("GeoLite2 Country"));
    }

    #[test]
    fn missing_asn_database_is_reported_separately() {
        let dir = tempfile::tempdir().unwrap();
        let country = dir.path().join("GeoLite2-Country.mmdb");
        std::fs::write(&country, b"not a real database").unwrap();
        let asn = dir.path().join("GeoLite2-ASN.mmdb");

        let err = MaxmindEngine::new(&country, &asn).unwrap_err();
        // The country file exists (though invalid, open may fail first);
        // either way construction must fail with a Maxmind error.
        assert!(matches!(err, Error::Maxmind(_)));
    }
}
