//! Session configuration.
//!
//! Configuration is loaded once per session, validated eagerly before any
//! engine is constructed, and treated as read-only afterwards.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default per-attempt network timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default retry count for transient DNS failures (total attempts are
/// `retries + 1`).
pub const DEFAULT_RETRIES: usize = 2;

/// Subdirectory of the database directory holding MaxMind files.
const MAXMIND_SUBDIR: &str = "maxmind";

/// GeoLite2 country database file name.
const COUNTRY_DB_FILE: &str = "GeoLite2-Country.mmdb";

/// GeoLite2 ASN database file name.
const ASN_DB_FILE: &str = "GeoLite2-ASN.mmdb";

/// Which backend answers an attribution attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionSource {
    /// Team Cymru's DNS-based IP-to-ASN service.
    Cymru,
    /// Local MaxMind GeoLite2 databases.
    Maxmind,
}

/// Per-session resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding local databases. Required only when some attribute
    /// selects [`AttributionSource::Maxmind`]; the GeoLite2 files are
    /// expected under `<database_dir>/maxmind/`.
    pub database_dir: Option<PathBuf>,

    /// Backend answering AS-number queries.
    pub asn_source: AttributionSource,

    /// Backend answering organization queries.
    pub organization_source: AttributionSource,

    /// Backend answering country queries.
    pub country_source: AttributionSource,

    /// Per-attempt network timeout.
    pub timeout: Duration,

    /// Retry count for transient DNS failures.
    pub retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_dir: None,
            asn_source: AttributionSource::Cymru,
            organization_source: AttributionSource::Cymru,
            country_source: AttributionSource::Cymru,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
        }
    }
}

impl Config {
    /// True if any attribute selects the local-database backend.
    pub(crate) fn uses_maxmind(&self) -> bool {
        [
            self.asn_source,
            self.organization_source,
            self.country_source,
        ]
        .contains(&AttributionSource::Maxmind)
    }

    /// Validates the configuration. Called by [`Lookup::new`](crate::Lookup::new)
    /// before any engine is built.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the local-database backend is selected without an
    /// existing database directory.
    pub fn validate(&self) -> Result<(), Error> {
        if self.uses_maxmind() {
            match &self.database_dir {
                None => {
                    return Err(Error::Config(
                        "database_dir is required when an attribution source is 'maxmind'"
                            .to_string(),
                    ))
                }
                Some(dir) if !dir.is_dir() => {
                    return Err(Error::Config(format!(
                        "database directory does not exist: {}",
                        dir.display()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Path of the GeoLite2 country database. Only meaningful after
    /// [`validate`](Self::validate) has accepted a Maxmind selection.
    pub(crate) fn country_database(&self) -> Result<PathBuf, Error> {
        self.maxmind_path(COUNTRY_DB_FILE)
    }

    /// Path of the GeoLite2 ASN database.
    pub(crate) fn asn_database(&self) -> Result<PathBuf, Error> {
        self.maxmind_path(ASN_DB_FILE)
    }

    fn maxmind_path(&self, file: &str) -> Result<PathBuf, Error> {
        let dir = self.database_dir.as_ref().ok_or_else(|| {
            Error::Config("database_dir is not configured".to_string())
        })?;
        Ok(dir.join(MAXMIND_SUBDIR).join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn maxmind_source_requires_database_dir() {
        let config = Config {
            country_source: AttributionSource::Maxmind,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn maxmind_source_requires_existing_directory() {
        let config = Config {
            asn_source: AttributionSource::Maxmind,
            database_dir: Some(PathBuf::from("/nonexistent/netident-databases")),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn database_paths_are_derived_from_dir() {
        let config = Config {
            database_dir: Some(PathBuf::from("/var/lib/netident")),
            ..Config::default()
        };
        assert_eq!(
            config.country_database().unwrap(),
            PathBuf::from("/var/lib/netident/maxmind/GeoLite2-Country.mmdb")
        );
        assert_eq!(
            config.asn_database().unwrap(),
            PathBuf::from("/var/lib/netident/maxmind/GeoLite2-ASN.mmdb")
        );
    }

    #[test]
    fn cymru_only_config_ignores_database_dir() {
        let config = Config::default();
        assert!(!config.uses_maxmind());
        config.validate().unwrap();
    }
}
