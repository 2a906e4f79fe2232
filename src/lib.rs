//! netident: network-identity enrichment for incident-response workflows.
//!
//! Resolves metadata for IP addresses and hostnames in batch workflows:
//! forward/reverse DNS and MX lookup, abuse-contact discovery via Abusix,
//! and AS/organization/country attribution via Team Cymru's DNS service or
//! local MaxMind GeoLite2 databases. Every engine memoizes its results for
//! the lifetime of the session, so enriching many related addresses does
//! not repeat network or disk lookups.
//!
//! # Example
//!
//! ```no_run
//! use netident::{Config, Lookup};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), netident::Error> {
//! let mut lookup = Lookup::new(Config::default())?;
//!
//! if let Some(ip) = lookup.resolve_ip("www.example.com").await? {
//!     let record = lookup.attribution(&ip).await?;
//!     let contact = lookup.abuse_contact(&ip).await?;
//!     println!("{ip}: {record:?}, abuse contact {contact:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime; all network lookups are async.
//! Engines are not designed for concurrent shared use; their caches are
//! unsynchronized. Callers that want parallel enrichment should use one
//! `Lookup` per worker.

#![warn(missing_docs)]

pub mod abuse;
pub mod attribution;
pub mod cache;
pub mod config;
pub mod dns;
mod error;
mod lookup;
pub mod validate;

#[cfg(test)]
mod testutil;

// Re-export public API
pub use attribution::AttributionRecord;
pub use config::{AttributionSource, Config};
pub use error::Error;
pub use lookup::Lookup;
