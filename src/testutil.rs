//! Test helpers: a scripted DNS transport with query accounting.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use hickory_resolver::proto::rr::RecordType;

use crate::dns::{DnsTransport, RecordData};
use crate::error::Error;

/// A scripted response for one query attempt.
#[derive(Debug, Clone)]
pub(crate) enum MockResponse {
    /// Answer with the given records.
    Records(Vec<RecordData>),
    /// Terminal NXDOMAIN / no-answer outcome.
    NoRecords,
    /// Transient transport failure (retried by the engines).
    Transport(&'static str),
}

/// Transport that replays scripted responses per (name, record type) and
/// counts every query attempt. Responses queued for a key are consumed in
/// order; the last one is repeated once the queue would run dry.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripts: Mutex<HashMap<(String, RecordType), Vec<MockResponse>>>,
    log: Mutex<Vec<(String, RecordType)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for queries of `record_type` at `name`.
    pub fn script(&self, name: &str, record_type: RecordType, response: MockResponse) {
        self.scripts
            .lock()
            .unwrap()
            .entry((name.to_string(), record_type))
            .or_default()
            .push(response);
    }

    /// Total number of query attempts seen.
    pub fn queries(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Number of query attempts for a specific name and record type.
    pub fn queries_for(&self, name: &str, record_type: RecordType) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, t)| n == name && *t == record_type)
            .count()
    }
}

#[async_trait]
impl DnsTransport for MockTransport {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<Vec<RecordData>>, Error> {
        self.log
            .lock()
            .unwrap()
            .push((name.to_string(), record_type));

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(&(name.to_string(), record_type))
            .unwrap_or_else(|| panic!("unscripted query: {name} {record_type}"));
        let response = if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue[0].clone()
        };
        drop(scripts);

        match response {
            MockResponse::Records(records) => Ok(Some(records)),
            MockResponse::NoRecords => Ok(None),
            MockResponse::Transport(msg) => Err(Error::Dns(msg.to_string())),
        }
    }
}
