//! JSON-lines journal of API traffic and session changes.

use crate::api::{Query, Transport};
use crate::error::ApiResult;
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

pub struct Journal {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: Value,
}

impl Journal {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    /// Open `<dir>/<session_id>.jsonl`, creating the directory if needed
    pub fn in_dir(dir: &Path, session_id: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::new(&dir.join(format!("{}.jsonl", session_id)), session_id)
    }

    pub fn log(&mut self, event_type: &str, data: Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn api_request(&mut self, method: &str, path: &str, query: &Value) -> Result<()> {
        self.log(
            "api_request",
            json!({ "method": method, "path": path, "query": query }),
        )
    }

    pub fn api_response(&mut self, method: &str, path: &str, duration_ms: u64) -> Result<()> {
        self.log(
            "api_response",
            json!({ "method": method, "path": path, "duration_ms": duration_ms }),
        )
    }

    pub fn api_error(
        &mut self,
        method: &str,
        path: &str,
        status: Option<u16>,
        error: &str,
    ) -> Result<()> {
        self.log(
            "api_error",
            json!({
                "method": method,
                "path": path,
                "status": status,
                "error": error,
            }),
        )
    }

    pub fn signed_in(&mut self, username: &str) -> Result<()> {
        self.log("signed_in", json!({ "username": username }))
    }

    pub fn signed_out(&mut self) -> Result<()> {
        self.log("signed_out", json!({}))
    }
}

/// A journal shared between the transport and session listeners
pub type SharedJournal = Arc<Mutex<Journal>>;

/// Run `write` against a shared journal, logging instead of failing
pub fn record<F>(journal: &SharedJournal, write: F)
where
    F: FnOnce(&mut Journal) -> Result<()>,
{
    let mut journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = write(&mut *journal) {
        warn!("failed to write journal {}: {}", journal.path.display(), e);
    }
}

/// Transport decorator that records every call in a [`Journal`].
/// POST bodies are never written since they may carry credentials.
pub struct JournalingTransport<T> {
    inner: T,
    journal: SharedJournal,
}

impl<T: Transport> JournalingTransport<T> {
    pub fn new(inner: T, journal: SharedJournal) -> Self {
        Self { inner, journal }
    }

    fn record<F>(&self, write: F)
    where
        F: FnOnce(&mut Journal) -> Result<()>,
    {
        record(&self.journal, write)
    }

    fn traced(
        &self,
        method: &str,
        path: &str,
        call: impl FnOnce() -> ApiResult<Value>,
    ) -> ApiResult<Value> {
        let started = Instant::now();
        let result = call();
        match &result {
            Ok(_) => {
                let elapsed = started.elapsed().as_millis() as u64;
                self.record(|j| j.api_response(method, path, elapsed));
            }
            Err(e) => {
                let message = e.to_string();
                self.record(|j| j.api_error(method, path, e.status(), &message));
            }
        }
        result
    }
}

impl<T: Transport> Transport for JournalingTransport<T> {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        let query_json: Value = query
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>()
            .into();
        self.record(|j| j.api_request("GET", path, &query_json));
        self.traced("GET", path, || self.inner.get(path, query))
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.record(|j| j.api_request("POST", path, &Value::Null));
        self.traced("POST", path, || self.inner.post(path, body))
    }
}
