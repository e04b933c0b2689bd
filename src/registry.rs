//! In-memory stub registry.
//!
//! Holds stubs grouped by fully qualified method name, preserving the order
//! they were added, and picks the first stub whose expected content is
//! satisfied by an incoming payload.

use crate::stub::{InvalidStubResponse, JsonString, MatchMode, Stub};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Errors from loading stub files into the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read stub file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON stub file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML stub file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported stub file extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("invalid stub: {}", .0.errors.join("; "))]
    Rejected(InvalidStubResponse),
}

/// Ordered collection of stubs, keyed by full method name.
///
/// Safe to share across request-handling tasks; matching itself is pure and
/// only the map is guarded.
#[derive(Debug, Default)]
pub struct StubRegistry {
    stubs: RwLock<HashMap<String, Vec<Stub>>>,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add one stub.
    ///
    /// Invalid records are rejected with the error report and an example
    /// record, mirroring what a configuring human should be shown.
    pub async fn add(&self, stub: Stub) -> Result<(), InvalidStubResponse> {
        if let Some(report) = InvalidStubResponse::for_stub(&stub) {
            return Err(report);
        }
        let mut stubs = self.stubs.write().await;
        stubs.entry(stub.full_method.clone()).or_default().push(stub);
        Ok(())
    }

    /// Find the first stub for `full_method` whose expected content is
    /// satisfied by `payload`.
    ///
    /// Malformed payloads degrade to the empty object, so a stub expecting
    /// no fields can still match them. A `None` result is the normal
    /// negative outcome, not an error.
    pub async fn find(&self, full_method: &str, payload: &str) -> Option<Stub> {
        let payload = JsonString::canonicalize(payload);
        let stubs = self.stubs.read().await;
        let candidates = stubs.get(full_method)?;

        for stub in candidates {
            let Some(request) = &stub.request else {
                continue;
            };
            let matched = match request.match_mode {
                MatchMode::Exact => request.content.equals(&payload),
                MatchMode::Partial => request.content.matches(&payload),
            };
            if matched {
                debug!(method = full_method, request = %request, "request matched stub");
                return Some(stub.clone());
            }
        }

        debug!(method = full_method, "no stub matched");
        None
    }

    /// Number of stubs across all methods.
    pub async fn len(&self) -> usize {
        self.stubs.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop all stubs.
    pub async fn clear(&self) {
        self.stubs.write().await.clear();
    }

    /// Load stubs from one JSON or YAML file holding a single record or a
    /// list of records.
    pub async fn load_file(&self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let records = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => parse_json(&content)?,
            Some("yaml") | Some("yml") => parse_yaml(&content)?,
            other => {
                return Err(RegistryError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        let count = records.len();
        for stub in records {
            self.add(stub).await.map_err(RegistryError::Rejected)?;
        }
        info!(path = %path.display(), count, "loaded stub file");
        Ok(count)
    }

    /// Load every `.json`/`.yaml`/`.yml` file in `dir`, non-recursively, in
    /// file-name order.
    pub async fn load_dir(&self, dir: &Path) -> Result<usize, RegistryError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        let mut count = 0;
        for path in paths {
            if !path.is_file() {
                continue;
            }
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") | Some("yaml") | Some("yml") => {
                    count += self.load_file(&path).await?;
                }
                _ => debug!(path = %path.display(), "skipping non-stub file"),
            }
        }
        Ok(count)
    }
}

fn parse_json(content: &str) -> Result<Vec<Stub>, serde_json::Error> {
    match serde_json::from_str::<Vec<Stub>>(content) {
        Ok(stubs) => Ok(stubs),
        Err(_) => serde_json::from_str::<Stub>(content).map(|stub| vec![stub]),
    }
}

fn parse_yaml(content: &str) -> Result<Vec<Stub>, serde_yaml::Error> {
    match serde_yaml::from_str::<Vec<Stub>>(content) {
        Ok(stubs) => Ok(stubs),
        Err(_) => serde_yaml::from_str::<Stub>(content).map(|stub| vec![stub]),
    }
}
