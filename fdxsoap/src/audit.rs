//! Journal d'audit des échanges requête/réponse
//!
//! Chaque appel produit un [`AuditRecord`], transmis à un [`AuditSink`] qu'il
//! réussisse ou non. Un échec d'écriture est journalisé par le client et ne
//! remplace jamais l'issue de l'appel.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Identité optionnelle de l'appelant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Requester {
    pub user_id: Option<String>,
    pub app_name: Option<String>,
}

impl Requester {
    pub fn new(user_id: Option<String>, app_name: Option<String>) -> Option<Self> {
        if user_id.is_none() && app_name.is_none() {
            None
        } else {
            Some(Self { user_id, app_name })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub operation: String,
    pub request_body: String,
    /// Absent when the exchange failed at the transport level
    pub response_body: Option<String>,
    pub status: Option<u16>,
    pub requester: Option<Requester>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        operation: impl Into<String>,
        request_body: impl Into<String>,
        response_body: Option<String>,
        status: Option<u16>,
        requester: Option<Requester>,
    ) -> Self {
        Self {
            operation: operation.into(),
            request_body: request_body.into(),
            response_body,
            status,
            requester,
            recorded_at: Utc::now(),
        }
    }
}

/// Destination des enregistrements d'audit
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<()>;
}

/// Émet un événement `tracing` par échange
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        info!(
            operation = %record.operation,
            status = ?record.status,
            user_id = ?record.requester.as_ref().and_then(|r| r.user_id.as_deref()),
            app_name = ?record.requester.as_ref().and_then(|r| r.app_name.as_deref()),
            request_bytes = record.request_body.len(),
            response_bytes = record.response_body.as_ref().map(String::len),
            "FedEx exchange recorded"
        );
        Ok(())
    }
}

/// Ajoute un objet JSON par ligne à un fichier
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesAuditSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open audit log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to write audit log {}", self.path.display()))?;
        Ok(())
    }
}

/// Conserve les enregistrements en mémoire
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(response: Option<&str>) -> AuditRecord {
        AuditRecord::new(
            "Cancel Pickup",
            "<CancelPickupRequest/>",
            response.map(str::to_string),
            response.map(|_| 200),
            Requester::new(Some("42".into()), Some("dispatch".into())),
        )
    }

    #[test]
    fn test_requester_requires_one_field() {
        assert!(Requester::new(None, None).is_none());
        assert!(Requester::new(None, Some("app".into())).is_some());
    }

    #[test]
    fn test_json_lines_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonLinesAuditSink::new(dir.path().join("audit.jsonl"));

        sink.record(&sample(Some("<CancelPickupReply/>"))).unwrap();
        sink.record(&sample(None)).unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["operation"], "Cancel Pickup");
        assert_eq!(lines[0]["requester"]["user_id"], "42");
        assert_eq!(lines[0]["status"], 200);
        assert!(lines[1]["response_body"].is_null());
    }

    #[test]
    fn test_json_lines_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonLinesAuditSink::new(dir.path().join("missing").join("audit.jsonl"));
        assert!(sink.record(&sample(None)).is_err());
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemoryAuditSink::new();
        sink.record(&sample(None)).unwrap();
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.records()[0].request_body, "<CancelPickupRequest/>");
    }
}
