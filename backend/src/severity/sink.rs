//! Persistence for severity records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::SeverityRecord;
use crate::error::{CrewError, CrewResult, ErrorContext};

/// Destination for severity records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store `record`, stamping `created_at`, and return what was stored.
    async fn save(&self, record: SeverityRecord) -> CrewResult<SeverityRecord>;

    /// Up to `limit` most recent records, newest first.
    async fn recent(&self, limit: usize) -> CrewResult<Vec<SeverityRecord>>;
}

/// In-memory record sink.
#[derive(Clone, Default)]
pub struct LocalSink {
    records: Arc<RwLock<Vec<SeverityRecord>>>,
}

impl LocalSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl RecordSink for LocalSink {
    async fn save(&self, mut record: SeverityRecord) -> CrewResult<SeverityRecord> {
        record.created_at = Some(crate::dates::now_utc());
        self.records.write().push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> CrewResult<Vec<SeverityRecord>> {
        Ok(self.records.read().iter().rev().take(limit).cloned().collect())
    }
}

/// Append-only JSON-lines file, one record per line.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation)
            .with_entity("records")
            .with_entity_id(self.path.display())
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn save(&self, mut record: SeverityRecord) -> CrewResult<SeverityRecord> {
        record.created_at = Some(crate::dates::now_utc());
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CrewError::from(e).with_context(self.context("save_record")))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| CrewError::from(e).with_context(self.context("save_record")))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| CrewError::from(e).with_context(self.context("save_record")))?;
        file.flush()
            .await
            .map_err(|e| CrewError::from(e).with_context(self.context("save_record")))?;
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> CrewResult<Vec<SeverityRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CrewError::from(e).with_context(self.context("read_records"))),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
            match serde_json::from_str::<SeverityRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed severity record"
                ),
            }
        }
        Ok(records.into_iter().rev().take(limit).collect())
    }
}
