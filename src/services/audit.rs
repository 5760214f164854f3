//! Audit trail: best-effort recording and periodic export

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{AuditAction, AuditEntity, AuditLog},
    repository::AuditStore,
};

/// Appends audit records without ever failing the caller
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record `action` on `entity`, snapshotting `payload`.
    /// Failures are logged and swallowed.
    pub async fn record<T: Serialize + ?Sized>(
        &self,
        entity: AuditEntity,
        action: AuditAction,
        performed_by: &str,
        payload: &T,
    ) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    entity = entity.as_str(),
                    action = action.as_str(),
                    "Failed to serialize audit payload: {}",
                    e
                );
                return;
            }
        };

        let entry = AuditLog::new(entity, action, performed_by, data);
        if let Err(e) = self.store.append(&entry).await {
            tracing::warn!(
                entity = entity.as_str(),
                action = action.as_str(),
                "Failed to write audit log: {}",
                e
            );
        }
    }
}

/// Destination for exported audit entries
#[async_trait]
pub trait AuditExportSink: Send + Sync {
    async fn export(&self, entries: &[AuditLog]) -> AppResult<()>;
}

/// Writes each entry as a structured log line
pub struct LogExportSink;

#[async_trait]
impl AuditExportSink for LogExportSink {
    async fn export(&self, entries: &[AuditLog]) -> AppResult<()> {
        for entry in entries {
            tracing::info!(
                target: "audit",
                id = %entry.id,
                timestamp = %entry.timestamp,
                entity = %entry.entity,
                action = %entry.action,
                performed_by = %entry.performed_by,
                data = %entry.data,
                "Audit entry exported"
            );
        }
        Ok(())
    }
}

/// Hand one batch of unexported entries to `sink`, then mark them exported.
/// Returns the number of entries marked.
pub async fn export_batch(
    store: &dyn AuditStore,
    sink: &dyn AuditExportSink,
    batch_size: i64,
) -> AppResult<u64> {
    let entries = store.unexported(batch_size).await?;
    if entries.is_empty() {
        return Ok(0);
    }

    sink.export(&entries).await?;

    let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
    store.mark_exported(&ids).await
}

/// Spawn the background exporter. It runs until the runtime shuts down.
pub fn spawn_audit_exporter(
    store: Arc<dyn AuditStore>,
    sink: Arc<dyn AuditExportSink>,
    interval: Duration,
    batch_size: i64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);
        loop {
            interval_timer.tick().await;
            match export_batch(store.as_ref(), sink.as_ref(), batch_size).await {
                Ok(0) => {}
                Ok(exported) => tracing::info!(exported = exported, "Exported audit entries"),
                Err(e) => tracing::warn!("Audit export failed: {}", e),
            }
        }
    })
}
