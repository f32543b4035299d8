//! File-backed job and snapshot sources

use advisor_lib::error::SupplierError;
use advisor_lib::models::VmSnapshot;
use advisor_lib::orchestrator::{RecordSource, ResizeJob, VmConfigSupplier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One pre-parsed input row; the index is assigned by file position
#[derive(Debug, Deserialize)]
struct JobRow {
    resource_id: String,
    region: String,
    current_profile_id: String,
    target_profile_id: String,
}

/// Resize jobs from a JSON array file
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FileRecordSource {
    async fn fetch_jobs(&self) -> Result<Vec<ResizeJob>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read jobs file {}", self.path.display()))?;
        let rows: Vec<JobRow> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse jobs file {}", self.path.display()))?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| ResizeJob {
                index,
                resource_id: row.resource_id,
                region: row.region,
                current_profile_id: row.current_profile_id,
                target_profile_id: row.target_profile_id,
            })
            .collect())
    }
}

/// Snapshot supplier backed by a resource-id to snapshot JSON map
pub struct FileSnapshotSupplier {
    snapshots: HashMap<String, VmSnapshot>,
}

impl FileSnapshotSupplier {
    /// Load a snapshot map from a JSON object file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshots file {}", path.display()))?;
        let snapshots: HashMap<String, VmSnapshot> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshots file {}", path.display()))?;
        Ok(Self { snapshots })
    }

    /// Supplier holding a single snapshot, for one-off evaluations
    pub fn from_single(resource_id: impl Into<String>, snapshot: VmSnapshot) -> Self {
        let mut snapshots = HashMap::new();
        snapshots.insert(resource_id.into(), snapshot);
        Self { snapshots }
    }
}

#[async_trait]
impl VmConfigSupplier for FileSnapshotSupplier {
    async fn snapshot(&self, resource_id: &str) -> Result<VmSnapshot, SupplierError> {
        self.snapshots
            .get(resource_id)
            .cloned()
            .ok_or_else(|| SupplierError::NotFound(resource_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_record_source_assigns_indices_by_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"resource_id": "vm-a", "region": "westeurope",
                  "current_profile_id": "D8s_v3", "target_profile_id": "D4_v5"}},
                {{"resource_id": "vm-b", "region": "northeurope",
                  "current_profile_id": "E8_v4", "target_profile_id": "E8_v5"}}
            ]"#
        )
        .unwrap();

        let source = FileRecordSource::new(file.path());
        let jobs = source.fetch_jobs().await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].index, 0);
        assert_eq!(jobs[0].resource_id, "vm-a");
        assert_eq!(jobs[1].index, 1);
        assert_eq!(jobs[1].region, "northeurope");
    }

    #[tokio::test]
    async fn test_record_source_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let source = FileRecordSource::new(file.path());
        assert!(source.fetch_jobs().await.is_err());
    }

    #[tokio::test]
    async fn test_record_source_missing_file() {
        let source = FileRecordSource::new("/nonexistent/jobs.json");
        assert!(source.fetch_jobs().await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_supplier_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "vm-a": {{"current_profile_id": "D8s_v3", "region": "westeurope",
                          "data_disk_count": 2, "os_type": "Linux"}}
            }}"#
        )
        .unwrap();

        let supplier = FileSnapshotSupplier::from_path(file.path()).unwrap();
        let snapshot = supplier.snapshot("vm-a").await.unwrap();
        assert_eq!(snapshot.current_profile_id, "D8s_v3");
        assert_eq!(snapshot.data_disk_count, 2);

        let missing = supplier.snapshot("vm-z").await;
        assert!(matches!(missing, Err(SupplierError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_supplier_from_single() {
        let snapshot: VmSnapshot = serde_json::from_str(
            r#"{"current_profile_id": "D2_v3", "region": "westeurope", "os_type": "Windows"}"#,
        )
        .unwrap();
        let supplier = FileSnapshotSupplier::from_single("vm-inline", snapshot);

        assert!(supplier.snapshot("vm-inline").await.is_ok());
        assert!(supplier.snapshot("other").await.is_err());
    }
}
