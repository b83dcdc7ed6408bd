//! Domain types shared between the state store, export services, and the CLI.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notebook as seen by an export backend: an opaque stable identifier
/// plus a human-readable name for logs and reports.
///
/// The identifier is the key under which export state is recorded, so it
/// must be stable across runs; the name carries no such requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: String,
    pub name: String,
}

impl Notebook {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Parameters for exporting one notebook.
///
/// The default value is a full export: no filters, no cutoff, the service's
/// own configured output location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Root directory the backend writes exported files under; `None` lets
    /// the service use its configured default.
    pub export_root: Option<PathBuf>,
    /// Only export sections whose name matches, when set.
    pub section_filter: Option<String>,
    /// Only export pages whose title matches, when set.
    pub page_filter: Option<String>,
    /// Skip pages not modified after this instant, when set. Populated by
    /// the run driver from recorded state and any caller-supplied floor.
    pub modified_since: Option<DateTime<Utc>>,
    /// Leave files from previous runs in place instead of clearing the
    /// target before writing.
    pub preserve_existing: bool,
}

/// What one notebook export produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookExportResult {
    /// Pages written this run.
    pub pages_exported: usize,
    /// Pages skipped as up to date under the incremental cutoff.
    pub pages_skipped: usize,
    /// Non-fatal problems the backend absorbed, for the run report.
    pub warnings: Vec<String>,
}

impl NotebookExportResult {
    /// Pages the backend considered, exported and skipped together.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages_exported + self.pages_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_request_defaults_are_full_export() {
        let request = ExportRequest::default();
        assert!(request.export_root.is_none());
        assert!(request.section_filter.is_none());
        assert!(request.page_filter.is_none());
        assert!(request.modified_since.is_none());
        assert!(!request.preserve_existing);

        let rooted = ExportRequest {
            export_root: Some(PathBuf::from("/tmp/out")),
            ..ExportRequest::default()
        };
        assert_eq!(rooted.export_root.as_deref(), Some(Path::new("/tmp/out")));
    }

    #[test]
    fn test_result_totals() {
        let result = NotebookExportResult {
            pages_exported: 3,
            pages_skipped: 2,
            warnings: vec!["images missing".to_string()],
        };
        assert_eq!(result.total_pages(), 5);
    }
}
