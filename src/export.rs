//! Incremental export driver.
//!
//! [`ExportService`] is the seam a format backend implements; [`ExportRun`]
//! owns the loop around it: resolve the per-notebook incremental cutoff from
//! recorded state, export, record the new instant on success, and persist
//! state exactly once at the end of the run.
//!
//! # Cutoff rule
//!
//! The cutoff handed to the backend is the later of the caller-supplied
//! floor and the notebook's recorded last export. Taking the later value
//! means a stale caller floor never re-exports content the state already
//! knows is current, and a caller can still force a wider window by
//! clearing state rather than by lying about dates.
//!
//! # Failure isolation
//!
//! One notebook failing must not abandon the rest of the run, and must not
//! advance that notebook's recorded state: the next run retries it from the
//! same cutoff. The new instant is captured *before* the backend runs, so
//! content modified mid-export is re-examined next time instead of lost.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{ExportRequest, Notebook, NotebookExportResult};
use crate::state::ExportStateStore;

/// A format backend that can export one notebook at a time.
///
/// Implementations are free to keep session state (API clients, open
/// handles) across calls, hence `&mut self`.
pub trait ExportService {
    /// Short stable code for the output format, e.g. `md`.
    fn format_code(&self) -> &str;

    /// Export `notebook` under the parameters in `request`, honoring
    /// `request.modified_since` as the incremental cutoff when set.
    ///
    /// # Errors
    ///
    /// Returns an error when the notebook could not be exported. The driver
    /// treats this as fatal for the notebook but not for the run.
    fn export_notebook(
        &mut self,
        notebook: &Notebook,
        request: &ExportRequest,
    ) -> Result<NotebookExportResult>;
}

/// Aggregate counters for one run over a set of notebooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunStats {
    pub notebooks_exported: usize,
    pub notebooks_failed: usize,
    pub pages_exported: usize,
    pub pages_skipped: usize,
}

impl RunStats {
    /// Notebooks the run attempted, exported and failed together.
    #[must_use]
    pub fn total_notebooks(&self) -> usize {
        self.notebooks_exported + self.notebooks_failed
    }

    /// True when the run attempted nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_notebooks() == 0
    }
}

/// One export run: a backend, the state store to consult and advance, and
/// the request template applied to every notebook.
///
/// `request.modified_since` acts as the caller's cutoff floor; the
/// per-notebook value handed to the backend also folds in recorded state.
pub struct ExportRun<'a, S: ExportService> {
    service: &'a mut S,
    store: &'a mut ExportStateStore,
    request: ExportRequest,
}

impl<'a, S: ExportService> ExportRun<'a, S> {
    pub fn new(
        service: &'a mut S,
        store: &'a mut ExportStateStore,
        request: ExportRequest,
    ) -> Self {
        Self {
            service,
            store,
            request,
        }
    }

    /// Export every notebook, then persist state once.
    ///
    /// Failed notebooks are logged and counted, never propagated; their
    /// recorded state is left untouched so the next run retries them.
    pub fn run(&mut self, notebooks: &[Notebook]) -> RunStats {
        let mut stats = RunStats::default();

        for notebook in notebooks {
            match self.export_one(notebook) {
                Ok(result) => {
                    stats.notebooks_exported += 1;
                    stats.pages_exported += result.pages_exported;
                    stats.pages_skipped += result.pages_skipped;
                    for warning in &result.warnings {
                        warn!(notebook = %notebook.name, "{warning}");
                    }
                }
                Err(e) => {
                    warn!(
                        notebook = %notebook.name,
                        error = %e,
                        "Notebook export failed, continuing with remaining notebooks"
                    );
                    stats.notebooks_failed += 1;
                }
            }
        }

        self.store.save();
        stats
    }

    fn export_one(&mut self, notebook: &Notebook) -> Result<NotebookExportResult> {
        let cutoff = effective_cutoff(
            self.request.modified_since,
            self.store.last_export(&notebook.id),
        );
        debug!(
            notebook = %notebook.name,
            format = self.service.format_code(),
            cutoff = ?cutoff,
            "Exporting notebook"
        );

        // Captured before the backend runs: pages modified mid-export fall
        // after this instant and are picked up again next run.
        let started_at = Utc::now();

        let mut request = self.request.clone();
        request.modified_since = cutoff;
        let result = self.service.export_notebook(notebook, &request)?;

        self.store.update_last_export(&notebook.id, started_at);
        Ok(result)
    }
}

/// The later of the caller's floor and the recorded last export.
fn effective_cutoff(
    floor: Option<DateTime<Utc>>,
    recorded: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (floor, recorded) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Records each call's identifier, cutoff, and wall-clock instant, and
    /// fails notebooks whose id is listed in `fail_ids`.
    struct MockService {
        calls: Vec<(String, Option<DateTime<Utc>>, DateTime<Utc>)>,
        fail_ids: Vec<&'static str>,
    }

    impl MockService {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail_ids: Vec::new(),
            }
        }

        fn failing(fail_ids: Vec<&'static str>) -> Self {
            Self {
                calls: Vec::new(),
                fail_ids,
            }
        }
    }

    impl ExportService for MockService {
        fn format_code(&self) -> &str {
            "md"
        }

        fn export_notebook(
            &mut self,
            notebook: &Notebook,
            request: &ExportRequest,
        ) -> Result<NotebookExportResult> {
            self.calls
                .push((notebook.id.clone(), request.modified_since, Utc::now()));
            if self.fail_ids.contains(&notebook.id.as_str()) {
                return Err(Error::Export(format!("backend refused {}", notebook.name)));
            }
            Ok(NotebookExportResult {
                pages_exported: 2,
                pages_skipped: 1,
                warnings: Vec::new(),
            })
        }
    }

    #[test]
    fn test_effective_cutoff_takes_later() {
        let t1 = utc("2024-01-01T00:00:00Z");
        let t2 = utc("2024-06-01T00:00:00Z");

        assert_eq!(effective_cutoff(None, None), None);
        assert_eq!(effective_cutoff(Some(t1), None), Some(t1));
        assert_eq!(effective_cutoff(None, Some(t2)), Some(t2));
        assert_eq!(effective_cutoff(Some(t1), Some(t2)), Some(t2));
        assert_eq!(effective_cutoff(Some(t2), Some(t1)), Some(t2));
    }

    #[test]
    fn test_first_run_is_full_and_records_state() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let mut service = MockService::new();

        let before = Utc::now();
        let stats = ExportRun::new(&mut service, &mut store, ExportRequest::default())
            .run(&[Notebook::new("nb1", "Work")]);

        assert_eq!(
            stats,
            RunStats {
                notebooks_exported: 1,
                notebooks_failed: 0,
                pages_exported: 2,
                pages_skipped: 1,
            }
        );
        // No prior state and no floor: the backend saw a full export.
        assert_eq!(service.calls[0].1, None);

        let recorded = store.last_export("nb1").unwrap();
        assert!(recorded >= before);
        assert!(recorded <= service.calls[0].2);
    }

    #[test]
    fn test_second_run_passes_recorded_cutoff() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let t1 = utc("2024-01-01T00:00:00Z");
        store.update_last_export("nb1", t1);

        let mut service = MockService::new();
        ExportRun::new(&mut service, &mut store, ExportRequest::default())
            .run(&[Notebook::new("nb1", "Work")]);

        assert_eq!(service.calls[0].1, Some(t1));
    }

    #[test]
    fn test_caller_floor_never_lowers_cutoff() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let recorded = utc("2024-06-01T00:00:00Z");
        store.update_last_export("nb1", recorded);

        let request = ExportRequest {
            modified_since: Some(utc("2024-01-01T00:00:00Z")),
            ..ExportRequest::default()
        };

        let mut service = MockService::new();
        ExportRun::new(&mut service, &mut store, request).run(&[Notebook::new("nb1", "Work")]);

        assert_eq!(service.calls[0].1, Some(recorded));
    }

    #[test]
    fn test_failed_notebook_is_isolated() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let mut service = MockService::failing(vec!["nb1"]);

        let stats = ExportRun::new(&mut service, &mut store, ExportRequest::default())
            .run(&[Notebook::new("nb1", "Work"), Notebook::new("nb2", "Home")]);

        assert_eq!(stats.notebooks_exported, 1);
        assert_eq!(stats.notebooks_failed, 1);
        assert_eq!(stats.total_notebooks(), 2);
        assert_eq!(service.calls.len(), 2);

        // The failure left nb1 unrecorded, so the next run retries it in
        // full; nb2 advanced normally.
        assert_eq!(store.last_export("nb1"), None);
        assert!(store.last_export("nb2").is_some());
    }

    #[test]
    fn test_run_persists_state_once_at_end() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let mut service = MockService::new();

        ExportRun::new(&mut service, &mut store, ExportRequest::default())
            .run(&[Notebook::new("nb1", "Work")]);

        assert!(!store.is_dirty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_all_failed_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = ExportStateStore::load(dir.path()).unwrap();
        let mut service = MockService::failing(vec!["nb1"]);

        ExportRun::new(&mut service, &mut store, ExportRequest::default())
            .run(&[Notebook::new("nb1", "Work")]);

        // Nothing was recorded, so the end-of-run save had nothing to do.
        assert!(!store.is_dirty());
        assert!(!store.path().exists());
    }
}
