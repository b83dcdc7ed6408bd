//! Persisted last-export state.
//!
//! [`ExportStateStore`] records, per notebook identifier, the instant of the
//! most recent successful export. The mapping lives in a single JSON file
//! (`.export-state.json`) inside the export base directory, which is what
//! lets a pipeline re-export only content modified since the previous run
//! without an external database.
//!
//! # Fault tolerance
//!
//! Everything environmental degrades instead of failing. A missing, blank,
//! or corrupt state file loads as an empty store, and individual
//! unparseable values are dropped without disturbing their neighbors. A
//! failed save keeps the dirty flag set so a later save retries. The only
//! loud failure is an empty base directory, which is programmer misuse.
//! The worst case of persistent I/O trouble is a full re-export, never
//! skipped content.
//!
//! # Ownership
//!
//! The store exclusively owns its mapping. Callers get narrow read and
//! update operations, never a mutable reference, so dirty tracking and
//! timestamp normalization cannot be bypassed.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use tracing::warn;

use crate::error::{Error, Result};

/// Name of the state file inside the export base directory.
const STATE_FILE_NAME: &str = ".export-state.json";

/// Persisted identifier → last-export-instant map with dirty tracking.
///
/// Created once per base directory per run via [`ExportStateStore::load`],
/// mutated through [`update_last_export`](ExportStateStore::update_last_export),
/// and flushed at most meaningfully once via [`save`](ExportStateStore::save).
/// Not safe for concurrent use against the same directory: there is no file
/// locking, and a concurrent writer is overwritten last-writer-wins.
#[derive(Debug)]
pub struct ExportStateStore {
    file_path: PathBuf,
    entries: BTreeMap<String, DateTime<Utc>>,
    dirty: bool,
}

impl ExportStateStore {
    /// Load export state from `base_dir`.
    ///
    /// Resolves `<base_dir>/.export-state.json` and parses it as a JSON
    /// object of identifier → round-trip timestamp. A missing or blank file
    /// is "no prior state". Values that fail to parse are dropped without
    /// affecting other entries; a top-level read or parse failure is logged
    /// as a warning and yields an empty, fully usable store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] only when `base_dir` is
    /// empty/whitespace. Environmental failures never surface here.
    pub fn load(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        if base_dir.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(Error::InvalidArgument(
                "base directory cannot be empty".to_string(),
            ));
        }

        let file_path = base_dir.join(STATE_FILE_NAME);
        let entries = match read_entries(&file_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    path = %file_path.display(),
                    error = %e,
                    "Unable to load export state, continuing without persisted state"
                );
                BTreeMap::new()
            }
        };

        Ok(Self {
            file_path,
            entries,
            dirty: false,
        })
    }

    /// The recorded last-export instant for `id`.
    ///
    /// Returns `None` for empty/whitespace identifiers and for identifiers
    /// never exported. Pure read; no side effects.
    #[must_use]
    pub fn last_export(&self, id: &str) -> Option<DateTime<Utc>> {
        if id.trim().is_empty() {
            return None;
        }
        self.entries.get(id).copied()
    }

    /// Record a successful export of `id` at `at`, overwriting any prior
    /// value and marking the store dirty.
    ///
    /// The instant may carry any time zone; it is normalized to the absolute
    /// UTC instant before storage. Empty/whitespace identifiers are a no-op.
    /// Never fails.
    pub fn update_last_export<Tz: TimeZone>(&mut self, id: &str, at: DateTime<Tz>) {
        if id.trim().is_empty() {
            return;
        }
        self.entries.insert(id.to_string(), at.with_timezone(&Utc));
        self.dirty = true;
    }

    /// Persist the mapping to the state file if anything changed.
    ///
    /// A clean store is a no-op. On success the dirty flag clears; on I/O
    /// failure a warning is logged and the flag stays set so a later call
    /// retries. The failure is never propagated: worst case, state is not
    /// remembered and the next run re-exports in full.
    pub fn save(&mut self) {
        if !self.dirty {
            return;
        }

        match self.write_entries() {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "Unable to persist export state"
                );
            }
        }
    }

    /// Whether unsaved updates exist since the last load or successful save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of identifiers with recorded state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no identifier has recorded state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only walk of the entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.entries.iter().map(|(id, at)| (id.as_str(), *at))
    }

    /// The resolved state file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Serialize the mapping and write it atomically: temp file in the same
    /// directory, flush and sync, then rename over the target. A failed
    /// write leaves any previous state file intact.
    fn write_entries(&self) -> Result<()> {
        if let Some(dir) = self.file_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let payload: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(id, at)| (id.as_str(), render_instant(*at)))
            .collect();
        let json = serde_json::to_string_pretty(&payload)?;

        let temp_path = self.file_path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.file_path)?;

        Ok(())
    }
}

/// Read and parse the state file.
///
/// Missing or blank files are prior-state-absent, not errors. Individual
/// values that are not round-trip timestamps are dropped.
fn read_entries(path: &Path) -> Result<BTreeMap<String, DateTime<Utc>>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let json = fs::read_to_string(path)?;
    if json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: BTreeMap<String, String> = serde_json::from_str(&json)?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, value)| parse_instant(&value).map(|at| (id, at)))
        .collect())
}

/// Parse a round-trip (offset/"Z"-qualified RFC 3339) timestamp.
///
/// Empty, malformed, or offset-less values are rejected, so one bad value
/// never poisons the rest of the file.
pub(crate) fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Render an instant in UTC round-trip form (`...Z`).
pub(crate) fn render_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
