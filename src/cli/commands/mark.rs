//! Mark command implementation.

use std::io;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::config::resolve_state_dir;
use crate::error::{Error, Result};
use crate::state::{parse_instant, render_instant, ExportStateStore};

#[derive(Serialize)]
struct MarkOutput<'a> {
    id: &'a str,
    last_export: String,
}

/// Execute the mark command.
///
/// Unlike the library API, which quietly ignores empty identifiers and
/// absorbs save failures, the CLI is loud about both: a mark the user asked
/// for either persists or fails the command.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty identifier or an
/// unparseable `--at` value, and an I/O error when the state file could not
/// be written.
pub fn execute(id: &str, at: Option<&str>, dir: Option<&Path>, json: bool) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "notebook identifier cannot be empty".to_string(),
        ));
    }
    let instant = match at {
        Some(raw) => parse_instant(raw).ok_or_else(|| {
            Error::InvalidArgument(format!("'{raw}' is not an RFC 3339 timestamp with offset"))
        })?,
        None => Utc::now(),
    };

    let mut store = ExportStateStore::load(resolve_state_dir(dir))?;
    store.update_last_export(id, instant);
    store.save();
    if store.is_dirty() {
        return Err(Error::Io(io::Error::other(format!(
            "could not write {}",
            store.path().display()
        ))));
    }

    let rendered = render_instant(instant);
    if json {
        let output = MarkOutput {
            id,
            last_export: rendered,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Recorded {id} at {rendered}");
    }

    Ok(())
}
