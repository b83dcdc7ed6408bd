//! Last command implementation.

use std::path::Path;

use serde::Serialize;

use crate::config::resolve_state_dir;
use crate::error::{Error, Result};
use crate::state::{render_instant, ExportStateStore};

#[derive(Serialize)]
struct LastOutput<'a> {
    id: &'a str,
    last_export: String,
}

/// Execute the last command.
///
/// Prints the recorded instant bare on stdout so pipelines can capture it
/// directly, e.g. `--modified-since "$(export-state last nb1)"`.
///
/// # Errors
///
/// Returns [`Error::NeverExported`] when no instant is recorded for `id`,
/// so scripts can branch on the exit code.
pub fn execute(id: &str, dir: Option<&Path>, json: bool) -> Result<()> {
    let store = ExportStateStore::load(resolve_state_dir(dir))?;
    let Some(at) = store.last_export(id) else {
        return Err(Error::NeverExported { id: id.to_string() });
    };

    let rendered = render_instant(at);
    if json {
        let output = LastOutput {
            id,
            last_export: rendered,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{rendered}");
    }

    Ok(())
}
