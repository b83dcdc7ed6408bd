//! Clear command implementation.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::resolve_state_dir;
use crate::error::Result;
use crate::state::ExportStateStore;

#[derive(Serialize)]
struct ClearOutput {
    path: String,
    removed: bool,
}

/// Execute the clear command.
///
/// Deleting the state file is the supported way to force a full re-export,
/// and the recovery tool of last resort for a wedged file. Removing an
/// absent file is a no-op success: either way the next run sees no prior
/// state.
///
/// # Errors
///
/// Returns an error for an empty base directory or when the file exists but
/// cannot be removed.
pub fn execute(dir: Option<&Path>, json: bool) -> Result<()> {
    // Loading first validates the directory argument; a corrupt file still
    // loads (as empty), so clear works exactly when it is needed most.
    let store = ExportStateStore::load(resolve_state_dir(dir))?;
    let path = store.path();

    let removed = if path.exists() {
        fs::remove_file(path)?;
        true
    } else {
        false
    };

    if json {
        let output = ClearOutput {
            path: path.display().to_string(),
            removed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if removed {
        println!("Removed {}", path.display());
    } else {
        println!("No state file at {}", path.display());
    }

    Ok(())
}
