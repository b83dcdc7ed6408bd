//! Status command implementation.

use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::config::resolve_state_dir;
use crate::error::Result;
use crate::state::{render_instant, ExportStateStore};

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    path: String,
    count: usize,
    entries: Vec<EntryOutput>,
}

#[derive(Serialize)]
struct EntryOutput {
    id: String,
    last_export: String,
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error for an empty base directory or when JSON serialization
/// fails. A missing or corrupt state file is not an error: it shows as an
/// empty store, matching what an export run would see.
pub fn execute(dir: Option<&Path>, json: bool) -> Result<()> {
    let store = ExportStateStore::load(resolve_state_dir(dir))?;

    if json {
        let output = StatusOutput {
            path: store.path().display().to_string(),
            count: store.len(),
            entries: store
                .iter()
                .map(|(id, at)| EntryOutput {
                    id: id.to_string(),
                    last_export: render_instant(at),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Export State".bold().underline());
    println!();
    if store.path().exists() {
        let size = fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);
        println!("File: {} ({})", store.path().display(), format_size(size));
    } else {
        println!("File: {} (absent)", store.path().display());
    }
    println!();

    if store.is_empty() {
        println!("{}", "No exports recorded.".dimmed());
        println!();
        println!(
            "{}",
            "Run 'export-state mark <id>' after a successful export.".dimmed()
        );
        return Ok(());
    }

    let now = Utc::now();
    let width = store.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    println!("{}", "Last Export:".blue().bold());
    for (id, at) in store.iter() {
        println!(
            "  {:<width$}  {}  {}",
            id,
            render_instant(at),
            format_age(now.signed_duration_since(at)).dimmed(),
        );
    }
    println!();
    println!("  {}: {}", "Total".bold(), store.len());

    Ok(())
}

/// Format a byte size as a human-readable string.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Format the distance from an instant to now, coarsely.
fn format_age(age: Duration) -> String {
    if age < Duration::zero() {
        return "in the future".to_string();
    }
    let secs = age.num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}
