//! Resolution of the export base directory.
//!
//! The CLI's `--dir` flag and the `EXPORT_STATE_DIR` environment variable
//! are merged by clap (flag wins). [`resolve_state_dir`] supplies the final
//! fallback, the current directory, so every subcommand resolves the same
//! location the same way.

use std::path::{Path, PathBuf};

/// Environment variable read by the CLI when `--dir` is not given.
pub const STATE_DIR_ENV: &str = "EXPORT_STATE_DIR";

/// Resolve the export base directory.
#[must_use]
pub fn resolve_state_dir(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_directory_wins() {
        let dir = resolve_state_dir(Some(Path::new("/explicit")));
        assert_eq!(dir, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_default_is_current_directory() {
        assert_eq!(resolve_state_dir(None), PathBuf::from("."));
    }
}
