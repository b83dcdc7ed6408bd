//! Error types for export-state.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (SCREAMING_SNAKE strings)
//! - Category-based exit codes (3=not_found, 4=validation, 6=export, 8=io)
//! - Retryability flags for agent self-correction
//! - Recovery hints where an actionable next step exists
//! - Structured JSON output for `--json` consumers
//!
//! The state store itself almost never surfaces these: everything below the
//! usage-error case is absorbed into a warning plus a safe default. The
//! variants here exist for the one loud case (`InvalidArgument`), for the
//! export-service seam, and for the CLI.

use thiserror::Error;

/// Result type alias for export-state operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in export-state operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Programmer misuse: empty base directory, unparseable timestamp flag.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No export has ever been recorded for the identifier.
    #[error("No export recorded for '{id}'")]
    NeverExported { id: String },

    /// An export service failed to export a notebook.
    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NeverExported { .. } => "NEVER_EXPORTED",
            Self::Export(_) => "EXPORT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NeverExported { .. } => 3,
            Self::InvalidArgument(_) => 4,
            Self::Export(_) => 6,
            Self::Io(_) | Self::Json(_) => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True only for validation errors; not-found, export, and I/O
    /// failures will not succeed on a verbatim retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NeverExported { id } => Some(format!(
                "'{id}' has no recorded export, so the next run exports it in full.\n  \
                 Record one: export-state mark {id}"
            )),
            Self::InvalidArgument(msg) if msg.contains("timestamp") => Some(
                "Timestamps must be RFC 3339 with an offset or 'Z', e.g. 2024-01-01T00:00:00Z"
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "retryable": self.is_retryable(),
                "exit_code": self.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NeverExported { id: "nb1".into() }.exit_code(), 3);
        assert_eq!(Error::InvalidArgument("bad".into()).exit_code(), 4);
        assert_eq!(Error::Export("boom".into()).exit_code(), 6);
        let io = Error::Io(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 8);
    }

    #[test]
    fn test_only_validation_is_retryable() {
        assert!(Error::InvalidArgument("bad".into()).is_retryable());
        assert!(!Error::NeverExported { id: "nb1".into() }.is_retryable());
        assert!(!Error::Export("boom".into()).is_retryable());
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::NeverExported { id: "nb1".into() };
        let json = err.to_structured_json();

        assert_eq!(json["error"]["code"], "NEVER_EXPORTED");
        assert_eq!(json["error"]["exit_code"], 3);
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"]["hint"].as_str().unwrap().contains("mark nb1"));
    }

    #[test]
    fn test_timestamp_hint() {
        let err = Error::InvalidArgument("unparseable timestamp '2024-13-99'".into());
        assert!(err.hint().unwrap().contains("RFC 3339"));

        // Non-timestamp validation errors carry no hint
        assert!(Error::InvalidArgument("empty identifier".into()).hint().is_none());
    }
}
