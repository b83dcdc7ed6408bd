//! export-state - incremental export state for notebook pipelines
//!
//! This crate provides the core functionality for the `export-state` CLI
//! tool and a small library around it: a persisted map of notebook
//! identifier to last-successful-export instant, which is what lets an
//! export pipeline skip content that has not changed since the previous
//! run.
//!
//! # Architecture
//!
//! - [`state`] - The persisted [`ExportStateStore`] (load/read/update/save)
//! - [`export`] - [`ExportService`] seam and the [`ExportRun`] driver
//! - [`model`] - Data types (Notebook, ExportRequest, NotebookExportResult)
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Base directory resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod state;

pub use error::{Error, Result};
pub use export::{ExportRun, ExportService, RunStats};
pub use model::{ExportRequest, Notebook, NotebookExportResult};
pub use state::ExportStateStore;
