//! Command implementations.

pub mod clear;
pub mod completions;
pub mod last;
pub mod mark;
pub mod status;
pub mod version;
