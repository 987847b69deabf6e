//! Shared utilities for the bansou workspace.
//!
//! Logging setup and time helpers used by both the sync server and the
//! client binaries.

pub mod logger;
pub mod time;
