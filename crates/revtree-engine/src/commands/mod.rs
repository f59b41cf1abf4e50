//! Command orchestration layer.
//!
//! Provides high-level command functions that load a seed into a store and
//! run diffs or listings against it.

pub mod diff;
pub mod engine_command;
pub mod show;
