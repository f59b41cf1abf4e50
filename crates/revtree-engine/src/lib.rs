//! revtree engine - orchestration layer
//!
//! Runs diff sessions off the async runtime and ties seeds, stores and
//! observers together for callers such as the CLI.

pub mod commands;
pub mod dispatch;

pub use dispatch::{DiffDispatcher, DiffHandle};
