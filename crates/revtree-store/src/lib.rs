//! revtree store - reference revision store and seed import
//!
//! Provides:
//! - An in-memory, copy-on-write revision store implementing the diff
//!   engine's storage contract
//! - Bottom-up subtree content hashing
//! - Seed Format v0 parser, digest and importer

pub mod errors;
pub mod memstore;
pub mod seed;

// Re-export key types
pub use errors::Result;
pub use memstore::{InsertPosition, MemoryCursor, MemoryStore, NewNode, RevisionWriter};
