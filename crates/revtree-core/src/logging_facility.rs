//! Structured logging for revtree
//!
//! Binaries call [`init`] once with a [`Profile`]. Library code logs
//! operation boundaries with `log_op_start!`, `log_op_end!` and
//! `log_op_error!`; tests assert on them through [`init_test_capture`].
//!
//! The macros expand to paths in `revtree_core_types::schema`, so crates that
//! call them also depend on `revtree-core-types`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
