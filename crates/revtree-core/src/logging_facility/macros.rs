//! `log_op_*` macros
//!
//! Every operation boundary carries `component`, `op` and `event`; extra
//! `key = value` fields are passed through to `tracing` unchanged.

/// Log the start of an operation
///
/// ```
/// # use revtree_core::log_op_start;
/// log_op_start!("run_diff");
/// log_op_start!("run_diff", new_revision = 2u64, old_revision = 1u64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = revtree_core_types::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is mandatory
///
/// ```
/// # use revtree_core::log_op_end;
/// log_op_end!("run_diff", duration_ms = 42);
/// log_op_end!("run_diff", duration_ms = 42, events_fired = 7usize);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = revtree_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log a failed operation at error level with `err.kind` and `err.code`
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError).
///
/// ```
/// # use revtree_core::{log_op_error, errors::RevTreeError};
/// let err = RevTreeError::RevisionNotFound { revision: 4 };
/// log_op_error!("open_cursor", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = revtree_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            message = ex_err.message(),
            $($($field)*)?
        )
    }};
}
