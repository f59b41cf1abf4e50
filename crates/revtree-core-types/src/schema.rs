//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Diff request identifiers
pub const FIELD_NEW_REVISION: &str = "new_revision";
pub const FIELD_OLD_REVISION: &str = "old_revision";
pub const FIELD_START_KEY: &str = "start_key";
pub const FIELD_NODE_KEY: &str = "node_key";

// Collection sizes
pub const FIELD_EVENTS_FIRED: &str = "events_fired";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
