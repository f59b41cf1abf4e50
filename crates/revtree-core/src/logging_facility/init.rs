//! Subscriber installation for binaries

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output shape of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines on stderr, debug and above
    Development,
    /// One JSON object per line on stderr, info and above
    Production,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset or unparsable
    pub fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "revtree=debug",
            Profile::Production => "revtree=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls do nothing.
///
/// Tests install [`init_test_capture`](super::init_test_capture) instead.
///
/// ```
/// use revtree_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        match profile {
            Profile::Development => builder.finish().init(),
            Profile::Production => builder.json().finish().init(),
        }
    });
}
