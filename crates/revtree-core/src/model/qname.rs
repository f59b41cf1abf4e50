use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RevTreeError;

/// Qualified element or attribute name (`prefix:local` or `local`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_name: String,
}

impl QName {
    /// Unprefixed name
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Prefixed name
    pub fn prefixed(prefix: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
        }
    }

    /// Parse `prefix:local` or `local`
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for empty parts, more than one colon, or whitespace.
    pub fn parse(raw: &str) -> Result<Self, RevTreeError> {
        let invalid = || RevTreeError::InvalidName {
            name: raw.to_string(),
        };
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        match raw.split_once(':') {
            None => Ok(Self::local(raw)),
            Some((prefix, local)) => {
                if prefix.is_empty() || local.is_empty() || local.contains(':') {
                    return Err(invalid());
                }
                Ok(Self::prefixed(prefix, local))
            }
        }
    }
}

impl FromStr for QName {
    type Err = RevTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}
