//! Message keys.
//!
//! A key addresses one metadata record inside a resource:
//!
//! ```text
//! //resource-name/user-context/user-key
//! ```
//!
//! The user key may itself contain `/`; resource name and user context may
//! not.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const KEY_PATTERN: &str = r"^//([^/]+)/([^/]+)/(.+)$";

static KEY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn key_regex() -> Option<&'static Regex> {
    KEY_REGEX.get_or_init(|| Regex::new(KEY_PATTERN).ok()).as_ref()
}

fn invalid(key: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Parsed message key.
///
/// Serializes as its string form and is validated again on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageKey {
    resource_name: String,
    user_context: String,
    user_key: String,
}

impl MessageKey {
    /// Parses `//resource-name/user-context/user-key`.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidKey`] when the prefix or any segment
    /// is missing.
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        if !key.starts_with("//") {
            return Err(invalid(key, "missing '//' prefix"));
        }
        let re = key_regex().ok_or_else(|| invalid(key, "key grammar unavailable"))?;
        let caps = re
            .captures(key)
            .ok_or_else(|| invalid(key, "expected //resource-name/user-context/user-key"))?;

        Ok(Self {
            resource_name: caps[1].to_string(),
            user_context: caps[2].to_string(),
            user_key: caps[3].to_string(),
        })
    }

    /// Builds a key from its segments.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidKey`] when a segment is empty or the
    /// resource name or context contains `/`.
    pub fn new(
        resource_name: impl Into<String>,
        user_context: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let resource_name = resource_name.into();
        let user_context = user_context.into();
        let user_key = user_key.into();
        let key = format!("//{resource_name}/{user_context}/{user_key}");
        if resource_name.contains('/') || user_context.contains('/') {
            return Err(invalid(&key, "resource name and context may not contain '/'"));
        }
        Self::parse(&key)
    }

    /// Key in the same resource and context with a different user key.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidKey`] when `user_key` is empty.
    pub fn sibling(&self, user_key: &str) -> Result<Self, ValidationError> {
        if user_key.is_empty() {
            return Err(invalid(&format!("{self}"), "sibling user key is empty"));
        }
        Ok(Self {
            resource_name: self.resource_name.clone(),
            user_context: self.user_context.clone(),
            user_key: user_key.to_string(),
        })
    }

    /// Resource the record lives in, e.g. `s3`.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Scope inside the resource.
    pub fn user_context(&self) -> &str {
        &self.user_context
    }

    /// Record name inside the context; the word or stem.
    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    /// Location of the record inside its resource: `user-context/user-key`.
    #[must_use]
    pub fn aggregate_root_key(&self) -> String {
        format!("{}/{}", self.user_context, self.user_key)
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "//{}/{}/{}",
            self.resource_name, self.user_context, self.user_key
        )
    }
}

impl TryFrom<String> for MessageKey {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<MessageKey> for String {
    fn from(key: MessageKey) -> Self {
        key.to_string()
    }
}

impl std::str::FromStr for MessageKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
