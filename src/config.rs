//! Processor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WordoinkResult};
use crate::stem::DEFAULT_MAX_WORD_LEN;

/// Default user key of the per-context summary record.
pub const DEFAULT_LATEST_KEY: &str = "latest";

/// Configuration for [`crate::processor::StemProcessor`].
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use wordoink::StemConfig;
///
/// let cfg = StemConfig::from_json_str(r#"{"max_word_len": 5}"#).unwrap();
/// assert_eq!(cfg.max_word_len, 5);
/// assert_eq!(cfg.latest_key.as_deref(), Some("latest"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemConfig {
    /// Longest word accepted, in characters.
    pub max_word_len: usize,
    /// User key of the summary record; `None` disables it.
    pub latest_key: Option<String>,
}

impl Default for StemConfig {
    fn default() -> Self {
        Self {
            max_word_len: DEFAULT_MAX_WORD_LEN,
            latest_key: Some(DEFAULT_LATEST_KEY.to_string()),
        }
    }
}

impl StemConfig {
    /// Checks limits and the summary key.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidConfig`] for a zero length limit or
    /// an empty summary key or one containing `/`.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.max_word_len == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "max_word_len must be at least 1".to_string(),
            });
        }
        if let Some(latest) = self.latest_key.as_deref() {
            if latest.is_empty() || latest.contains('/') {
                return Err(ValidationError::InvalidConfig {
                    reason: format!("latest_key '{latest}' must be non-empty and contain no '/'"),
                });
            }
        }
        Ok(self)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns a validation error for malformed JSON or invalid values.
    pub fn from_json_str(raw: &str) -> WordoinkResult<Self> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(cfg.validate()?)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read, or a validation
    /// error as in [`StemConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> WordoinkResult<Self> {
        let path = path.as_ref();
        log::info!("Loading stem configuration from: {path:?}");
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = StemConfig::default();
        assert_eq!(cfg.max_word_len, 7);
        assert_eq!(cfg.latest_key.as_deref(), Some("latest"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = StemConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, StemConfig::default());
    }

    #[test]
    fn test_disable_latest() {
        let cfg = StemConfig::from_json_str(r#"{"latest_key": null}"#).unwrap();
        assert!(cfg.latest_key.is_none());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = StemConfig::from_json_str(r#"{"max_word_len": 0}"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_bad_latest_key_rejected() {
        assert!(StemConfig::from_json_str(r#"{"latest_key": ""}"#).is_err());
        assert!(StemConfig::from_json_str(r#"{"latest_key": "a/b"}"#).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = StemConfig::from_json_str("{").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stem.json");
        std::fs::write(&path, r#"{"max_word_len": 4, "latest_key": "recent"}"#).unwrap();

        let cfg = StemConfig::from_file(&path).unwrap();
        assert_eq!(cfg.max_word_len, 4);
        assert_eq!(cfg.latest_key.as_deref(), Some("recent"));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StemConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::error::WordoinkError::Io(_)));
    }
}
