//! Metadata records attached to words and stems.
//!
//! A [`Meta`] is a flat JSON object with one well-known field, `count`, and
//! any number of free-form fields next to it.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Name of the occurrence counter field.
pub const COUNT_FIELD: &str = "count";

/// Reads a counter from any non-negative integral JSON number.
///
/// Counters written by JavaScript behaviors arrive as doubles (`1.0`).
#[must_use]
pub fn count_from_json(value: &JsonValue) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    #[allow(clippy::cast_precision_loss)]
    let in_range = f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    in_range.then(|| f as u64)
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => count_from_json(&value).map(Some).ok_or_else(|| {
            de::Error::custom(format!(
                "count must be a non-negative integral number, got {value}"
            ))
        }),
    }
}

/// Per-key metadata: an optional occurrence counter plus free-form fields.
///
/// # Examples
///
/// ```
/// use wordoink::Meta;
///
/// let mut meta = Meta::new();
/// assert_eq!(meta.count(), 0);
/// assert!(!meta.has_count());
///
/// meta.increment_count();
/// assert_eq!(meta.count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    count: Option<u64>,
    #[serde(flatten)]
    fields: Map<String, JsonValue>,
}

impl Meta {
    /// Creates an empty record with no counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record with the counter preset.
    #[must_use]
    pub fn with_count(count: u64) -> Self {
        Self {
            count: Some(count),
            fields: Map::new(),
        }
    }

    /// Current counter value, 0 when the counter was never set.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(0)
    }

    /// Returns true once the counter has been set.
    #[must_use]
    pub const fn has_count(&self) -> bool {
        self.count.is_some()
    }

    /// Increments the counter, initialising it to 0 first when absent.
    pub fn increment_count(&mut self) -> u64 {
        let count = self.count.get_or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Reads a top-level field. `"count"` resolves to the counter.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<JsonValue> {
        if field == COUNT_FIELD {
            return self.count.map(JsonValue::from);
        }
        self.fields.get(field).cloned()
    }

    /// Sets a field and returns true if it was written.
    ///
    /// Writing `"count"` accepts any non-negative integral number (`3` or
    /// `3.0`) and `null` clears the counter. Any other value for `"count"`
    /// is refused and the counter is left unchanged.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> bool {
        let field = field.into();
        let value = value.into();
        if field != COUNT_FIELD {
            self.fields.insert(field, value);
            return true;
        }
        if value.is_null() {
            self.count = None;
            return true;
        }
        match count_from_json(&value) {
            Some(count) => {
                self.count = Some(count);
                true
            }
            None => {
                log::warn!("ignoring non-integral count {value}");
                false
            }
        }
    }

    /// Free-form fields, without the counter.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    /// Returns true when neither the counter nor any field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.fields.is_empty()
    }

    /// Merges `other` into `self`.
    ///
    /// Nested objects merge key-wise, arrays are extended, other values
    /// overwrite. The counter from `other` wins when it is set.
    pub fn merge_values(&mut self, other: Meta) {
        if other.count.is_some() {
            self.count = other.count;
        }
        for (k, incoming) in other.fields {
            let replacement = match (self.fields.get_mut(&k), incoming) {
                (Some(JsonValue::Object(existing)), JsonValue::Object(incoming)) => {
                    existing.extend(incoming);
                    None
                }
                (Some(JsonValue::Array(existing)), JsonValue::Array(incoming)) => {
                    existing.extend(incoming);
                    None
                }
                (_, incoming) => Some(incoming),
            };
            if let Some(value) = replacement {
                self.fields.insert(k, value);
            }
        }
    }

    /// Renders the record as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut out = self.fields.clone();
        if let Some(count) = self.count {
            out.insert(COUNT_FIELD.to_string(), JsonValue::from(count));
        }
        JsonValue::Object(out)
    }
}
