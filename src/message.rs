//! # Message: the unit of data flowing through the pipeline.
//!
//! A [`Message`] is a mutable, keyed collection of string-valued attributes
//! plus one distinguished identifier field. Producers create messages,
//! filters may read or replace attributes on the way through, and targets
//! consume them.
//!
//! ## Invariants
//! - Attribute keys are non-empty, case-sensitive, unique (last write wins).
//! - Attribute values are always present; "set to nothing" is expressed by
//!   [`Message::remove_attribute`], never by a missing value.
//!
//! ## Example
//! ```rust
//! use privflow::Message;
//!
//! let mut msg = Message::new().with_id("hr-42");
//! msg.set_attribute("heart_rate", "71")?;
//! assert_eq!(msg.get_attribute("heart_rate")?, Some("71"));
//! assert_eq!(msg.get_attribute("blood_pressure")?, None);
//! assert!(msg.remove_attribute("heart_rate"));
//! # Ok::<(), privflow::PipelineError>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::PipelineError;

/// Attribute-keyed record flowing through the pipeline.
///
/// Cheap to clone relative to message volume; the broadcast layer clones one
/// copy per registered target. The identifier is free-form and not required
/// to be unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// Optional message identifier. Defaults to absent.
    pub id: Option<String>,
    attributes: HashMap<String, String>,
}

impl Message {
    /// Creates an empty message with no id and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message id (builder style).
    #[inline]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an attribute (builder style).
    ///
    /// Same contract as [`Message::set_attribute`].
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        self.set_attribute(key, value)?;
        Ok(self)
    }

    /// Inserts or overwrites an attribute.
    ///
    /// Fails with [`PipelineError::InvalidArgument`] if `key` is empty.
    /// Values are always present by construction (`Into<String>`); an empty
    /// string is a valid value.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), PipelineError> {
        let key = key.into();
        Self::validate_key(&key)?;
        self.attributes.insert(key, value.into());
        Ok(())
    }

    /// Returns the value stored under `key`, or `None` if the key is unset.
    ///
    /// An absent key is an explicit "not present" result, not an error.
    /// Fails with [`PipelineError::InvalidArgument`] only if `key` is empty.
    pub fn get_attribute(&self, key: &str) -> Result<Option<&str>, PipelineError> {
        Self::validate_key(key)?;
        Ok(self.attributes.get(key).map(String::as_str))
    }

    /// Removes the attribute stored under `key`.
    ///
    /// Returns `true` if a value was present and removed. A missing key is
    /// not an error.
    pub fn remove_attribute(&mut self, key: &str) -> bool {
        self.attributes.remove(key).is_some()
    }

    /// Number of attributes currently set.
    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    fn validate_key(key: &str) -> Result<(), PipelineError> {
        if key.is_empty() {
            return Err(PipelineError::invalid_argument(
                "attribute key must be at least 1 character long",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Message {
    /// Log-oriented rendering: id first, then every key/value pair.
    ///
    /// Pair order is unspecified. This is not a wire format; no round-trip
    /// contract is implied.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId: {}  ", self.id.as_deref().unwrap_or(""))?;
        for (key, value) in &self.attributes {
            write!(f, "[{key} : {value}]  ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let mut msg = Message::new();
        msg.set_attribute("group", "a").unwrap();
        assert_eq!(msg.get_attribute("group").unwrap(), Some("a"));
    }

    #[test]
    fn test_get_unset_key_is_absent_not_error() {
        let msg = Message::new();
        assert_eq!(msg.get_attribute("missing").unwrap(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut msg = Message::new();
        msg.set_attribute("k", "first").unwrap();
        msg.set_attribute("k", "second").unwrap();
        assert_eq!(msg.get_attribute("k").unwrap(), Some("second"));
        assert_eq!(msg.attribute_count(), 1);
    }

    #[test]
    fn test_empty_key_rejected_everywhere() {
        let mut msg = Message::new();
        let set_err = msg.set_attribute("", "v").unwrap_err();
        assert_eq!(set_err.as_label(), "invalid_argument");
        let get_err = msg.get_attribute("").unwrap_err();
        assert_eq!(get_err.as_label(), "invalid_argument");
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let mut msg = Message::new();
        msg.set_attribute("k", "").unwrap();
        assert_eq!(msg.get_attribute("k").unwrap(), Some(""));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut msg = Message::new();
        msg.set_attribute("Key", "upper").unwrap();
        msg.set_attribute("key", "lower").unwrap();
        assert_eq!(msg.get_attribute("Key").unwrap(), Some("upper"));
        assert_eq!(msg.get_attribute("key").unwrap(), Some("lower"));
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut msg = Message::new();
        msg.set_attribute("k", "v").unwrap();
        assert!(msg.remove_attribute("k"));
        assert!(!msg.remove_attribute("k"));
        assert_eq!(msg.get_attribute("k").unwrap(), None);
    }

    #[test]
    fn test_id_defaults_to_absent() {
        let msg = Message::new();
        assert_eq!(msg.id, None);
        let msg = msg.with_id("m-1");
        assert_eq!(msg.id.as_deref(), Some("m-1"));
    }

    #[test]
    fn test_display_contains_id_and_pairs() {
        let msg = Message::new()
            .with_id("m-7")
            .with_attribute("k", "v")
            .unwrap();
        let rendered = msg.to_string();
        assert!(rendered.contains("MessageId: m-7"));
        assert!(rendered.contains("[k : v]"));
    }
}
