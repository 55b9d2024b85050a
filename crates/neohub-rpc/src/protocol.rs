//! NeoHub message types.
//!
//! Every request is a JSON object with exactly one key, the command verb,
//! whose value is the command-specific payload. Commands without arguments
//! use the `{"VERB": 0}` idiom. Replies are flat JSON objects.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Decoded reply from the hub.
///
/// Equality is mapping equality; key order is not significant.
pub type Reply = Map<String, Value>;

/// A single hub command.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    verb: String,
    payload: Value,
}

impl Message {
    #[must_use]
    pub fn new(verb: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            verb: verb.into(),
            payload: payload.into(),
        }
    }

    /// Command without arguments: `{"VERB": 0}`.
    #[must_use]
    pub fn bare(verb: impl Into<String>) -> Self {
        Self::new(verb, 0)
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.verb, &self.payload)?;
        map.end()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{{\"{}\": <unserializable>}}", self.verb),
        }
    }
}
