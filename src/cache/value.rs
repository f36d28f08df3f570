//! Cache Value Module
//!
//! Tagged container for the payload of a cache item. Typed values cross the
//! item boundary through an explicit encode/decode step.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Cache Value ==
/// A stored payload.
///
/// A JSON `null` is a legitimate stored value; the absence of a value is
/// expressed with `Option<CacheValue>` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheValue(Value);

impl CacheValue {
    /// Encodes any serializable value.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Decodes the payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }

    /// Serializes the payload for byte-oriented backends.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    /// Restores a payload produced by [`CacheValue::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    /// Returns the payload as a string slice if it holds a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Returns the payload as an integer if it holds one.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    /// Borrows the underlying JSON value.
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Consumes the container, returning the underlying JSON value.
    pub fn into_json(self) -> Value {
        self.0
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        Self(Value::Bool(value))
    }
}

impl PartialEq<&str> for CacheValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
