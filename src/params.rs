//! Typed extraction of named command parameters.
//!
//! Every command's optional fields carry defaults that are part of its
//! public contract: an absent (or explicitly null) field never errors, it
//! takes the default. Only a field of the wrong type, or a missing field
//! that the command declares required, is reported — and that report becomes
//! an error response, never a closed connection.

use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to extract a typed field from a command's parameters.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    /// A required field was absent.
    #[error("missing required parameter: {0}")]
    Missing(&'static str),
    /// A field was present but held an incompatible value.
    #[error("parameter {name} must be {expected}")]
    Type {
        /// Field name as declared in the command table.
        name: &'static str,
        /// Description of the accepted type.
        expected: &'static str,
    },
}

/// Read-only view over a command's `params` mapping.
#[derive(Clone, Debug, Default)]
pub struct Params(Map<String, Value>);

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self { Self(map) }
}

impl Params {
    /// Fetch a field, treating JSON `null` the same as absence.
    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    fn type_error(name: &'static str, expected: &'static str) -> ParamError {
        ParamError::Type { name, expected }
    }

    /// String field with a default.
    pub fn str_or(&self, name: &'static str, default: &str) -> Result<String, ParamError> {
        match self.field(name) {
            None => Ok(default.to_owned()),
            Some(value) => value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| Self::type_error(name, "a string")),
        }
    }

    /// Boolean field with a default.
    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, ParamError> {
        match self.field(name) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| Self::type_error(name, "a boolean")),
        }
    }

    /// Numeric field with a default; integers widen to `f64`.
    pub fn f64_or(&self, name: &'static str, default: f64) -> Result<f64, ParamError> {
        match self.field(name) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| Self::type_error(name, "a number")),
        }
    }

    /// Signed integer field with a default.
    pub fn i64_or(&self, name: &'static str, default: i64) -> Result<i64, ParamError> {
        match self.field(name) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| Self::type_error(name, "an integer")),
        }
    }

    /// Unsigned 32-bit field with a default.
    pub fn u32_or(&self, name: &'static str, default: u32) -> Result<u32, ParamError> {
        match self.field(name) {
            None => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|raw| u32::try_from(raw).ok())
                .ok_or_else(|| Self::type_error(name, "a non-negative integer")),
        }
    }

    /// Collection or element index with a default. Lookup indices are
    /// non-negative; relative (negative) indexing is not part of the host
    /// contract.
    pub fn index_or(&self, name: &'static str, default: usize) -> Result<usize, ParamError> {
        match self.field(name) {
            None => Ok(default),
            Some(value) => Self::as_index(value).ok_or_else(|| Self::type_error(name, "an index")),
        }
    }

    /// Required index field.
    pub fn require_index(&self, name: &'static str) -> Result<usize, ParamError> {
        match self.field(name) {
            None => Err(ParamError::Missing(name)),
            Some(value) => Self::as_index(value).ok_or_else(|| Self::type_error(name, "an index")),
        }
    }

    /// Optional index field without a default.
    pub fn opt_index(&self, name: &'static str) -> Result<Option<usize>, ParamError> {
        match self.field(name) {
            None => Ok(None),
            Some(value) => Self::as_index(value)
                .map(Some)
                .ok_or_else(|| Self::type_error(name, "an index")),
        }
    }

    /// Optional numeric field without a default.
    pub fn opt_f64(&self, name: &'static str) -> Result<Option<f64>, ParamError> {
        match self.field(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| Self::type_error(name, "a number")),
        }
    }

    /// Optional boolean field without a default.
    pub fn opt_bool(&self, name: &'static str) -> Result<Option<bool>, ParamError> {
        match self.field(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| Self::type_error(name, "a boolean")),
        }
    }

    /// Optional string field without a default.
    pub fn opt_str(&self, name: &'static str) -> Result<Option<String>, ParamError> {
        match self.field(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|text| Some(text.to_owned()))
                .ok_or_else(|| Self::type_error(name, "a string")),
        }
    }

    /// Array field defaulting to empty.
    pub fn list_or_empty(&self, name: &'static str) -> Result<Vec<Value>, ParamError> {
        match self.field(name) {
            None => Ok(Vec::new()),
            Some(value) => value
                .as_array()
                .cloned()
                .ok_or_else(|| Self::type_error(name, "an array")),
        }
    }

    /// Required array field.
    pub fn require_list(&self, name: &'static str) -> Result<Vec<Value>, ParamError> {
        match self.field(name) {
            None => Err(ParamError::Missing(name)),
            Some(value) => value
                .as_array()
                .cloned()
                .ok_or_else(|| Self::type_error(name, "an array")),
        }
    }

    /// Optional array of indices without a default.
    pub fn opt_index_list(&self, name: &'static str) -> Result<Option<Vec<usize>>, ParamError> {
        match self.field(name) {
            None => Ok(None),
            Some(value) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| Self::type_error(name, "an array of indices"))?;
                items
                    .iter()
                    .map(|item| {
                        Self::as_index(item)
                            .ok_or_else(|| Self::type_error(name, "an array of indices"))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some)
            }
        }
    }

    fn as_index(value: &Value) -> Option<usize> {
        value.as_u64().and_then(|raw| usize::try_from(raw).ok())
    }
}
