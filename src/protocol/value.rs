//! Primitive value unions for the JSON-RPC wire format.
//!
//! The automation server only exchanges flat primitives: call parameters
//! are a positional list of booleans, integers, floats, and strings, and a
//! call result is at most one such primitive (or absent). Both sides are
//! modeled as closed tagged unions rather than open `serde_json::Value`s so
//! nested structures cannot leak onto the wire.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Param
// ============================================================================

/// One positional call parameter.
///
/// Serializes untagged, so a `Vec<Param>` becomes a plain JSON array of
/// primitives. `From` impls keep call sites terse:
///
/// ```
/// use android_automator::protocol::Param;
///
/// let params: Vec<Param> = vec![0.into(), 540.into(), 960.into()];
/// assert_eq!(serde_json::to_string(&params).unwrap(), "[0,540,960]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    /// Boolean parameter.
    Bool(bool),
    /// Integer parameter.
    Int(i64),
    /// Floating-point parameter.
    Float(f64),
    /// String parameter.
    Str(String),
}

impl From<bool> for Param {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Param {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Param {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Param {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Param {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Param {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// ============================================================================
// RpcValue
// ============================================================================

/// A decoded call result.
///
/// The server may return any primitive or no result at all. Decoding tries
/// each variant in a fixed priority order (bool, integer, float, string)
/// and falls back to [`RpcValue::None`] for `null`, absent, or non-primitive
/// results.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RpcValue {
    /// Boolean result.
    Bool(bool),
    /// Integer result.
    Int(i64),
    /// Floating-point result.
    Float(f64),
    /// String result.
    Str(String),
    /// No result.
    #[default]
    None,
}

impl RpcValue {
    /// Decodes a result value from raw JSON.
    ///
    /// `None` (the field was absent) and `Value::Null` both decode to
    /// [`RpcValue::None`], as does anything that is not a flat primitive.
    #[must_use]
    pub fn decode(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::None;
        };

        if let Some(b) = value.as_bool() {
            return Self::Bool(b);
        }
        if let Some(i) = value.as_i64() {
            return Self::Int(i);
        }
        if let Some(f) = value.as_f64() {
            return Self::Float(f);
        }
        if let Some(s) = value.as_str() {
            return Self::Str(s.to_string());
        }

        Self::None
    }

    /// Returns the boolean value, if this is a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value, widening an integer if needed.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if there was no result.
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ============================================================================
// Tests
// ============================================================================
