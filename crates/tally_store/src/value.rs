//! Typed property values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag sent alongside every write.
///
/// Backends that store untyped blobs use it to pick an encoding; backends
/// with native types use it to pick a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    /// A finite floating-point number.
    Number,
    /// A boolean flag.
    Boolean,
    /// An arbitrary JSON document.
    Structured,
}

impl core::fmt::Display for TypeHint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Structured => "structured",
        })
    }
}

/// A value held under one store key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Structured (JSON) value.
    Structured(Value),
}

impl PropertyValue {
    /// Returns the type hint matching this value.
    #[must_use]
    pub fn type_hint(&self) -> TypeHint {
        match self {
            Self::Number(_) => TypeHint::Number,
            Self::Boolean(_) => TypeHint::Boolean,
            Self::Structured(_) => TypeHint::Structured,
        }
    }

    /// Returns the number, if this is a [`Number`](Self::Number).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_hint_follows_variant() {
        assert_eq!(PropertyValue::from(1.5).type_hint(), TypeHint::Number);
        assert_eq!(PropertyValue::from(true).type_hint(), TypeHint::Boolean);
        assert_eq!(
            PropertyValue::from(json!({"a": 1})).type_hint(),
            TypeHint::Structured
        );
    }

    #[test]
    fn accessors_reject_other_variants() {
        assert_eq!(PropertyValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(PropertyValue::Boolean(false).as_number(), None);
        assert_eq!(PropertyValue::Structured(json!(3)).as_number(), None);
    }

    #[test]
    fn serialized_form_is_tagged() {
        let encoded = serde_json::to_value(PropertyValue::Number(2.5)).unwrap();
        assert_eq!(encoded, json!({"type": "number", "value": 2.5}));
    }
}
