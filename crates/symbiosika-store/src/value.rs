//! Value coercion: raw text plus a declared type becomes a typed value.
//!
//! Coercion never fails loudly. Anything that cannot be represented as the
//! requested type comes back as `None` (the absent marker), which the
//! key-value facade turns into a delete.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ─────────────────────────────────────────────
// Declared type
// ─────────────────────────────────────────────

/// The type a caller asks a raw value to be stored as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Detect boolean, number, JSON, then fall back to plain text.
    #[default]
    Auto,
    String,
    Number,
    Boolean,
    /// Anything `serde_json` accepts.
    Object,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Auto => "auto",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ValueType::Auto),
            "string" => Ok(ValueType::String),
            "number" => Ok(ValueType::Number),
            "boolean" => Ok(ValueType::Boolean),
            "object" => Ok(ValueType::Object),
            other => Err(format!("unknown value type: {other}")),
        }
    }
}

// ─────────────────────────────────────────────
// Stored value
// ─────────────────────────────────────────────

/// A value that may live in the key-value store.
///
/// There is no "absent" case: coercion returns
/// `Option<StoredValue>` and only `Some` ever reaches the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// A structured JSON value (object or array).
    Object(Value),
}

impl StoredValue {
    /// Map a parsed JSON value. `null` is absent.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(StoredValue::Boolean(b)),
            Value::Number(n) => n.as_f64().map(StoredValue::Number),
            Value::String(s) => Some(StoredValue::String(s)),
            v @ (Value::Array(_) | Value::Object(_)) => Some(StoredValue::Object(v)),
        }
    }

    /// JSON form. Integral numbers that fit in an `i64` come out as integers.
    ///
    /// `i64::MAX as f64` is 2^63, one past the largest `i64`, so the upper
    /// bound is exclusive.
    pub fn to_json(&self) -> Value {
        match self {
            StoredValue::String(s) => Value::String(s.clone()),
            StoredValue::Boolean(b) => Value::Bool(*b),
            StoredValue::Object(v) => v.clone(),
            StoredValue::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
        }
    }

    /// Name of the variant, matching [`ValueType`] spelling.
    pub fn kind(&self) -> ValueType {
        match self {
            StoredValue::String(_) => ValueType::String,
            StoredValue::Number(_) => ValueType::Number,
            StoredValue::Boolean(_) => ValueType::Boolean,
            StoredValue::Object(_) => ValueType::Object,
        }
    }
}

impl Serialize for StoredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StoredValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        StoredValue::from_json(raw)
            .ok_or_else(|| serde::de::Error::custom("null is not a storable value"))
    }
}

// ─────────────────────────────────────────────
// Coercion
// ─────────────────────────────────────────────

/// Coerce raw text into `declared`. `None` means "nothing to store".
pub fn coerce(raw: Option<&str>, declared: ValueType) -> Option<StoredValue> {
    let raw = raw.filter(|s| !s.is_empty());

    match declared {
        ValueType::Auto => {
            let raw = raw?;
            match raw {
                "true" => Some(StoredValue::Boolean(true)),
                "false" => Some(StoredValue::Boolean(false)),
                _ => {
                    if let Some(n) = parse_number(raw) {
                        return Some(StoredValue::Number(n));
                    }
                    match serde_json::from_str::<Value>(raw) {
                        Ok(parsed) => StoredValue::from_json(parsed),
                        Err(_) => Some(StoredValue::String(raw.to_string())),
                    }
                }
            }
        }
        ValueType::String => raw.map(|s| StoredValue::String(s.to_string())),
        ValueType::Number => raw.and_then(parse_number).map(StoredValue::Number),
        ValueType::Boolean => match raw?.to_ascii_lowercase().as_str() {
            "true" => Some(StoredValue::Boolean(true)),
            "false" => Some(StoredValue::Boolean(false)),
            _ => None,
        },
        ValueType::Object => serde_json::from_str::<Value>(raw?)
            .ok()
            .and_then(StoredValue::from_json),
    }
}

/// Parse text that is entirely a finite number.
///
/// Accepts decimal and exponent forms plus unsigned `0x`/`0o`/`0b` integers.
/// Surrounding whitespace is ignored; empty text is not a number.
fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let (Some(head), Some(digits)) = (text.get(..2), text.get(2..)) {
            if head.eq_ignore_ascii_case(prefix) {
                // from_str_radix would take a sign; a literal has none.
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    return None;
                }
                return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
            }
        }
    }

    // Rust accepts "inf"/"nan" spellings; those are not finite numbers.
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
