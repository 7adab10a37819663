use serde::{Deserialize, Serialize};

/// An error the remote reports for a cell (e.g. `#DIV/0!`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorValue {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// The kinds of value a cell can hold on the wire.
///
/// The enum is externally tagged so that `Number(2.0)` serializes as
/// `{"numberValue": 2.0}`, matching the remote update payload exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExtendedValue {
    #[serde(rename = "numberValue")]
    Number(f64),
    #[serde(rename = "stringValue")]
    Text(String),
    #[serde(rename = "boolValue")]
    Bool(bool),
    #[serde(rename = "formulaValue")]
    Formula(String),
    /// Only ever produced by the remote; raw text never classifies as an error.
    #[serde(rename = "errorValue")]
    Error(ErrorValue),
}

impl ExtendedValue {
    /// Build the outbound typed value for a raw text cell value, per
    /// [`classify`].
    pub fn from_raw(raw: &str) -> Self {
        match classify(raw) {
            ValueKind::Formula => ExtendedValue::Formula(raw.to_string()),
            ValueKind::Bool => ExtendedValue::Bool(raw == "TRUE"),
            ValueKind::Number => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => ExtendedValue::Number(n),
                // Unreachable after classify, but keeps the conversion total.
                _ => ExtendedValue::Text(raw.to_string()),
            },
            ValueKind::Text => ExtendedValue::Text(raw.to_string()),
        }
    }
}

/// Which typed wire field a raw text value populates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Bool,
    Formula,
    Text,
}

/// Classify a raw text value into exactly one wire value kind.
///
/// Pure and total:
/// - leading `=` → formula
/// - exactly `TRUE`/`FALSE` → boolean
/// - a full parse as a finite number → number (`f64::from_str` accepts
///   `inf`/`Infinity`/`NaN`, so non-finite results fall through to text)
/// - everything else, including the empty string → text
pub fn classify(raw: &str) -> ValueKind {
    if raw.starts_with('=') {
        return ValueKind::Formula;
    }
    if raw == "TRUE" || raw == "FALSE" {
        return ValueKind::Bool;
    }
    if raw.parse::<i64>().is_ok() {
        return ValueKind::Number;
    }
    if let Ok(n) = raw.parse::<f64>() {
        if n.is_finite() {
            return ValueKind::Number;
        }
    }
    ValueKind::Text
}
