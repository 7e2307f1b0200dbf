// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lenient conversions from loosely-typed JSON values.
//!
//! The detection service does not guarantee field types, so numeric fields
//! and labels are read through these helpers instead of strict serde types.

use serde_json::Value;

/// Coerce an optional JSON value to a number.
///
/// Numbers pass through, booleans map to 1/0, strings are trimmed and parsed
/// (empty is 0). Everything else, and any NaN result, is 0.
#[must_use]
pub fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::String(s)) => parse_number(s),
        _ => 0.0,
    };

    if n.is_nan() {
        0.0
    } else {
        n
    }
}

/// Parse a numeric literal: decimal with optional sign and exponent, unsigned
/// `0x`/`0o`/`0b` integers, or the exact word `Infinity`. Anything else is 0.
/// Decimal overflow is infinite.
fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&trimmed[2..], radix).unwrap_or(0.0);
    }

    // f64::from_str also takes "inf", "infinity" and "nan" in any case.
    // Decimal literals never contain these letters; overflow still gives infinity.
    if trimmed.bytes().any(|b| matches!(b.to_ascii_lowercase(), b'i' | b'n')) {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(0.0)
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Whether a value counts as "present" for display purposes.
///
/// `null`, `false`, zero and the empty string are absent.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display text for a present value, or `None` when it is absent.
#[must_use]
pub fn label(value: Option<&Value>) -> Option<String> {
    value.filter(|v| is_truthy(v)).map(display)
}

/// Render a JSON value as plain text.
///
/// Strings are shown verbatim and integral numbers without a fractional part.
#[must_use]
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a trailing ".0"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Short name of a value's JSON type, for error messages.
#[must_use]
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
