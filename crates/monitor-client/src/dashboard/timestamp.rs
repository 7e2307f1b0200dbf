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

//! Detection timestamp parsing and time-of-day formatting.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Check a strftime pattern before it is used for rendering.
#[must_use]
pub fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Format a record timestamp as time of day in the display zone.
///
/// `offset` of `None` means the local time zone. Returns `None` when the
/// value is not a recognizable timestamp.
#[must_use]
pub fn format_time(value: Option<&Value>, offset: Option<FixedOffset>, format: &str) -> Option<String> {
    let instant = parse(value?, offset)?;

    let mut out = String::new();
    let written = match offset {
        Some(offset) => write!(out, "{}", instant.with_timezone(&offset).format(format)),
        None => write!(out, "{}", instant.with_timezone(&Local).format(format)),
    };
    written.ok().map(|()| out)
}

/// Parse a timestamp value.
///
/// Numbers are milliseconds since the Unix epoch. Strings may be RFC 3339,
/// a naive date-time in the display zone, or a bare date at UTC midnight.
#[must_use]
pub fn parse(value: &Value, offset: Option<FixedOffset>) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "out-of-range values saturate and are rejected by chrono"
            )]
            let millis = millis.trunc() as i64;
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(s) => parse_str(s.trim(), offset),
        _ => None,
    }
}

fn parse_str(s: &str, offset: Option<FixedOffset>) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return match offset {
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            None => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> Option<FixedOffset> {
        FixedOffset::east_opt(0)
    }

    #[test]
    fn test_epoch_millis() {
        // 2023-11-14T22:13:20.123Z
        let value = json!(1_700_000_000_123_i64);
        assert_eq!(format_time(Some(&value), utc(), "%H:%M:%S").as_deref(), Some("22:13:20"));
    }

    #[test]
    fn test_offset_applied() {
        let value = json!(1_700_000_000_000_i64);
        let jakarta = FixedOffset::east_opt(7 * 3600);
        assert_eq!(format_time(Some(&value), jakarta, "%H:%M:%S").as_deref(), Some("05:13:20"));
    }

    #[test]
    fn test_string_forms() {
        let rfc = json!("2024-03-01T08:15:30+02:00");
        assert_eq!(format_time(Some(&rfc), utc(), "%H:%M:%S").as_deref(), Some("06:15:30"));

        let naive = json!("2024-03-01 08:15:30.250");
        assert_eq!(format_time(Some(&naive), utc(), "%H:%M:%S").as_deref(), Some("08:15:30"));

        let date = json!("2024-03-01");
        assert_eq!(format_time(Some(&date), utc(), "%H:%M:%S").as_deref(), Some("00:00:00"));
    }

    #[test]
    fn test_naive_read_in_display_zone() {
        let naive = json!("2024-03-01 08:15:30");
        let jakarta = FixedOffset::east_opt(7 * 3600);
        assert_eq!(format_time(Some(&naive), jakarta, "%H:%M:%S").as_deref(), Some("08:15:30"));

        // Local zone round-trips to the same wall-clock time
        assert_eq!(format_time(Some(&naive), None, "%H:%M:%S").as_deref(), Some("08:15:30"));
    }

    #[test]
    fn test_unrecognized_values() {
        for value in [json!("yesterday"), json!(null), json!(true), json!({"t": 1})] {
            assert_eq!(format_time(Some(&value), utc(), "%H:%M:%S"), None);
        }
        assert_eq!(format_time(None, utc(), "%H:%M:%S"), None);
    }

    #[test]
    fn test_format_validation() {
        assert!(is_valid_format("%H:%M:%S"));
        assert!(is_valid_format("%H.%M.%S"));
        assert!(!is_valid_format("%H:%Q"));
    }
}
