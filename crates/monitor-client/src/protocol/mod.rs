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

//! Response types for the detection service endpoints.
//!
//! Both endpoints return loosely-typed JSON. Fields are kept as raw
//! [`Value`]s and read through the lenient accessors in [`coerce`], so a
//! misbehaving server degrades to placeholders instead of failed refreshes.

pub mod coerce;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Placeholder text for a missing label.
pub const PLACEHOLDER: &str = "-";

/// Errors raised when a data payload has an unusable shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("recent_detections must be an array, got {0}")]
    DetectionsNotArray(&'static str),

    #[error("detection record {0} is null")]
    NullDetection(usize),

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Component status reported by the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub camera: Option<Value>,
    pub database: Option<Value>,
    pub model: Option<Value>,
}

impl HealthStatus {
    /// Build from a decoded health body.
    ///
    /// Bodies that are not JSON objects carry no fields.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn camera_label(&self) -> String {
        label_or_placeholder(self.camera.as_ref())
    }

    #[must_use]
    pub fn database_label(&self) -> String {
        label_or_placeholder(self.database.as_ref())
    }

    #[must_use]
    pub fn model_label(&self) -> String {
        label_or_placeholder(self.model.as_ref())
    }
}

/// One entry of `recent_detections`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionRecord {
    /// Milliseconds since the Unix epoch, or a date-time string.
    pub timestamp: Option<Value>,
    pub status: Option<Value>,
    /// Processing delay in milliseconds.
    pub delay: Option<Value>,
    /// Jitter in milliseconds.
    pub jitter: Option<Value>,
    pub human_count: Option<Value>,
}

impl DetectionRecord {
    #[must_use]
    pub fn delay_ms(&self) -> f64 {
        coerce::number(self.delay.as_ref())
    }

    #[must_use]
    pub fn jitter_ms(&self) -> f64 {
        coerce::number(self.jitter.as_ref())
    }

    #[must_use]
    pub fn status_label(&self) -> String {
        label_or_placeholder(self.status.as_ref())
    }
}

/// Body of the data endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPayload {
    pub recent_detections: Vec<DetectionRecord>,
    pub total_detections: Option<Value>,
    pub human_count: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPayload {
    recent_detections: Value,
    total_detections: Option<Value>,
    human_count: Option<Value>,
}

impl DataPayload {
    /// Build from a decoded data body.
    ///
    /// Returns `Ok(None)` for an absent payload (`null`, `false`, `0`, `""`),
    /// which callers skip without touching the view.
    pub fn from_json(value: Value) -> Result<Option<Self>, ProtocolError> {
        if !coerce::is_truthy(&value) {
            return Ok(None);
        }

        let raw = match value {
            Value::Object(_) => serde_json::from_value::<RawPayload>(value)?,
            _ => RawPayload::default(),
        };

        Ok(Some(Self {
            recent_detections: parse_detections(raw.recent_detections)?,
            total_detections: raw.total_detections,
            human_count: raw.human_count,
        }))
    }

    /// Current human count: the payload field, else the newest record's count, else 0.
    #[must_use]
    pub fn current_human_count(&self) -> String {
        self.human_count
            .as_ref()
            .or_else(|| {
                self.recent_detections
                    .first()
                    .and_then(|record| record.human_count.as_ref())
            })
            .map_or_else(|| "0".to_string(), coerce::display)
    }

    #[must_use]
    pub fn total_detections_text(&self) -> String {
        self.total_detections
            .as_ref()
            .map_or_else(|| "0".to_string(), coerce::display)
    }
}

fn parse_detections(value: Value) -> Result<Vec<DetectionRecord>, ProtocolError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Null => Err(ProtocolError::NullDetection(index)),
                Value::Object(_) => Ok(serde_json::from_value(item)?),
                _ => Ok(DetectionRecord::default()),
            })
            .collect(),
        other if !coerce::is_truthy(&other) => Ok(Vec::new()),
        other => Err(ProtocolError::DetectionsNotArray(coerce::kind(&other))),
    }
}

fn label_or_placeholder(value: Option<&Value>) -> String {
    coerce::label(value).unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_labels() {
        let health = HealthStatus::from_json(json!({
            "camera": "online",
            "database": null,
        }));
        assert_eq!(health.camera_label(), "online");
        assert_eq!(health.database_label(), "-");
        assert_eq!(health.model_label(), "-");
    }

    #[test]
    fn test_health_non_object_has_no_fields() {
        for body in [json!(null), json!("ok"), json!([1, 2]), json!(42)] {
            assert_eq!(HealthStatus::from_json(body), HealthStatus::default());
        }
    }

    #[test]
    fn test_payload_absent_is_skipped() {
        for body in [json!(null), json!(false), json!(0), json!("")] {
            assert!(DataPayload::from_json(body).unwrap().is_none());
        }
    }

    #[test]
    fn test_payload_non_object_is_empty() {
        let payload = DataPayload::from_json(json!([1, 2, 3])).unwrap().unwrap();
        assert!(payload.recent_detections.is_empty());
        assert_eq!(payload.total_detections_text(), "0");
        assert_eq!(payload.current_human_count(), "0");
    }

    #[test]
    fn test_payload_detections_not_array() {
        let err = DataPayload::from_json(json!({"recent_detections": "none"})).unwrap_err();
        assert!(matches!(err, ProtocolError::DetectionsNotArray("string")));

        let err = DataPayload::from_json(json!({"recent_detections": {"a": 1}})).unwrap_err();
        assert!(matches!(err, ProtocolError::DetectionsNotArray("object")));
    }

    #[test]
    fn test_payload_falsy_detections_are_empty() {
        let payload = DataPayload::from_json(json!({"recent_detections": null, "total_detections": 4}))
            .unwrap()
            .unwrap();
        assert!(payload.recent_detections.is_empty());
        assert_eq!(payload.total_detections_text(), "4");
    }

    #[test]
    fn test_payload_null_record_rejected() {
        let err = DataPayload::from_json(json!({"recent_detections": [{"delay": 1}, null]}))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NullDetection(1)));
    }

    #[test]
    fn test_payload_scalar_record_has_no_fields() {
        let payload = DataPayload::from_json(json!({"recent_detections": [5]}))
            .unwrap()
            .unwrap();
        assert_eq!(payload.recent_detections, vec![DetectionRecord::default()]);
        assert_eq!(payload.recent_detections[0].status_label(), "-");
    }

    #[test]
    fn test_human_count_precedence() {
        let explicit = DataPayload::from_json(json!({
            "human_count": 3,
            "recent_detections": [{"human_count": 9}],
        }))
        .unwrap()
        .unwrap();
        assert_eq!(explicit.current_human_count(), "3");

        let from_record = DataPayload::from_json(json!({
            "recent_detections": [{"human_count": 2}, {"human_count": 7}],
        }))
        .unwrap()
        .unwrap();
        assert_eq!(from_record.current_human_count(), "2");

        let zero_is_kept = DataPayload::from_json(json!({
            "human_count": 0,
            "recent_detections": [{"human_count": 5}],
        }))
        .unwrap()
        .unwrap();
        assert_eq!(zero_is_kept.current_human_count(), "0");
    }

    #[test]
    fn test_record_numeric_fields() {
        let record: DetectionRecord = serde_json::from_value(json!({
            "delay": "12.5",
            "jitter": "n/a",
            "status": "person",
        }))
        .unwrap();
        assert_eq!(record.delay_ms(), 12.5);
        assert_eq!(record.jitter_ms(), 0.0);
        assert_eq!(record.status_label(), "person");
    }
}
