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

//! Named-element view of the detection service.
//!
//! The [`Dashboard`] holds the text of every display element, keyed by the
//! element IDs the front-ends share ([`ElementId`]). Refreshes write into it;
//! renderers (egui pane, static HTML page) only read from it.

mod html;
pub mod timestamp;

pub use html::escape_html;

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use crate::protocol::{DataPayload, HealthStatus, PLACEHOLDER};
use crate::stats::{self, DetectionStats, DEFAULT_FPS_CAP};

/// Maximum number of detection rows rendered.
pub const DEFAULT_MAX_ROWS: usize = 10;

/// Default time-of-day pattern for the detection table.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Display elements of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    CameraStatus,
    DbStatus,
    ModelStatus,
    HumanCount,
    TotalDetections,
    AvgDelay,
    AvgJitter,
    Fps,
    DetectionsBody,
}

impl ElementId {
    pub const ALL: [ElementId; 9] = [
        ElementId::CameraStatus,
        ElementId::DbStatus,
        ElementId::ModelStatus,
        ElementId::HumanCount,
        ElementId::TotalDetections,
        ElementId::AvgDelay,
        ElementId::AvgJitter,
        ElementId::Fps,
        ElementId::DetectionsBody,
    ];

    /// The element ID string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::CameraStatus => "camera-status",
            ElementId::DbStatus => "db-status",
            ElementId::ModelStatus => "model-status",
            ElementId::HumanCount => "human-count",
            ElementId::TotalDetections => "total-detections",
            ElementId::AvgDelay => "avg-delay",
            ElementId::AvgJitter => "avg-jitter",
            ElementId::Fps => "fps",
            ElementId::DetectionsBody => "detections-tbody",
        }
    }

    /// Look up an element by its ID string.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|element| element.as_str() == id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered row of the detections table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRow {
    pub time: String,
    pub status: String,
    pub delay: String,
    pub jitter: String,
}

/// Rendering knobs for data refreshes.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Rows kept in the detections table.
    pub max_rows: usize,
    /// Upper bound for the frame-rate estimate.
    pub fps_cap: u32,
    /// strftime pattern for the time column.
    pub time_format: String,
    /// Display zone for timestamps; `None` uses the local zone.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            fps_cap: DEFAULT_FPS_CAP,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            utc_offset: None,
        }
    }
}

/// Current text of every dashboard element.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    camera_status: String,
    db_status: String,
    model_status: String,
    human_count: String,
    total_detections: String,
    avg_delay: String,
    avg_jitter: String,
    fps: String,
    rows: Vec<DetectionRow>,

    /// Last time health labels were written (including resets)
    pub health_updated_at: Option<DateTime<Utc>>,
    /// Last time a data payload was applied
    pub data_updated_at: Option<DateTime<Utc>>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            camera_status: format!("Camera: {PLACEHOLDER}"),
            db_status: format!("DB: {PLACEHOLDER}"),
            model_status: format!("Model: {PLACEHOLDER}"),
            human_count: "0".to_string(),
            total_detections: "0".to_string(),
            avg_delay: stats::format_ms(0.0),
            avg_jitter: stats::format_ms(0.0),
            fps: "0".to_string(),
            rows: Vec::new(),
            health_updated_at: None,
            data_updated_at: None,
        }
    }

    /// Text content of a scalar element; `None` for the detections table.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        let text = match id {
            ElementId::CameraStatus => &self.camera_status,
            ElementId::DbStatus => &self.db_status,
            ElementId::ModelStatus => &self.model_status,
            ElementId::HumanCount => &self.human_count,
            ElementId::TotalDetections => &self.total_detections,
            ElementId::AvgDelay => &self.avg_delay,
            ElementId::AvgJitter => &self.avg_jitter,
            ElementId::Fps => &self.fps,
            ElementId::DetectionsBody => return None,
        };
        Some(text.as_str())
    }

    /// Rows of the detections table, newest first as received.
    #[must_use]
    pub fn rows(&self) -> &[DetectionRow] {
        &self.rows
    }

    /// Write the three health labels from a fetched status.
    pub fn apply_health(&mut self, health: &HealthStatus) {
        self.write_health_labels(
            &health.camera_label(),
            &health.database_label(),
            &health.model_label(),
        );
    }

    /// Reset the three health labels to the placeholder.
    pub fn reset_health(&mut self) {
        self.write_health_labels(PLACEHOLDER, PLACEHOLDER, PLACEHOLDER);
    }

    fn write_health_labels(&mut self, camera: &str, database: &str, model: &str) {
        self.camera_status = format!("Camera: {camera}");
        self.db_status = format!("DB: {database}");
        self.model_status = format!("Model: {model}");
        self.health_updated_at = Some(Utc::now());
    }

    /// Write counters, averages and table rows derived from a payload.
    ///
    /// Returns the number of rows rendered.
    pub fn apply_data(&mut self, payload: &DataPayload, options: &RenderOptions) -> usize {
        let stats = DetectionStats::from_records(&payload.recent_detections, options.fps_cap);

        self.human_count = payload.current_human_count();
        self.total_detections = payload.total_detections_text();
        self.avg_delay = stats::format_ms(stats.avg_delay_ms);
        self.avg_jitter = stats::format_ms(stats.avg_jitter_ms);
        self.fps = stats.fps.to_string();

        self.rows = payload
            .recent_detections
            .iter()
            .take(options.max_rows)
            .map(|record| DetectionRow {
                time: timestamp::format_time(
                    record.timestamp.as_ref(),
                    options.utc_offset,
                    &options.time_format,
                )
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
                status: record.status_label(),
                delay: stats::format_fixed1(record.delay_ms()),
                jitter: stats::format_fixed1(record.jitter_ms()),
            })
            .collect();

        self.data_updated_at = Some(Utc::now());
        self.rows.len()
    }

    /// Render the whole view as a static HTML page.
    #[must_use]
    pub fn to_html(&self, title: &str) -> String {
        html::render_page(self, title)
    }
}
