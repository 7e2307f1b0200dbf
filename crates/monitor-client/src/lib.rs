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

//! Polling client for a human-detection service.
//!
//! The service exposes two read-only JSON endpoints: `/health` (component
//! status) and `/data` (recent detections with delay and jitter). This
//! library polls both and keeps a named-element [`Dashboard`] up to date:
//!
//! - **Protocol layer**: lenient decoding of the endpoint bodies
//! - **Stats**: delay/jitter averages and the frame-rate estimate
//! - **Dashboard**: element text, table rows, static HTML rendering
//! - **HTTP layer**: reqwest fetches with cache bypass for the data endpoint
//! - **Poller**: independent health and data schedules on tokio
//!
//! # Quick Start
//!
//! ```no_run
//! use monitor_client::{ElementId, Endpoints, PollerConfig, StatusPoller};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PollerConfig {
//!         endpoints: Endpoints::new("http://camera.local:8000"),
//!         ..Default::default()
//!     };
//!     let handle = StatusPoller::new(&config).expect("valid config").spawn();
//!
//!     loop {
//!         let view = handle.snapshot();
//!         println!(
//!             "{} | humans {} | fps {}",
//!             view.text(ElementId::CameraStatus).unwrap_or_default(),
//!             view.text(ElementId::HumanCount).unwrap_or_default(),
//!             view.text(ElementId::Fps).unwrap_or_default(),
//!         );
//!         tokio::time::sleep(Duration::from_secs(2)).await;
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ```
//! use monitor_client::{Dashboard, DataPayload, ElementId, RenderOptions};
//! use serde_json::json;
//!
//! let payload = DataPayload::from_json(json!({
//!     "recent_detections": [{"delay": 20, "jitter": 5}, {"delay": 30, "jitter": 5}],
//! }))
//! .unwrap()
//! .unwrap();
//!
//! let mut dashboard = Dashboard::new();
//! dashboard.apply_data(&payload, &RenderOptions::default());
//! assert_eq!(dashboard.text(ElementId::AvgDelay), Some("25.0 ms"));
//! assert_eq!(dashboard.text(ElementId::Fps), Some("30"));
//! ```

pub mod dashboard;
pub mod http;
pub mod poller;
pub mod protocol;
pub mod stats;

pub use dashboard::{Dashboard, DetectionRow, ElementId, RenderOptions};
pub use http::{Endpoints, FetchError, StatusClient};
pub use poller::{
    Endpoint, PollEvent, PollOutcome, PollerConfig, PollerError, PollerHandle, SharedDashboard,
    StatusPoller,
};
pub use protocol::{DataPayload, DetectionRecord, HealthStatus, ProtocolError};
pub use stats::DetectionStats;
