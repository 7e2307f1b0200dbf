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

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! Every field has a serde default so older or hand-edited files keep loading.

use std::time::Duration;

use monitor_client::dashboard::timestamp;
use monitor_client::{Endpoints, PollerConfig, RenderOptions};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "detection-monitor";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Detection service address, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Milliseconds between data refreshes
    #[serde(default = "default_data_interval_ms")]
    pub data_interval_ms: u64,

    /// Milliseconds between health refreshes
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,

    /// Per-request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Rows shown in the detections table
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Upper bound for the frame-rate estimate
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    /// strftime pattern for the detection time column
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Show the floating status pane on startup
    #[serde(default = "default_true")]
    pub status_pane_visible: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1 // Current schema version
}

fn default_base_url() -> String {
    monitor_client::http::DEFAULT_BASE_URL.to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_data_path() -> String {
    "/data".to_string()
}

fn default_data_interval_ms() -> u64 {
    2000
}

fn default_health_interval_ms() -> u64 {
    5000
}

fn default_max_rows() -> usize {
    monitor_client::dashboard::DEFAULT_MAX_ROWS
}

fn default_fps_cap() -> u32 {
    monitor_client::stats::DEFAULT_FPS_CAP
}

fn default_time_format() -> String {
    monitor_client::dashboard::DEFAULT_TIME_FORMAT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            base_url: default_base_url(),
            health_path: default_health_path(),
            data_path: default_data_path(),
            data_interval_ms: default_data_interval_ms(),
            health_interval_ms: default_health_interval_ms(),
            request_timeout_ms: None,
            max_rows: default_max_rows(),
            fps_cap: default_fps_cap(),
            time_format: default_time_format(),
            status_pane_visible: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the default file if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Check values that would make polling or rendering misbehave
    pub fn validate(&self) -> Result<(), String> {
        if self.data_interval_ms == 0 {
            return Err("data_interval_ms must be greater than zero".to_string());
        }
        if self.health_interval_ms == 0 {
            return Err("health_interval_ms must be greater than zero".to_string());
        }
        if self.request_timeout_ms == Some(0) {
            return Err("request_timeout_ms must be greater than zero when set".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }
        if !timestamp::is_valid_format(&self.time_format) {
            return Err(format!("time_format '{}' is not a valid strftime pattern", self.time_format));
        }
        Ok(())
    }

    /// Build the poller configuration from these settings
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            endpoints: Endpoints {
                base_url: self.base_url.clone(),
                health_path: self.health_path.clone(),
                data_path: self.data_path.clone(),
            },
            data_interval: Duration::from_millis(self.data_interval_ms),
            health_interval: Duration::from_millis(self.health_interval_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            render: RenderOptions {
                max_rows: self.max_rows,
                fps_cap: self.fps_cap,
                time_format: self.time_format.clone(),
                utc_offset: None,
            },
            ..PollerConfig::default()
        }
    }
}
