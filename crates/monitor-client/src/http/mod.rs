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

//! HTTP access to the detection service endpoints.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::{DataPayload, HealthStatus, ProtocolError};

/// Default service address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Errors from a single endpoint fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("response is not valid JSON: {0}")]
    Decode(serde_json::Error),

    #[error(transparent)]
    Payload(#[from] ProtocolError),
}

/// Locations of the health and data endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub health_path: String,
    pub data_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Endpoints {
    /// Endpoints at the default paths under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            health_path: "/health".to_string(),
            data_path: "/data".to_string(),
        }
    }

    #[must_use]
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    #[must_use]
    pub fn data_url(&self) -> String {
        join_url(&self.base_url, &self.data_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Fetches and decodes the two service endpoints.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl StatusClient {
    /// Build a client. `timeout` of `None` lets requests run indefinitely.
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoints,
        })
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch component health.
    ///
    /// The status code is not checked: any JSON body is accepted.
    pub async fn fetch_health(&self) -> Result<HealthStatus, FetchError> {
        let body = self
            .http
            .get(self.endpoints.health_url())
            .send()
            .await?
            .bytes()
            .await?;

        let value: Value = serde_json::from_slice(&body).map_err(FetchError::Decode)?;
        Ok(HealthStatus::from_json(value))
    }

    /// Fetch the detection payload, bypassing HTTP caches.
    ///
    /// Returns `Ok(None)` when the service sends an empty payload.
    pub async fn fetch_data(&self) -> Result<Option<DataPayload>, FetchError> {
        let response = self
            .http
            .get(self.endpoints.data_url())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body).map_err(FetchError::Decode)?;
        Ok(DataPayload::from_json(value)?)
    }
}
