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

use chrono::{DateTime, Utc};
use monitor_client::{Endpoint, PollEvent, PollOutcome};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Refresh state of one endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndpointState {
    /// No refresh has completed yet
    Waiting,
    Healthy,
    Failing,
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Per-endpoint refresh statistics
#[derive(Debug, Clone)]
pub struct EndpointStatus {
    pub endpoint: Endpoint,

    /// Full request URL
    pub url: String,

    pub state: EndpointState,

    /// Last error message (if any)
    pub last_error: Option<String>,

    /// Completed refreshes, successful or not
    pub request_count: u64,

    pub failure_count: u64,

    /// Failures since the last success
    pub consecutive_failures: u32,

    pub last_success_at: Option<DateTime<Utc>>,

    pub last_latency_ms: f64,

    /// Exponentially smoothed latency
    pub average_latency_ms: f64,
}

impl EndpointStatus {
    pub fn new(endpoint: Endpoint, url: String) -> Self {
        Self {
            endpoint,
            url,
            state: EndpointState::Waiting,
            last_error: None,
            request_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            last_success_at: None,
            last_latency_ms: 0.0,
            average_latency_ms: 0.0,
        }
    }

    /// Seconds since the last successful refresh
    pub fn seconds_since_success(&self) -> Option<i64> {
        self.last_success_at.map(|at| (Utc::now() - at).num_seconds())
    }

    fn update_latency(&mut self, latency_ms: f64) {
        self.last_latency_ms = latency_ms;

        // Simple moving average
        const ALPHA: f64 = 0.1; // Smoothing factor
        if self.average_latency_ms == 0.0 {
            self.average_latency_ms = latency_ms;
        } else {
            self.average_latency_ms = ALPHA * latency_ms + (1.0 - ALPHA) * self.average_latency_ms;
        }
    }
}

/// Poll status tracking for both endpoints plus diagnostics
#[derive(Debug)]
pub struct SystemStatus {
    pub health: EndpointStatus,
    pub data: EndpointStatus,

    /// Data refreshes that returned an empty payload
    pub ignored_payloads: u64,

    /// Rows rendered by the last applied data refresh
    pub last_row_count: usize,

    // Diagnostic messages (keep last 50)
    pub diagnostics: VecDeque<DiagnosticMessage>,
    max_diagnostics: usize,
}

impl SystemStatus {
    pub fn new(health_url: String, data_url: String) -> Self {
        Self {
            health: EndpointStatus::new(Endpoint::Health, health_url),
            data: EndpointStatus::new(Endpoint::Data, data_url),
            ignored_payloads: 0,
            last_row_count: 0,
            diagnostics: VecDeque::with_capacity(50),
            max_diagnostics: 50,
        }
    }

    /// Status for one endpoint
    pub fn endpoint(&self, endpoint: Endpoint) -> &EndpointStatus {
        match endpoint {
            Endpoint::Health => &self.health,
            Endpoint::Data => &self.data,
        }
    }

    fn endpoint_mut(&mut self, endpoint: Endpoint) -> &mut EndpointStatus {
        match endpoint {
            Endpoint::Health => &mut self.health,
            Endpoint::Data => &mut self.data,
        }
    }

    /// Fold one poll event into the statistics
    pub fn record_event(&mut self, event: &PollEvent) {
        let latency_ms = event.latency.as_secs_f64() * 1000.0;
        if let PollOutcome::Applied { rows } = event.outcome {
            if event.endpoint == Endpoint::Data {
                self.last_row_count = rows;
            }
        }
        if event.outcome == PollOutcome::Ignored {
            self.ignored_payloads += 1;
        }

        // Extract status changes first to avoid borrow conflicts
        let diagnostic_message = {
            let status = self.endpoint_mut(event.endpoint);
            status.request_count += 1;
            status.update_latency(latency_ms);

            match &event.outcome {
                PollOutcome::Applied { .. } | PollOutcome::Ignored => {
                    let previous = status.state;
                    status.state = EndpointState::Healthy;
                    status.consecutive_failures = 0;
                    status.last_success_at = Some(event.completed_at);

                    match previous {
                        EndpointState::Waiting => Some((DiagnosticLevel::Info,
                            format!("[{}] First response from {}", event.endpoint, status.url))),
                        EndpointState::Failing => Some((DiagnosticLevel::Info,
                            format!("[{}] Recovered", event.endpoint))),
                        EndpointState::Healthy => None,
                    }
                }
                PollOutcome::Failed(error) => {
                    status.state = EndpointState::Failing;
                    status.failure_count += 1;
                    status.consecutive_failures += 1;

                    // Repeats of the same error only bump the counters
                    let repeated = status.last_error.as_deref() == Some(error.as_str())
                        && status.consecutive_failures > 1;
                    status.last_error = Some(error.clone());

                    if repeated {
                        None
                    } else {
                        Some((DiagnosticLevel::Error,
                            format!("[{}] Refresh failed: {}", event.endpoint, error)))
                    }
                }
            }
        };

        // Add diagnostic after releasing the borrow
        if let Some((level, message)) = diagnostic_message {
            self.add_diagnostic(level, message);
        }
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        let diagnostic = DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        };

        self.diagnostics.push_back(diagnostic);

        // Keep only the last N messages
        while self.diagnostics.len() > self.max_diagnostics {
            self.diagnostics.pop_front();
        }
    }

    /// Number of endpoints whose last refresh succeeded
    pub fn healthy_endpoint_count(&self) -> usize {
        [&self.health, &self.data]
            .iter()
            .filter(|s| s.state == EndpointState::Healthy)
            .count()
    }
}

/// Thread-safe wrapper for SystemStatus
pub type SharedSystemStatus = Arc<Mutex<SystemStatus>>;
