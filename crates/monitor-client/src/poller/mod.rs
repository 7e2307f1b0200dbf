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

//! Periodic refresh of the dashboard from the service endpoints.
//!
//! Each endpoint has its own schedule. A tick spawns an independent refresh
//! task, so a slow request never delays the next tick and overlapping
//! refreshes are allowed; the last one to finish wins.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dashboard::{Dashboard, RenderOptions};
use crate::http::{Endpoints, FetchError, StatusClient};

/// Default period between data refreshes.
pub const DEFAULT_DATA_INTERVAL: Duration = Duration::from_millis(2000);

/// Default period between health refreshes.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_millis(5000);

/// Dashboard shared between the poller and renderers.
pub type SharedDashboard = Arc<RwLock<Dashboard>>;

/// Errors starting the poller.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("{0} interval must be greater than zero")]
    ZeroInterval(Endpoint),

    #[error(transparent)]
    Client(#[from] FetchError),
}

/// Configuration for [`StatusPoller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub endpoints: Endpoints,
    pub data_interval: Duration,
    pub health_interval: Duration,
    /// Per-request timeout; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub render: RenderOptions,
    /// Buffered poll events per subscriber.
    pub event_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            data_interval: DEFAULT_DATA_INTERVAL,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            request_timeout: None,
            render: RenderOptions::default(),
            event_capacity: 64,
        }
    }
}

/// The two polled endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Data,
}

impl Endpoint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Health => "health",
            Endpoint::Data => "data",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The view was updated; `rows` is the table size for data refreshes.
    Applied { rows: usize },
    /// The service sent an empty payload and the view was left alone.
    Ignored,
    /// The refresh failed.
    Failed(String),
}

/// Published after every refresh.
#[derive(Debug, Clone)]
pub struct PollEvent {
    pub endpoint: Endpoint,
    pub outcome: PollOutcome,
    pub latency: Duration,
    pub completed_at: DateTime<Utc>,
}

/// Refreshes a shared [`Dashboard`] from the service endpoints.
#[derive(Clone)]
pub struct StatusPoller {
    client: Arc<StatusClient>,
    dashboard: SharedDashboard,
    render: Arc<RenderOptions>,
    event_tx: broadcast::Sender<PollEvent>,
    data_interval: Duration,
    health_interval: Duration,
}

impl fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPoller")
            .field("endpoints", self.client.endpoints())
            .field("data_interval", &self.data_interval)
            .field("health_interval", &self.health_interval)
            .finish_non_exhaustive()
    }
}

impl StatusPoller {
    /// Create a poller writing into a fresh dashboard.
    pub fn new(config: &PollerConfig) -> Result<Self, PollerError> {
        Self::with_dashboard(config, Arc::new(RwLock::new(Dashboard::new())))
    }

    /// Create a poller writing into an existing dashboard.
    pub fn with_dashboard(config: &PollerConfig, dashboard: SharedDashboard) -> Result<Self, PollerError> {
        if config.data_interval.is_zero() {
            return Err(PollerError::ZeroInterval(Endpoint::Data));
        }
        if config.health_interval.is_zero() {
            return Err(PollerError::ZeroInterval(Endpoint::Health));
        }

        let client = StatusClient::new(config.endpoints.clone(), config.request_timeout)?;
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            client: Arc::new(client),
            dashboard,
            render: Arc::new(config.render.clone()),
            event_tx,
            data_interval: config.data_interval,
            health_interval: config.health_interval,
        })
    }

    #[must_use]
    pub fn dashboard(&self) -> SharedDashboard {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        self.client.endpoints()
    }

    /// Subscribe to poll events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.event_tx.subscribe()
    }

    /// Fetch health and write the status labels.
    ///
    /// Any failure resets all three labels to the placeholder. Never fails.
    pub async fn refresh_health(&self) {
        let started = Instant::now();
        let result = self.client.fetch_health().await;
        let latency = started.elapsed();

        let outcome = match result {
            Ok(health) => {
                self.update(|dashboard| dashboard.apply_health(&health));
                debug!("Health refreshed in {} ms", latency.as_millis());
                PollOutcome::Applied { rows: 0 }
            }
            Err(e) => {
                warn!("Health check failed: {e}");
                self.update(Dashboard::reset_health);
                PollOutcome::Failed(e.to_string())
            }
        };

        self.publish(Endpoint::Health, outcome, latency);
    }

    /// Fetch the detection payload and write counters, averages and rows.
    ///
    /// On failure the view keeps its previous values. Never fails.
    pub async fn refresh_data(&self) {
        let started = Instant::now();
        let result = self.client.fetch_data().await;
        let latency = started.elapsed();

        let outcome = match result {
            Ok(Some(payload)) => {
                let rows = self.update(|dashboard| dashboard.apply_data(&payload, &self.render));
                debug!(
                    "Data refreshed in {} ms: {} detections, {} rows",
                    latency.as_millis(),
                    payload.recent_detections.len(),
                    rows
                );
                PollOutcome::Applied { rows }
            }
            Ok(None) => {
                debug!("Data endpoint returned an empty payload");
                PollOutcome::Ignored
            }
            Err(e) => {
                error!("Failed to update data: {e}");
                PollOutcome::Failed(e.to_string())
            }
        };

        self.publish(Endpoint::Data, outcome, latency);
    }

    fn update<R>(&self, apply: impl FnOnce(&mut Dashboard) -> R) -> R {
        // A panicked writer leaves whole-string fields behind, so the view is still usable
        let mut dashboard = self.dashboard.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut dashboard)
    }

    fn publish(&self, endpoint: Endpoint, outcome: PollOutcome, latency: Duration) {
        // No subscribers is fine
        let _ = self.event_tx.send(PollEvent {
            endpoint,
            outcome,
            latency,
            completed_at: Utc::now(),
        });
    }

    /// Start both schedules on the current tokio runtime.
    ///
    /// Each endpoint is refreshed once immediately, then on its interval
    /// until the returned handle is shut down or dropped.
    #[must_use]
    pub fn spawn(self) -> PollerHandle {
        let cancel_token = CancellationToken::new();

        info!(
            "Polling {} every {} ms and {} every {} ms",
            self.client.endpoints().data_url(),
            self.data_interval.as_millis(),
            self.client.endpoints().health_url(),
            self.health_interval.as_millis()
        );

        let data_poller = self.clone();
        schedule(Endpoint::Data, self.data_interval, cancel_token.clone(), move || {
            let poller = data_poller.clone();
            async move { poller.refresh_data().await }
        });

        let health_poller = self.clone();
        schedule(Endpoint::Health, self.health_interval, cancel_token.clone(), move || {
            let poller = health_poller.clone();
            async move { poller.refresh_health().await }
        });

        PollerHandle {
            dashboard: Arc::clone(&self.dashboard),
            event_tx: self.event_tx,
            cancel_token,
        }
    }
}

fn schedule<F, Fut>(endpoint: Endpoint, period: Duration, cancel_token: CancellationToken, tick: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let refresh = tick();
                    let token = cancel_token.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            () = refresh => {}
                            () = token.cancelled() => {}
                        }
                    });
                }
                () = cancel_token.cancelled() => {
                    info!("Stopped {endpoint} polling");
                    return;
                }
            }
        }
    });
}

/// Handle to running poll schedules.
///
/// Dropping the handle stops polling.
pub struct PollerHandle {
    dashboard: SharedDashboard,
    event_tx: broadcast::Sender<PollEvent>,
    cancel_token: CancellationToken,
}

impl fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerHandle")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl PollerHandle {
    #[must_use]
    pub fn dashboard(&self) -> SharedDashboard {
        Arc::clone(&self.dashboard)
    }

    /// Copy of the current view.
    #[must_use]
    pub fn snapshot(&self) -> Dashboard {
        self.dashboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.event_tx.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel_token.is_cancelled()
    }

    /// Stop both schedules and any refresh still in flight.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
