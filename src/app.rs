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

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{info, warn};
use monitor_client::{PollEvent, PollerHandle, StatusPoller};
use tokio::runtime::Runtime;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::status::{DiagnosticLevel, SharedSystemStatus, SystemStatus};
use crate::ui::{DashboardPane, StatusPane};

/// UI repaint cadence
const REPAINT_INTERVAL: Duration = Duration::from_millis(500);

pub struct MonitorApp {
    // Field order matters: the handle must stop polling before the runtime drops
    poller: PollerHandle,
    runtime: Runtime,
    events: broadcast::Receiver<PollEvent>,
    status: SharedSystemStatus,
    dashboard_pane: DashboardPane,
    status_pane: StatusPane,
}

impl std::fmt::Debug for MonitorApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorApp")
            .field("poller", &self.poller)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl MonitorApp {
    /// Start polling on `runtime` and build the window state
    pub fn new(runtime: Runtime, poller: StatusPoller, status_pane_visible: bool) -> Self {
        let status = Arc::new(Mutex::new(SystemStatus::new(
            poller.endpoints().health_url(),
            poller.endpoints().data_url(),
        )));

        let events = poller.subscribe();
        let poller = {
            let _guard = runtime.enter();
            poller.spawn()
        };
        info!("Polling started");

        Self {
            poller,
            runtime,
            events,
            status,
            dashboard_pane: DashboardPane::new(),
            status_pane: StatusPane::new(status_pane_visible),
        }
    }

    /// Fold every pending poll event into the status pane statistics
    fn drain_events(&mut self) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match self.events.try_recv() {
                Ok(event) => status.record_event(&event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Status pane skipped {skipped} poll events");
                    status.add_diagnostic(
                        DiagnosticLevel::Warning,
                        format!("Skipped {skipped} poll events"),
                    );
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request repaint periodically so refreshed values show up
        ctx.request_repaint_after(REPAINT_INTERVAL);

        self.drain_events();

        // Copy out so the poller never waits on rendering
        let dashboard = self.poller.snapshot();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard_pane.render(ui, &dashboard);
        });

        let status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        self.status_pane.render(ctx, &status);
    }
}
