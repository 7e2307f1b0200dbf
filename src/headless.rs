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

//! Windowless mode: poll, log a summary per data refresh and optionally
//! keep a static HTML copy of the dashboard on disk.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use monitor_client::{Dashboard, ElementId, Endpoint, PollOutcome, StatusPoller};
use tokio::sync::broadcast::error::RecvError;

const PAGE_TITLE: &str = "Detection Monitor";

/// Poll until Ctrl-C.
pub async fn run(poller: StatusPoller, html_out: Option<PathBuf>) -> io::Result<()> {
    let mut events = poller.subscribe();
    let handle = poller.spawn();

    if let Some(path) = &html_out {
        info!("Writing dashboard page to {}", path.display());
    }

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Interrupted, stopping");
                break;
            }
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Skipped {skipped} poll events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let dashboard = handle.snapshot();

                match event.outcome {
                    PollOutcome::Applied { .. } if event.endpoint == Endpoint::Data => {
                        info!("{}", summary_line(&dashboard));
                    }
                    PollOutcome::Ignored => debug!("Empty data payload, view unchanged"),
                    // Failures are already logged by the poller
                    _ => {}
                }

                if let Some(path) = &html_out {
                    if let Err(e) = write_page(path, &dashboard).await {
                        warn!("Failed to write {}: {e}", path.display());
                    }
                }
            }
        }
    }

    handle.shutdown();
    Ok(())
}

/// One-line view of the counters and health labels
fn summary_line(dashboard: &Dashboard) -> String {
    let text = |id| dashboard.text(id).unwrap_or_default();
    format!(
        "humans={} total={} delay={} jitter={} fps={} rows={} | {} | {} | {}",
        text(ElementId::HumanCount),
        text(ElementId::TotalDetections),
        text(ElementId::AvgDelay),
        text(ElementId::AvgJitter),
        text(ElementId::Fps),
        dashboard.rows().len(),
        text(ElementId::CameraStatus),
        text(ElementId::DbStatus),
        text(ElementId::ModelStatus),
    )
}

/// Replace the page at `path` in one step so readers never see a partial file
async fn write_page(path: &Path, dashboard: &Dashboard) -> io::Result<()> {
    let html = dashboard.to_html(PAGE_TITLE);
    let tmp = path.with_extension("html.tmp");
    tokio::fs::write(&tmp, html).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_client::{DataPayload, RenderOptions};

    fn populated() -> Dashboard {
        let payload = DataPayload::from_json(serde_json::json!({
            "recent_detections": [
                {"timestamp": "2024-05-01T10:00:00Z", "status": "<b>person</b>", "delay": 25, "jitter": 2},
            ],
            "total_detections": 7,
            "human_count": 1
        }))
        .unwrap()
        .unwrap();

        let mut dashboard = Dashboard::new();
        dashboard.apply_data(&payload, &RenderOptions::default());
        dashboard
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&populated());
        assert!(line.starts_with("humans=1 total=7 delay=25.0 ms jitter=2.0 ms fps=30 rows=1"));
        assert!(line.ends_with("Camera: - | DB: - | Model: -"));
    }

    #[tokio::test]
    async fn test_write_page_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        std::fs::write(&path, "stale").unwrap();

        write_page(&path, &populated()).await.unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("id=\"human-count\""));
        assert!(html.contains("&lt;b&gt;person&lt;/b&gt;"));
        assert!(!html.contains("stale"));
        assert!(!dir.path().join("dashboard.html.tmp").exists());
    }
}
