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

use chrono::Utc;
use monitor_client::protocol::PLACEHOLDER;
use monitor_client::{Dashboard, ElementId};

const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);
const VALUE_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 220, 255);
const MUTED_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 100, 100);

/// Main window content: health labels, metric cards and the detections table
#[derive(Debug, Default)]
pub struct DashboardPane;

impl DashboardPane {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, ui: &mut egui::Ui, dashboard: &Dashboard) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("◈ DETECTION MONITOR")
                .color(egui::Color32::from_rgb(100, 200, 100))
                .size(14.0)
                .strong());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(format!("DATA {}", age_label(dashboard.data_updated_at)))
                    .color(LABEL_COLOR)
                    .size(10.0)
                    .monospace());
            });
        });

        ui.add_space(6.0);

        render_health_row(ui, dashboard);

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            metric_card(ui, "HUMANS", text(dashboard, ElementId::HumanCount));
            metric_card(ui, "TOTAL", text(dashboard, ElementId::TotalDetections));
            metric_card(ui, "AVG DELAY", text(dashboard, ElementId::AvgDelay));
            metric_card(ui, "AVG JITTER", text(dashboard, ElementId::AvgJitter));
            metric_card(ui, "FPS", text(dashboard, ElementId::Fps));
        });

        ui.add_space(8.0);
        ui.separator();

        render_detections(ui, dashboard);
    }
}

fn text(dashboard: &Dashboard, id: ElementId) -> &str {
    dashboard.text(id).unwrap_or(PLACEHOLDER)
}

fn render_health_row(ui: &mut egui::Ui, dashboard: &Dashboard) {
    ui.horizontal(|ui| {
        for (title, id) in [
            ("CAMERA", ElementId::CameraStatus),
            ("DATABASE", ElementId::DbStatus),
            ("MODEL", ElementId::ModelStatus),
        ] {
            let value = text(dashboard, id);
            // Labels read "Camera: <value>", only the value part gets coloured
            let state = value.split_once(": ").map_or(value, |(_, state)| state);
            let color = if state == PLACEHOLDER {
                MUTED_COLOR
            } else {
                egui::Color32::from_rgb(100, 255, 100)
            };

            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new(title)
                    .color(LABEL_COLOR)
                    .size(9.0)
                    .strong());
                ui.label(egui::RichText::new(state)
                    .color(color)
                    .size(11.0)
                    .monospace())
                    .on_hover_text(value);
            });
        }
    });
}

fn metric_card(ui: &mut egui::Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style())
        .fill(egui::Color32::from_rgba_unmultiplied(35, 40, 45, 200))
        .show(ui, |ui| {
            ui.set_min_width(110.0);
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(title)
                    .color(LABEL_COLOR)
                    .size(9.0)
                    .strong());
                ui.label(egui::RichText::new(value)
                    .color(VALUE_COLOR)
                    .size(18.0)
                    .monospace()
                    .strong());
            });
        });
}

fn render_detections(ui: &mut egui::Ui, dashboard: &Dashboard) {
    ui.label(egui::RichText::new(format!("RECENT DETECTIONS: {}", dashboard.rows().len()))
        .color(LABEL_COLOR)
        .size(10.0)
        .monospace());

    ui.add_space(4.0);

    if dashboard.rows().is_empty() {
        ui.label(egui::RichText::new("No detections")
            .color(MUTED_COLOR)
            .size(10.0)
            .italics());
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("detections")
        .show(ui, |ui| {
            egui::Grid::new(ElementId::DetectionsBody.as_str())
                .num_columns(4)
                .striped(true)
                .spacing(egui::vec2(24.0, 4.0))
                .show(ui, |ui| {
                    for heading in ["TIME", "STATUS", "DELAY", "JITTER"] {
                        ui.label(egui::RichText::new(heading)
                            .color(LABEL_COLOR)
                            .size(9.0)
                            .strong());
                    }
                    ui.end_row();

                    for row in dashboard.rows() {
                        for cell in [&row.time, &row.status, &row.delay, &row.jitter] {
                            ui.label(egui::RichText::new(cell.as_str())
                                .color(egui::Color32::from_rgb(200, 200, 200))
                                .size(11.0)
                                .monospace());
                        }
                        ui.end_row();
                    }
                });
        });
}

/// "3s ago" style age of a refresh, or "waiting" before the first one
fn age_label(updated_at: Option<chrono::DateTime<Utc>>) -> String {
    match updated_at {
        Some(at) => format!("{}s ago", (Utc::now() - at).num_seconds().max(0)),
        None => "waiting".to_string(),
    }
}
