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

use monitor_client::Endpoint;

use crate::status::{DiagnosticLevel, EndpointState, EndpointStatus, SystemStatus};

#[derive(Debug)]
pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl StatusPane {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            collapsed: false,
        }
    }

    /// Render the status pane as a floating window
    pub fn render(&mut self, ctx: &egui::Context, status: &SystemStatus) {
        if !self.visible {
            // Show a small button to re-open the status pane when hidden
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -10.0))
                .fixed_size(egui::vec2(140.0, 35.0))
                .resizable(false)
                .frame(egui::Frame::window(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 200))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                    .corner_radius(6.0))
                .show(ctx, |ui| {
                    if ui.button(egui::RichText::new("📊 Show Status")
                        .color(egui::Color32::from_rgb(150, 200, 220))
                        .size(11.0))
                        .clicked() {
                        self.visible = true;
                    }
                });
            return;
        }

        let screen_height = ctx.screen_rect().height();

        egui::Window::new("Poll Status")
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -10.0))
            .fixed_size(egui::vec2(304.0, if self.collapsed { 40.0 } else { screen_height.min(420.0) }))
            .resizable(false)
            .collapsible(false)
            .frame(egui::Frame::window(&ctx.style())
                .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                .corner_radius(6.0))
            .show(ctx, |ui| {
                // Header with collapse and close buttons
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("◈ STATUS")
                        .color(egui::Color32::from_rgb(100, 180, 220))
                        .size(12.0)
                        .strong());

                    ui.label(egui::RichText::new(format!("{}/2 OK", status.healthy_endpoint_count()))
                        .color(egui::Color32::from_rgb(150, 150, 150))
                        .size(10.0)
                        .monospace());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(egui::RichText::new("✕")
                            .size(12.0)
                            .color(egui::Color32::from_rgb(200, 100, 100)))
                            .on_hover_text("Hide status pane")
                            .clicked() {
                            self.visible = false;
                        }

                        ui.add_space(4.0);

                        let collapse_icon = if self.collapsed { "▼" } else { "▲" };
                        if ui.button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked() {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                if self.collapsed {
                    return;
                }

                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(screen_height.min(370.0))
                    .show(ui, |ui| {
                        for endpoint in [Endpoint::Health, Endpoint::Data] {
                            render_endpoint_section(ui, status.endpoint(endpoint));
                            ui.add_space(6.0);
                        }

                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new("Rows:")
                                .color(egui::Color32::from_rgb(130, 130, 130))
                                .size(9.0));
                            ui.label(egui::RichText::new(format!("{} shown, {} empty payloads",
                                status.last_row_count, status.ignored_payloads))
                                .color(egui::Color32::from_rgb(200, 200, 200))
                                .size(9.0)
                                .monospace());
                        });

                        ui.add_space(6.0);

                        render_diagnostics_section(ui, status);
                    });
            });
    }
}

fn render_endpoint_section(ui: &mut egui::Ui, endpoint: &EndpointStatus) {
    ui.label(egui::RichText::new(endpoint.endpoint.as_str().to_uppercase())
        .color(egui::Color32::from_rgb(150, 150, 150))
        .size(9.0)
        .strong());

    ui.add_space(2.0);

    ui.horizontal(|ui| {
        let (status_color, status_text, status_icon) = match endpoint.state {
            EndpointState::Healthy => (
                egui::Color32::from_rgb(100, 255, 100),
                "OK",
                "●"
            ),
            EndpointState::Waiting => (
                egui::Color32::from_rgb(255, 200, 100),
                "WAITING",
                "◐"
            ),
            EndpointState::Failing => (
                egui::Color32::from_rgb(255, 100, 100),
                "FAILING",
                "✕"
            ),
        };

        ui.label(egui::RichText::new(status_icon)
            .color(status_color)
            .size(10.0));

        ui.label(egui::RichText::new(status_text)
            .color(status_color)
            .size(10.0)
            .monospace()
            .strong());

        if endpoint.consecutive_failures > 1 {
            ui.label(egui::RichText::new(format!("×{}", endpoint.consecutive_failures))
                .color(egui::Color32::from_rgb(255, 100, 100))
                .size(9.0)
                .monospace());
        }
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&endpoint.url)
            .color(egui::Color32::from_rgb(180, 180, 180))
            .size(8.0)
            .monospace());
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Requests:")
            .color(egui::Color32::from_rgb(130, 130, 130))
            .size(9.0));
        ui.label(egui::RichText::new(format!("{} ({} failed)",
            endpoint.request_count, endpoint.failure_count))
            .color(egui::Color32::from_rgb(200, 200, 200))
            .size(9.0)
            .monospace());
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Latency:")
            .color(egui::Color32::from_rgb(130, 130, 130))
            .size(9.0));

        let latency_color = if endpoint.average_latency_ms < 250.0 {
            egui::Color32::from_rgb(100, 255, 100)
        } else if endpoint.average_latency_ms < 1000.0 {
            egui::Color32::from_rgb(255, 200, 100)
        } else {
            egui::Color32::from_rgb(255, 100, 100)
        };

        ui.label(egui::RichText::new(format!("{:.0}ms (avg {:.0}ms)",
            endpoint.last_latency_ms, endpoint.average_latency_ms))
            .color(latency_color)
            .size(9.0)
            .monospace());
    });

    if let Some(seconds) = endpoint.seconds_since_success() {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Last OK:")
                .color(egui::Color32::from_rgb(130, 130, 130))
                .size(9.0));
            ui.label(egui::RichText::new(format!("{} ago", format_duration(seconds.max(0).unsigned_abs())))
                .color(egui::Color32::from_rgb(200, 200, 200))
                .size(9.0)
                .monospace());
        });
    }

    if endpoint.state == EndpointState::Failing {
        if let Some(error) = &endpoint.last_error {
            ui.label(egui::RichText::new(truncate(error, 48))
                .color(egui::Color32::from_rgb(255, 130, 130))
                .size(8.0));
        }
    }
}

fn render_diagnostics_section(ui: &mut egui::Ui, status: &SystemStatus) {
    ui.label(egui::RichText::new("DIAGNOSTICS")
        .color(egui::Color32::from_rgb(150, 150, 150))
        .size(10.0)
        .strong());

    ui.add_space(3.0);

    if status.diagnostics.is_empty() {
        ui.label(egui::RichText::new("No messages")
            .color(egui::Color32::from_rgb(100, 100, 100))
            .size(8.0)
            .italics());
        return;
    }

    // Each line is approximately 14 pixels tall (icon + text + spacing)
    let line_height = 14.0;
    let max_visible_lines = 6.0;

    egui::ScrollArea::vertical()
        .id_salt("diagnostics")
        .max_height(line_height * max_visible_lines)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            // Newest first
            for diagnostic in status.diagnostics.iter().rev() {
                ui.horizontal(|ui| {
                    let (icon, color) = match diagnostic.level {
                        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
                        DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
                        DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
                    };

                    ui.label(egui::RichText::new(icon)
                        .color(color)
                        .size(9.0));

                    let time_str = diagnostic.timestamp.format("%H:%M:%S").to_string();
                    ui.label(egui::RichText::new(time_str)
                        .color(egui::Color32::from_rgb(100, 100, 100))
                        .size(8.0)
                        .monospace());

                    ui.label(egui::RichText::new(truncate(&diagnostic.message, 34))
                        .color(egui::Color32::from_rgb(180, 180, 180))
                        .size(8.0))
                        .on_hover_text(&diagnostic.message);
                });
            }
        });
}

/// Shorten to `max_chars` characters, appending "..." when cut
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
