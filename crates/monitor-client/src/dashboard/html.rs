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

//! Static HTML rendering of the dashboard.

use std::fmt::Write;

use super::{Dashboard, ElementId};

/// Escape text for use in HTML element content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn element(out: &mut String, tag: &str, dashboard: &Dashboard, id: ElementId) {
    let text = dashboard.text(id).unwrap_or_default();
    let _ = writeln!(out, "      <{tag} id=\"{id}\">{}</{tag}>", escape_html(text));
}

fn metric(out: &mut String, label: &str, dashboard: &Dashboard, id: ElementId) {
    let text = dashboard.text(id).unwrap_or_default();
    let _ = writeln!(
        out,
        "      <div class=\"metric\"><span class=\"label\">{label}</span> <span id=\"{id}\">{}</span></div>",
        escape_html(text)
    );
}

pub(super) fn render_page(dashboard: &Dashboard, title: &str) -> String {
    let mut out = String::new();
    let title = escape_html(title);

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "  <head>");
    let _ = writeln!(out, "    <meta charset=\"utf-8\">");
    let _ = writeln!(out, "    <title>{title}</title>");
    let _ = writeln!(out, "  </head>");
    let _ = writeln!(out, "  <body>");
    let _ = writeln!(out, "    <h1>{title}</h1>");

    let _ = writeln!(out, "    <section class=\"health\">");
    element(&mut out, "span", dashboard, ElementId::CameraStatus);
    element(&mut out, "span", dashboard, ElementId::DbStatus);
    element(&mut out, "span", dashboard, ElementId::ModelStatus);
    let _ = writeln!(out, "    </section>");

    let _ = writeln!(out, "    <section class=\"metrics\">");
    metric(&mut out, "Humans", dashboard, ElementId::HumanCount);
    metric(&mut out, "Total detections", dashboard, ElementId::TotalDetections);
    metric(&mut out, "Avg delay", dashboard, ElementId::AvgDelay);
    metric(&mut out, "Avg jitter", dashboard, ElementId::AvgJitter);
    metric(&mut out, "FPS", dashboard, ElementId::Fps);
    let _ = writeln!(out, "    </section>");

    let _ = writeln!(out, "    <table>");
    let _ = writeln!(
        out,
        "      <thead><tr><th>Time</th><th>Status</th><th>Delay (ms)</th><th>Jitter (ms)</th></tr></thead>"
    );
    let _ = writeln!(out, "      <tbody id=\"{}\">", ElementId::DetectionsBody);
    for row in dashboard.rows() {
        let _ = writeln!(
            out,
            "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.time),
            escape_html(&row.status),
            escape_html(&row.delay),
            escape_html(&row.jitter),
        );
    }
    let _ = writeln!(out, "      </tbody>");
    let _ = writeln!(out, "    </table>");

    let _ = writeln!(out, "  </body>");
    let _ = writeln!(out, "</html>");
    out
}
