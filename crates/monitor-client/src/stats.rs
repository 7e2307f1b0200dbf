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

//! Aggregate statistics over the recent detection list.

use crate::protocol::DetectionRecord;

/// Upper bound for the estimated frame rate.
pub const DEFAULT_FPS_CAP: u32 = 30;

/// Delay/jitter averages and the derived frame-rate estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionStats {
    pub avg_delay_ms: f64,
    pub avg_jitter_ms: f64,
    pub fps: u32,
}

impl DetectionStats {
    /// Compute averages over every record (not only the rendered ones).
    #[must_use]
    pub fn from_records(records: &[DetectionRecord], fps_cap: u32) -> Self {
        let avg_delay_ms = mean(records.iter().map(DetectionRecord::delay_ms));
        let avg_jitter_ms = mean(records.iter().map(DetectionRecord::jitter_ms));

        Self {
            avg_delay_ms,
            avg_jitter_ms,
            fps: estimate_fps(avg_delay_ms, fps_cap),
        }
    }
}

/// Arithmetic mean, 0 for an empty sequence.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Frames per second implied by an average per-frame delay.
///
/// `1000 / delay` rounded half up and capped at `cap`; 0 when the delay is
/// not positive.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rate is finite and within [0, cap) when cast"
)]
pub fn estimate_fps(avg_delay_ms: f64, cap: u32) -> u32 {
    if avg_delay_ms.is_nan() || avg_delay_ms <= 0.0 {
        return 0;
    }

    let rate = (1000.0 / avg_delay_ms + 0.5).floor();
    if rate >= f64::from(cap) {
        cap
    } else {
        rate as u32
    }
}

/// Format with exactly one decimal place.
#[must_use]
pub fn format_fixed1(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{value:.1}")
    }
}

/// Format a millisecond average for display, e.g. `25.0 ms`.
#[must_use]
pub fn format_ms(value: f64) -> String {
    format!("{} ms", format_fixed1(value))
}
