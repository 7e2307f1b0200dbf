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

mod app;
mod config;
mod headless;
mod status;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use mimalloc::MiMalloc;
use monitor_client::StatusPoller;

use app::MonitorApp;
use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Live dashboard for a human-detection camera service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Service address, e.g. http://localhost:8000
    #[arg(long)]
    base_url: Option<String>,

    /// Milliseconds between data refreshes
    #[arg(long)]
    data_interval_ms: Option<u64>,

    /// Milliseconds between health refreshes
    #[arg(long)]
    health_interval_ms: Option<u64>,

    /// Poll without opening a window
    #[arg(long)]
    headless: bool,

    /// Keep a static HTML copy of the dashboard at this path
    #[arg(long, value_name = "PATH", requires = "headless")]
    html_out: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,
}

impl Args {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(ms) = self.data_interval_ms {
            config.data_interval_ms = ms;
        }
        if let Some(ms) = self.health_interval_ms {
            config.health_interval_ms = ms;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Starting Detection Monitor...");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }

    args.apply_to(&mut config);
    config.validate()?;

    if args.save_config {
        match config.save() {
            Ok(()) => info!("Configuration saved"),
            Err(e) => error!("Failed to save config: {e}"),
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let poller = StatusPoller::new(&config.poller_config())?;

    if args.headless {
        runtime.block_on(headless::run(poller, args.html_out))?;
        info!("Stopped");
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_title("Detection Monitor"),
        ..Default::default()
    };

    let status_pane_visible = config.status_pane_visible;
    eframe::run_native(
        "Detection Monitor",
        options,
        Box::new(move |_cc| {
            info!("Creating application...");
            Ok(Box::new(MonitorApp::new(runtime, poller, status_pane_visible)))
        }),
    )?;

    Ok(())
}
