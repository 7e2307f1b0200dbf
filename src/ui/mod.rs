//! UI components for Detection Monitor.
//!
//! This module contains the dashboard pane and the floating status pane.

pub mod dashboard_pane;
pub mod status_pane;

pub use dashboard_pane::DashboardPane;
pub use status_pane::StatusPane;
