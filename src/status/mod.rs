//! Poll status and diagnostics.
//!
//! This module tracks per-endpoint refresh results and keeps a short log of
//! diagnostic messages for the status pane.

pub mod system;

pub use system::{DiagnosticLevel, EndpointState, EndpointStatus, SharedSystemStatus, SystemStatus};
