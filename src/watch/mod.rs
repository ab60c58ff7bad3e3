//! Directory watching: intake handler, monitor lifecycle, offline reconciliation.

pub mod handler;
pub mod monitor;
pub mod reconcile;

pub use handler::{Intake, VideoHandler};
pub use monitor::{MonitorCore, arrivals};
pub use reconcile::{Reconciler, new_since, scan_video_files};
