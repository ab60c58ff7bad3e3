//! clipbatch: watch a directory for video clips, batch bursts, convert, upload and report

pub mod collab;
pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod watch;

/// Re-export types for API
pub use types::*;

pub use pipeline::{Collaborators, CompletionHandler};
pub use watch::{MonitorCore, VideoHandler};

use log::debug;

/// Result alias used by the public clipbatch API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: build the concrete collaborators from `settings` and start watching
/// `settings.watch_dir`.
///
/// `on_complete` is called once per batch that uploaded at least one clip. Call
/// [`MonitorCore::stop`] (or drop the monitor) to shut down; pending batches still run.
///
/// ```ignore
/// let settings = clipbatch::Settings::for_dir("/srv/incoming");
/// let mut monitor = clipbatch::start_monitor(&settings, None)?;
/// // ...
/// monitor.stop();
/// ```
pub fn start_monitor(
    settings: &Settings,
    on_complete: Option<CompletionHandler>,
) -> Result<MonitorCore> {
    let mut collab = Collaborators::from_settings(settings)?;
    if on_complete.is_some() {
        collab.on_complete = on_complete;
    }
    debug!("Starting monitor for {}", settings.watch_dir.display());
    let mut monitor = MonitorCore::new(settings.clone(), collab);
    monitor.start(&settings.watch_dir)?;
    Ok(monitor)
}
