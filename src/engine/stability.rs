//! Detect when a producer has finished writing a file.
//!
//! Cameras, copy tools and transcoders write incrementally; reading too early uploads a
//! truncated clip. A file is stable once two consecutive size readings match.

use log::debug;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Poll settings for [`wait_until_stable`].
#[derive(Clone, Copy, Debug)]
pub struct StableFileDetector {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl StableFileDetector {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn wait_until_stable(&self, path: &Path) -> bool {
        wait_until_stable(path, self.poll_interval, self.timeout)
    }
}

/// Poll the size of `path` every `poll_interval` until two consecutive readings are equal.
///
/// - The first reading is only a baseline, so the earliest success is one interval in.
/// - Returns false as soon as a reading fails (file removed or renamed away).
/// - Returns false once `timeout` has elapsed without two equal readings.
pub fn wait_until_stable(path: &Path, poll_interval: Duration, timeout: Duration) -> bool {
    let start = Instant::now();
    let mut last_size: Option<u64> = None;

    while start.elapsed() < timeout {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!("{}: size poll failed ({}), giving up", path.display(), e);
                return false;
            }
        };
        if last_size == Some(size) {
            debug!(
                "{}: stable at {} bytes after {:?}",
                path.display(),
                size,
                start.elapsed()
            );
            return true;
        }
        last_size = Some(size);
        thread::sleep(poll_interval);
    }

    debug!(
        "{}: still changing after {:?} (last size {:?})",
        path.display(),
        timeout,
        last_size
    );
    false
}
