//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    snapshot_filename: String,
    settings_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                snapshot_filename: format!(".{pkg}"),
                settings_filename: format!("{pkg}.toml"),
            }
        })
    }

    /// Reconciliation snapshot DB, created inside the watched directory by default.
    pub fn snapshot_filename(&self) -> &str {
        &self.snapshot_filename
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }
}

// ---- Intake ----

/// Container extensions accepted as new arrivals (lowercase, no dot).
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mov", "avi", "mp4"];

/// Extension every upload is normalized to.
pub const CANONICAL_EXTENSION: &str = "mp4";

// ---- Timing ----

/// Batch window, stability polling and reconciliation defaults.
pub struct TimingConsts;

impl TimingConsts {
    /// Seconds between the first event of a burst and its dispatch.
    pub const BATCH_INTERVAL_SECS: u64 = 10;
    /// Give up on a file that is still growing after this many seconds.
    pub const WAIT_TIMEOUT_SECS: u64 = 300;
    /// Size poll interval while waiting for a file to settle.
    pub const WAIT_INTERVAL_MS: u64 = 1000;
    /// How often the reconciliation snapshot is rewritten while running.
    pub const SNAPSHOT_INTERVAL_SECS: u64 = 60;
    /// End time assumed when the media duration cannot be read.
    pub const FALLBACK_CLIP_LENGTH: Duration = Duration::from_secs(60);
}

// ---- Remote services ----

/// HTTP timeouts for the remote collaborators.
pub struct HttpConsts;

impl HttpConsts {
    /// Connect timeout for the page-generation service.
    pub const PAGE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Read timeout for the page-generation service (page rendering is slow).
    pub const PAGE_READ_TIMEOUT: Duration = Duration::from_secs(30);
    /// Upload timeout; large clips over slow links need headroom.
    pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);
    /// Webhook notification timeout.
    pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);
}

/// Default object-storage domain used to derive public URLs.
pub const DEFAULT_STORAGE_DOMAIN: &str = "s3.amazonaws.com";

pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";

/// Submission port; the connection is upgraded with STARTTLS.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Bounded channel between the notify callback and the forwarding thread.
pub const EVENT_CHANNEL_CAP: usize = 10_000;
