//! External collaborators the pipeline talks to, one trait per seam.
//!
//! Every method reports failure as a value; the per-file task decides what a failure costs
//! (drop the file, fall back, or just log).

pub mod ffmpeg;
pub mod notifier;
pub mod page;
pub mod storage;
pub mod survey;

use anyhow::Result;
use std::path::Path;

use crate::PageRequest;

pub use ffmpeg::{FfmpegConverter, FfprobeDuration, ffmpeg_path, ffprobe_path};
pub use notifier::{
    LogNotifier, SmtpNotifier, WebhookNotifier, notification_body, notification_subject,
};
pub use page::{DisabledPageService, HttpPageService};
pub use storage::{HttpUploader, S3Uploader};
pub use survey::JsonSurveyFile;

/// Normalizes a clip into the canonical container.
pub trait Converter: Send + Sync {
    /// Write `dest` from `src`. Err on any failure; `dest` may then be missing or partial.
    fn convert(&self, src: &Path, dest: &Path) -> Result<()>;
}

/// Media duration lookup.
pub trait DurationSource: Send + Sync {
    /// Seconds, or None when unknown.
    fn duration_secs(&self, path: &Path) -> Option<f64>;
}

/// Object storage upload.
pub trait Uploader: Send + Sync {
    /// Upload `path` and return its storage key.
    fn upload(&self, path: &Path) -> Result<String>;
}

/// Remote page generation for a whole batch.
pub trait PageService: Send + Sync {
    /// Returns the page URL.
    fn create_page(&self, request: &PageRequest) -> Result<String>;
}

/// Delivers the batch message to the configured recipient.
pub trait Notifier: Send + Sync {
    fn notify(&self, names: &[String], urls: &[String]) -> Result<()>;
}

/// Survey payload attached to each clip. Opaque JSON.
pub trait SurveySource: Send + Sync {
    fn load(&self) -> serde_json::Value;
}
