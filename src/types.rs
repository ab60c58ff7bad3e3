//! Public and internal types for the clipbatch API and pipeline.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::config::{
    DEFAULT_SMTP_PORT, DEFAULT_STORAGE_DOMAIN, DEFAULT_STORAGE_REGION, PackagePaths, TimingConsts,
};

/// One processed clip: everything the page service needs to know about it.
///
/// Only files that made it through upload produce a record, so the parallel arrays built from a
/// batch of records always line up.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoRecord {
    /// Original file name as it arrived in the watched directory.
    pub name: String,
    /// Path of the original file.
    pub source: PathBuf,
    /// Start of recording, `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
    pub start: String,
    /// `HH:MM` of the start.
    pub time_of_day: String,
    /// Start plus measured duration (or one minute when unknown).
    pub end: String,
    /// Survey payload attached to the clip. Opaque to the core.
    pub survey: serde_json::Value,
    /// Storage key returned by the uploader.
    pub key: String,
    /// Direct public URL of the uploaded object.
    pub url: String,
}

/// Result handed to the completion handler once per dispatched batch.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchReport {
    /// Names of the uploaded clips, in completion order.
    pub names: Vec<String>,
    /// Page URL from the remote service, or the first upload's direct URL as fallback.
    pub report_url: Option<String>,
}

/// Body sent to the page-generation service. Field names follow the service's JSON contract.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub video_paths: Vec<String>,
    pub video_names: Vec<String>,
    pub video_urls: Vec<String>,
    pub video_times: Vec<String>,
    pub video_end_times: Vec<String>,
    pub survey_data_list: Vec<serde_json::Value>,
    pub sheet_id: String,
    pub bucket: String,
}

/// Lib-facing handler options. Only the knobs that shape intake and the per-file wait.
#[derive(Clone, Debug)]
pub struct HandlerOpts {
    /// Quiet period between the first event of a burst and dispatch.
    pub batch_interval: Duration,
    /// Give up waiting for a file to settle after this long.
    pub wait_timeout: Duration,
    /// Size poll interval while waiting.
    pub wait_interval: Duration,
    /// Forwarded to the page service so it can write to the right sheet.
    pub sheet_id: String,
    /// Forwarded to the page service alongside the URLs.
    pub bucket: String,
    /// Public URLs are `https://<bucket>.<storage_domain>/<key>`.
    pub storage_domain: String,
}

impl Default for HandlerOpts {
    fn default() -> Self {
        Self {
            batch_interval: Duration::from_secs(TimingConsts::BATCH_INTERVAL_SECS),
            wait_timeout: Duration::from_secs(TimingConsts::WAIT_TIMEOUT_SECS),
            wait_interval: Duration::from_millis(TimingConsts::WAIT_INTERVAL_MS),
            sheet_id: String::new(),
            bucket: String::new(),
            storage_domain: DEFAULT_STORAGE_DOMAIN.to_string(),
        }
    }
}

impl HandlerOpts {
    /// Direct public URL of an uploaded object.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.storage_domain, key)
    }
}

impl From<&Settings> for HandlerOpts {
    fn from(s: &Settings) -> Self {
        HandlerOpts {
            batch_interval: s.batch_interval,
            wait_timeout: s.wait_timeout,
            wait_interval: s.wait_interval,
            sheet_id: s.page.sheet_id.clone(),
            bucket: s.storage.bucket.clone(),
            storage_domain: s.storage.domain.clone(),
        }
    }
}

/// Shown in place of secrets in `Debug` output.
fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

/// Object storage target.
///
/// Uploads go to the S3 API unless `endpoint` is set, in which case files are PUT to that
/// gateway instead.
#[derive(Clone)]
pub struct StorageSettings {
    pub bucket: String,
    pub domain: String,
    pub region: String,
    /// Gateway base URL for plain PUT uploads. None uses the S3 API.
    pub endpoint: Option<String>,
    /// Bearer token for the gateway (env / .env only, never from the TOML file).
    pub token: Option<String>,
    /// S3 access key id. None falls back to the AWS credential chain.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            domain: DEFAULT_STORAGE_DOMAIN.to_string(),
            region: DEFAULT_STORAGE_REGION.to_string(),
            endpoint: None,
            token: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("bucket", &self.bucket)
            .field("domain", &self.domain)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("token", &redacted(&self.token))
            .field("access_key", &self.access_key)
            .field("secret_key", &redacted(&self.secret_key))
            .finish()
    }
}

impl StorageSettings {
    /// Public base URL objects are served from.
    pub fn public_base(&self) -> String {
        format!("https://{}.{}", self.bucket, self.domain)
    }

    pub fn upload_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| self.public_base())
    }
}

/// Page-generation service.
#[derive(Clone, Debug, Default)]
pub struct PageSettings {
    /// When None, no page is generated and every batch reports the first upload URL.
    pub script_url: Option<String>,
    pub sheet_id: String,
}

/// Mail relay used for batch notifications.
#[derive(Clone)]
pub struct SmtpSettings {
    /// When None, mail is not sent.
    pub server: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    /// Env / .env only, never from the TOML file.
    pub password: Option<String>,
    /// Sender address. Defaults to `username`.
    pub from: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            server: None,
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            from: None,
        }
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("from", &self.from)
            .finish()
    }
}

/// Notification target. Mail when an SMTP server is set, else the webhook, else the log.
#[derive(Clone, Debug, Default)]
pub struct NotifySettings {
    pub recipient: String,
    pub webhook_url: Option<String>,
    pub smtp: SmtpSettings,
}

/// Full settings (CLI, TOML file, env). Built once in the binary and passed down.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory to watch (non-recursive).
    pub watch_dir: PathBuf,
    pub batch_interval: Duration,
    pub wait_timeout: Duration,
    pub wait_interval: Duration,
    /// Replay files that arrived while the monitor was down.
    pub reconcile: bool,
    /// Snapshot DB path. When None, uses `watch_dir.join(<package snapshot filename>)`.
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_interval: Duration,
    /// Survey payload attached to every clip.
    pub survey_path: PathBuf,
    pub storage: StorageSettings,
    pub page: PageSettings,
    pub notify: NotifySettings,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            batch_interval: Duration::from_secs(TimingConsts::BATCH_INTERVAL_SECS),
            wait_timeout: Duration::from_secs(TimingConsts::WAIT_TIMEOUT_SECS),
            wait_interval: Duration::from_millis(TimingConsts::WAIT_INTERVAL_MS),
            reconcile: true,
            snapshot_path: None,
            snapshot_interval: Duration::from_secs(TimingConsts::SNAPSHOT_INTERVAL_SECS),
            survey_path: PathBuf::from("data/surveys/questions.json"),
            storage: StorageSettings::default(),
            page: PageSettings::default(),
            notify: NotifySettings::default(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Settings for watching `dir` with every other field at its default.
    pub fn for_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            watch_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Snapshot DB path, defaulting to the package snapshot filename in the watched directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| self.watch_dir.join(PackagePaths::get().snapshot_filename()))
    }
}
