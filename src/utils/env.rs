//! Environment overrides and credentials: process env → .env in dir.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Settings;

pub const ENV_BATCH_INTERVAL: &str = "BATCH_INTERVAL";
pub const ENV_WATCH_DIR: &str = "WATCH_DIR";
pub const ENV_SURVEY_JSON_PATH: &str = "SURVEY_JSON_PATH";
pub const ENV_BUCKET: &str = "CLIPBATCH_BUCKET";
pub const ENV_STORAGE_ENDPOINT: &str = "CLIPBATCH_STORAGE_ENDPOINT";
pub const ENV_STORAGE_TOKEN: &str = "CLIPBATCH_STORAGE_TOKEN";
pub const ENV_SCRIPT_URL: &str = "CLIPBATCH_SCRIPT_URL";
pub const ENV_SHEET_ID: &str = "CLIPBATCH_SHEET_ID";
pub const ENV_RECIPIENT: &str = "CLIPBATCH_RECIPIENT";
pub const ENV_NOTIFY_WEBHOOK: &str = "CLIPBATCH_NOTIFY_WEBHOOK";

// Names shared with the AWS tooling and the usual mail setups.
pub const ENV_S3_BUCKET: &str = "S3_BUCKET_NAME";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_AWS_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SMTP_SERVER: &str = "SMTP_SERVER";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const ENV_FROM_EMAIL: &str = "FROM_EMAIL";
pub const ENV_RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";

/// Load `.env` from `dir` into the process env if present. Existing variables win.
pub fn load_dotenv(dir: &Path) {
    let env_path = dir.join(".env");
    if env_path.is_file() {
        match dotenvy::from_path(&env_path) {
            Ok(()) => debug!("Loaded {}", env_path.display()),
            Err(e) => warn!("{}: {}", env_path.display(), e),
        }
    }
}

/// Trimmed, non-empty env value.
pub fn env_value(key: &str) -> Option<String> {
    let s = std::env::var(key).ok()?;
    let s = s.trim().to_string();
    (!s.is_empty()).then_some(s)
}

/// Apply process env overrides on top of file settings. Call after the TOML file, before CLI.
pub fn apply_env_to_settings(settings: &mut Settings) {
    apply_env_with(settings, env_value);
}

/// Apply overrides read through `lookup` (trimmed, non-empty values). Malformed numbers are
/// logged and leave the field alone.
pub fn apply_env_with(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup(ENV_BATCH_INTERVAL) {
        match v.parse::<u64>() {
            Ok(secs) => settings.batch_interval = Duration::from_secs(secs),
            Err(_) => warn!("{ENV_BATCH_INTERVAL}={v} is not a number of seconds; ignored"),
        }
    }
    if let Some(v) = lookup(ENV_WATCH_DIR) {
        settings.watch_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup(ENV_SURVEY_JSON_PATH) {
        settings.survey_path = PathBuf::from(v);
    }

    let storage = &mut settings.storage;
    if let Some(v) = lookup(ENV_BUCKET).or_else(|| lookup(ENV_S3_BUCKET)) {
        storage.bucket = v;
    }
    if let Some(v) = lookup(ENV_AWS_REGION) {
        storage.region = v;
    }
    if let Some(v) = lookup(ENV_AWS_ACCESS_KEY) {
        storage.access_key = Some(v);
    }
    if let Some(v) = lookup(ENV_AWS_SECRET_KEY) {
        storage.secret_key = Some(v);
    }
    if let Some(v) = lookup(ENV_STORAGE_ENDPOINT) {
        storage.endpoint = Some(v);
    }
    if let Some(v) = lookup(ENV_STORAGE_TOKEN) {
        storage.token = Some(v);
    }

    if let Some(v) = lookup(ENV_SCRIPT_URL) {
        settings.page.script_url = Some(v);
    }
    if let Some(v) = lookup(ENV_SHEET_ID) {
        settings.page.sheet_id = v;
    }

    let notify = &mut settings.notify;
    if let Some(v) = lookup(ENV_RECIPIENT).or_else(|| lookup(ENV_RECIPIENT_EMAIL)) {
        notify.recipient = v;
    }
    if let Some(v) = lookup(ENV_NOTIFY_WEBHOOK) {
        notify.webhook_url = Some(v);
    }
    if let Some(v) = lookup(ENV_SMTP_SERVER) {
        notify.smtp.server = Some(v);
    }
    if let Some(v) = lookup(ENV_SMTP_PORT) {
        match v.parse::<u16>() {
            Ok(port) => notify.smtp.port = port,
            Err(_) => warn!("{ENV_SMTP_PORT}={v} is not a port number; ignored"),
        }
    }
    if let Some(v) = lookup(ENV_SMTP_USERNAME) {
        notify.smtp.username = Some(v);
    }
    if let Some(v) = lookup(ENV_SMTP_PASSWORD) {
        notify.smtp.password = Some(v);
    }
    if let Some(v) = lookup(ENV_FROM_EMAIL) {
        notify.smtp.from = Some(v);
    }
}
