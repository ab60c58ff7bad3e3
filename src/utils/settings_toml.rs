//! Load `clipbatch.toml` (CLI only). Lib callers build [`Settings`](crate::Settings) themselves.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Settings;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettingsToml {
    #[serde(default)]
    settings: WatchSection,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    page: PageSection,
    #[serde(default)]
    notify: NotifySection,
}

#[derive(Debug, Default, Deserialize)]
struct WatchSection {
    watch_dir: Option<String>,
    /// Seconds.
    batch_interval: Option<u64>,
    /// Seconds.
    wait_timeout: Option<u64>,
    wait_interval_ms: Option<u64>,
    reconcile: Option<bool>,
    snapshot_path: Option<String>,
    /// Seconds.
    snapshot_interval: Option<u64>,
    survey_path: Option<String>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    bucket: Option<String>,
    domain: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageSection {
    script_url: Option<String>,
    sheet_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotifySection {
    recipient: Option<String>,
    webhook_url: Option<String>,
    smtp_server: Option<String>,
    smtp_port: Option<u16>,
    smtp_username: Option<String>,
    from: Option<String>,
}

/// Parse a settings file. Returns None if the file is missing; a malformed file is logged and ignored.
pub(crate) fn load_settings_toml(path: &Path) -> Option<SettingsToml> {
    let s = std::fs::read_to_string(path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $target:expr, $field:ident) => {
        if let Some(v) = $sec.$field.clone() {
            $target.$field = v;
        }
    };
}

/// Apply file config to settings (only fields present in the file). Call before env and CLI.
pub(crate) fn apply_file_to_settings(file: &SettingsToml, settings: &mut Settings) {
    let w = &file.settings;
    if let Some(ref p) = w.watch_dir {
        settings.watch_dir = PathBuf::from(p);
    }
    if let Some(secs) = w.batch_interval {
        settings.batch_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = w.wait_timeout {
        settings.wait_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = w.wait_interval_ms {
        settings.wait_interval = Duration::from_millis(ms);
    }
    apply_file_opt!(w, settings, reconcile);
    if let Some(ref p) = w.snapshot_path {
        settings.snapshot_path = Some(PathBuf::from(p));
    }
    if let Some(secs) = w.snapshot_interval {
        settings.snapshot_interval = Duration::from_secs(secs);
    }
    if let Some(ref p) = w.survey_path {
        settings.survey_path = PathBuf::from(p);
    }
    apply_file_opt!(w, settings, verbose);

    apply_file_opt!(file.storage, settings.storage, bucket);
    apply_file_opt!(file.storage, settings.storage, domain);
    apply_file_opt!(file.storage, settings.storage, region);
    if file.storage.endpoint.is_some() {
        settings.storage.endpoint = file.storage.endpoint.clone();
    }
    if file.page.script_url.is_some() {
        settings.page.script_url = file.page.script_url.clone();
    }
    apply_file_opt!(file.page, settings.page, sheet_id);
    apply_file_opt!(file.notify, settings.notify, recipient);
    if file.notify.webhook_url.is_some() {
        settings.notify.webhook_url = file.notify.webhook_url.clone();
    }
    let n = &file.notify;
    let smtp = &mut settings.notify.smtp;
    if n.smtp_server.is_some() {
        smtp.server = n.smtp_server.clone();
    }
    if let Some(port) = n.smtp_port {
        smtp.port = port;
    }
    if n.smtp_username.is_some() {
        smtp.username = n.smtp_username.clone();
    }
    if n.from.is_some() {
        smtp.from = n.from.clone();
    }
}

/// Parse settings from a string (same shape as the file).
pub fn settings_from_toml_str(s: &str, base: Settings) -> anyhow::Result<Settings> {
    let file: SettingsToml = toml::from_str(s)?;
    let mut settings = base;
    apply_file_to_settings(&file, &mut settings);
    Ok(settings)
}
