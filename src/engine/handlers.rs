//! CLI command handler: resolve settings, run the monitor until Ctrl+C.

use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Duration;

use crate::Settings;
use crate::engine::arg_parser::Cli;
use crate::utils::env::apply_env_to_settings;
use crate::utils::settings_toml::{apply_file_to_settings, load_settings_toml};
use crate::utils::{load_dotenv, set_verbose, setup_logging};

/// Build settings: defaults → settings file → env (and `.env`) → CLI flags.
pub fn resolve_settings(cli: &Cli) -> Settings {
    let base_dir = cli.base_dir();
    load_dotenv(&base_dir);

    let mut settings = Settings::default();
    let config_path = cli.config_path();
    match load_settings_toml(&config_path) {
        Some(file) => {
            debug!("Loaded settings from {}", config_path.display());
            apply_file_to_settings(&file, &mut settings);
        }
        None => debug!("No settings file at {}", config_path.display()),
    }
    apply_env_to_settings(&mut settings);

    if let Some(dir) = &cli.dir {
        settings.watch_dir = dir.clone();
    }
    if let Some(secs) = cli.batch_interval {
        settings.batch_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.wait_timeout {
        settings.wait_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = cli.wait_interval {
        settings.wait_interval = Duration::from_millis(ms);
    }
    if cli.no_reconcile {
        settings.reconcile = false;
    }
    if let Some(state) = &cli.state {
        settings.snapshot_path = Some(state.clone());
    }
    if let Some(v) = cli.verbose {
        settings.verbose = v;
    }
    settings
}

/// Watch until Ctrl+C, then stop cleanly (pending batches still run).
pub fn handle_run(cli: &Cli) -> Result<()> {
    // Installed before settings resolve so file and env diagnostics are not lost.
    setup_logging(cli.verbose.unwrap_or(false));
    let settings = resolve_settings(cli);
    set_verbose(settings.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        settings
    );

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("install Ctrl+C handler")?;

    let mut monitor = crate::start_monitor(&settings, None)?;
    info!(
        "Batching every {:?}; press Ctrl+C to stop",
        settings.batch_interval
    );
    let _ = stop_rx.recv();
    info!("Stop requested; finishing pending batches");
    monitor.stop();
    Ok(())
}
