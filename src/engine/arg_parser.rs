use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Watch a directory for new video clips and upload them in batches.
#[derive(Clone, Debug, Parser)]
#[command(name = "clipbatch")]
#[command(about = "Watch a directory; batch, convert and upload new video clips.")]
pub struct Cli {
    /// Directory to watch. Default: WATCH_DIR, the settings file, or the current directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file. Default: `clipbatch.toml` in DIR (or the current directory).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Seconds between the first file of a burst and dispatch.
    #[arg(long, short = 'b', value_parser = clap::value_parser!(u64))]
    pub batch_interval: Option<u64>,

    /// Seconds to wait for a file to stop growing before dropping it.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub wait_timeout: Option<u64>,

    /// Milliseconds between size polls while waiting.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub wait_interval: Option<u64>,

    /// Do not replay files that arrived while the monitor was down.
    #[arg(long)]
    pub no_reconcile: bool,

    /// Path to the snapshot database. Default: `.clipbatch` in DIR.
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Directory the settings file and `.env` are looked up in.
    pub fn base_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Settings file path, defaulting to the package settings filename in the base directory.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.base_dir().join(PackagePaths::get().settings_filename()))
    }
}
