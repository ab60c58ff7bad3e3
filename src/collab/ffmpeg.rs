// ffmpeg / ffprobe wrappers for conversion and duration lookup
//
// Tool resolution order:
// 1) Environment variable override (CLIPBATCH_FFMPEG_PATH, CLIPBATCH_FFPROBE_PATH)
// 2) Sidecar next to the executable (or in bin/ beside it)
// 3) PATH

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Converter, DurationSource};

fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        warn!("{env_key}={v} does not exist; falling back");
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        for candidate in [dir.join(&filename), dir.join("bin").join(&filename)] {
            if candidate.exists() {
                return candidate;
            }
        }
    }

    PathBuf::from(default_name)
}

pub fn ffmpeg_path() -> PathBuf {
    resolve_tool("CLIPBATCH_FFMPEG_PATH", "ffmpeg")
}

pub fn ffprobe_path() -> PathBuf {
    resolve_tool("CLIPBATCH_FFPROBE_PATH", "ffprobe")
}

/// H.264/AAC MP4 with the index up front so browsers can stream it.
#[derive(Clone, Debug)]
pub struct FfmpegConverter {
    binary: PathBuf,
}

impl FfmpegConverter {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Command line for converting `src` into `dest`.
    pub fn args(src: &Path, dest: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec!["-y".into(), "-i".into()];
        args.push(src.as_os_str().to_owned());
        args.extend(
            ["-c:v", "libx264", "-c:a", "aac", "-movflags", "+faststart"]
                .into_iter()
                .map(Into::into),
        );
        args.push(dest.as_os_str().to_owned());
        args
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new(ffmpeg_path())
    }
}

impl Converter for FfmpegConverter {
    fn convert(&self, src: &Path, dest: &Path) -> Result<()> {
        debug!("ffmpeg: {} -> {}", src.display(), dest.display());
        let output = Command::new(&self.binary)
            .args(Self::args(src, dest))
            .output()
            .with_context(|| format!("run {}", self.binary.display()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(3)..].join(" | ");
            bail!("ffmpeg exited with {}: {}", output.status, tail);
        }
        Ok(())
    }
}

/// `ffprobe -show_entries format=duration`.
#[derive(Clone, Debug)]
pub struct FfprobeDuration {
    binary: PathBuf,
}

impl FfprobeDuration {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new(ffprobe_path())
    }
}

/// Parse ffprobe's bare duration output ("12.345000\n"). "N/A" and garbage give None.
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

impl DurationSource for FfprobeDuration {
    fn duration_secs(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                parse_duration_output(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                debug!("ffprobe {} exited with {}", path.display(), out.status);
                None
            }
            Err(e) => {
                debug!("ffprobe {}: {}", path.display(), e);
                None
            }
        }
    }
}
