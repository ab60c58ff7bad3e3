//! Recording timestamps: parsed from camera file names, or taken from the file's mtime.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Timelike};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

use crate::utils::config::TimingConsts;

/// Parse format for start/end timestamps. `%.f` also accepts a missing fraction.
const ISO_PARSE: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Fixed six fractional digits (what the file-name parser produces).
const ISO_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Start of a recording plus its `HH:MM` time of day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingTime {
    /// `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
    pub iso: String,
    /// `HH:MM`.
    pub time_of_day: String,
}

/// `YYYY-MM-DD$HH-MM-SS-ffffff`, exactly six fractional digits.
fn dollar_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{4}-\d{2}-\d{2})\$(\d{2})-(\d{2})-(\d{2})-(\d{6})(?:\D|$)")
            .expect("static regex")
    })
}

/// `YYYY-MM-DDTHH-MM-SS[-f{1,6}]`.
fn t_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{4}-\d{2}-\d{2})T(\d{2})-(\d{2})-(\d{2})(?:-(\d{1,6}))?(?:\D|$)")
            .expect("static regex")
    })
}

fn from_captures(caps: &Captures) -> Option<RecordingTime> {
    let date = caps.get(1)?.as_str();
    let (h, m, s) = (caps.get(2)?.as_str(), caps.get(3)?.as_str(), caps.get(4)?.as_str());
    let micros = caps.get(5).map_or("", |f| f.as_str());
    let iso = format!("{date}T{h}:{m}:{s}.{micros:0<6}");
    // Reject digit runs that look right but are not a real date/time (e.g. month 13).
    NaiveDateTime::parse_from_str(&iso, ISO_PARSE).ok()?;
    Some(RecordingTime {
        iso,
        time_of_day: format!("{h}:{m}"),
    })
}

/// Recording start encoded in a camera file name. The `$` form wins over the `T` form; the
/// first occurrence of a form wins. None when neither form is present.
pub fn timestamp_from_filename(filename: &str) -> Option<RecordingTime> {
    [dollar_pattern(), t_pattern()]
        .into_iter()
        .find_map(|re| re.captures(filename).and_then(|c| from_captures(&c)))
}

/// Local-time mtime of `path`, for files whose name carries no timestamp.
pub fn fallback_timestamp(path: &Path) -> Result<RecordingTime> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("read mtime of {}", path.display()))?;
    let local: DateTime<Local> = modified.into();
    let naive = local.naive_local();
    Ok(RecordingTime {
        iso: format_iso(&naive),
        time_of_day: naive.format("%H:%M").to_string(),
    })
}

/// Timestamp for a clip: file name first, mtime otherwise.
pub fn recording_time(path: &Path) -> Result<RecordingTime> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match timestamp_from_filename(&name) {
        Some(t) => Ok(t),
        None => fallback_timestamp(path),
    }
}

pub fn parse_iso(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, ISO_PARSE)
        .map_err(|e| anyhow!("invalid timestamp {s:?}: {e}"))
}

/// ISO-8601 with the fraction only when it is non-zero.
pub fn format_iso(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format(ISO_SECONDS).to_string()
    } else {
        dt.format(ISO_MICROS).to_string()
    }
}

/// End of a clip that starts at `start` and lasts `duration_secs`.
///
/// With a known duration the result drops a zero fraction (`...T00:30:00`). A missing, zero,
/// negative or non-finite duration counts as unknown: the clip is assumed to last a minute and
/// the result keeps six fractional digits like the start.
pub fn end_timestamp(start: &str, duration_secs: Option<f64>) -> Result<String> {
    let start_dt = parse_iso(start)?;
    let known = duration_secs.filter(|d| d.is_finite() && *d > 0.0);
    let (delta, fixed_fraction) = match known {
        Some(secs) => (TimeDelta::microseconds((secs * 1_000_000.0).round() as i64), false),
        None => {
            let fallback = TimeDelta::from_std(TimingConsts::FALLBACK_CLIP_LENGTH)
                .context("fallback clip length")?;
            (fallback, true)
        }
    };
    let end = start_dt
        .checked_add_signed(delta)
        .ok_or_else(|| anyhow!("end time out of range for {start} + {delta}"))?;
    Ok(if fixed_fraction {
        end.format(ISO_MICROS).to_string()
    } else {
        format_iso(&end)
    })
}
