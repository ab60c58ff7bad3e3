//! Per-file pipeline: settle, timestamp, duration, survey, normalize, upload.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::context::DispatchContext;
use super::error_handler::FileError;
use crate::VideoRecord;
use crate::engine::state::{SharedIntake, lock_intake};
use crate::engine::timestamp::{end_timestamp, recording_time};
use crate::engine::tools::{converted_path_for, file_name_string, has_canonical_extension};

/// Run one candidate through the pipeline.
///
/// Converted siblings this call registers in the skip set are appended to `registered` so the
/// dispatcher can clean them up once the whole batch is done, whatever the outcome here.
pub fn process_file(
    ctx: &DispatchContext,
    state: &SharedIntake,
    path: &Path,
    registered: &mut Vec<PathBuf>,
) -> Result<VideoRecord, FileError> {
    if !ctx.detector.wait_until_stable(path) {
        return Err(FileError::Unstable {
            path: path.to_path_buf(),
            timeout: ctx.detector.timeout,
        });
    }

    let time = recording_time(path).map_err(|e| FileError::Timestamp {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;
    let duration = ctx.collab.durations.duration_secs(path);
    if duration.is_none() {
        debug!("{}: duration unknown, assuming one minute", path.display());
    }
    let end = end_timestamp(&time.iso, duration).map_err(|e| FileError::Timestamp {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;

    let survey = ctx.collab.surveys.load();

    let upload_path = normalize(ctx, state, path, registered);

    let key = ctx
        .collab
        .uploader
        .upload(&upload_path)
        .map_err(|e| FileError::Upload {
            path: upload_path.clone(),
            reason: format!("{e:#}"),
        })?;
    let url = ctx.opts.public_url(&key);
    debug!("{} -> {}", path.display(), url);

    Ok(VideoRecord {
        name: file_name_string(path),
        source: path.to_path_buf(),
        start: time.iso,
        time_of_day: time.time_of_day,
        end,
        survey,
        key,
        url,
    })
}

/// Path to upload: the converted sibling when conversion succeeds, the original otherwise.
///
/// The sibling is registered in the skip set before the converter runs, so the creation event
/// it triggers never reaches the queue.
fn normalize(
    ctx: &DispatchContext,
    state: &SharedIntake,
    path: &Path,
    registered: &mut Vec<PathBuf>,
) -> PathBuf {
    if has_canonical_extension(path) {
        return path.to_path_buf();
    }
    let dest = converted_path_for(path);
    if dest.exists() {
        // Never overwrite (and later delete) a clip that is already in the directory.
        warn!(
            "{} already exists, uploading {} unconverted",
            dest.display(),
            path.display()
        );
        return path.to_path_buf();
    }

    lock_intake(state).skip.insert(dest.clone());
    registered.push(dest.clone());

    match ctx.collab.converter.convert(path, &dest) {
        Ok(()) => dest,
        Err(e) => {
            warn!(
                "Conversion of {} failed, uploading original: {:#}",
                path.display(),
                e
            );
            path.to_path_buf()
        }
    }
}
