//! Batch dispatch: drain the queue once, run every file, report once, clean up.

use log::{debug, info, warn};
use std::path::PathBuf;

use super::context::DispatchContext;
use super::error_handler::log_dropped_files;
use super::file_task::process_file;
use crate::engine::queue::dedup;
use crate::engine::state::{SharedIntake, lock_intake};
use crate::engine::timer::BatchTimer;
use crate::engine::tools::has_canonical_extension;
use crate::{BatchReport, PageRequest, VideoRecord};

/// Consumer side of the intake state. One `run_fired` per fired timer.
pub struct BatchDispatcher {
    state: SharedIntake,
    ctx: DispatchContext,
}

impl BatchDispatcher {
    pub fn new(state: SharedIntake, ctx: DispatchContext) -> Self {
        Self { state, ctx }
    }

    pub fn context(&self) -> &DispatchContext {
        &self.ctx
    }

    /// Dispatch on behalf of the timer armed as `generation`.
    ///
    /// A timer that was cancelled (or replaced) after its countdown ran out is stale: it leaves
    /// the queue and the current timer alone and returns None.
    pub fn run_fired(&self, generation: u64) -> Option<BatchReport> {
        let raw = {
            let mut st = lock_intake(&self.state);
            if st.timer.as_ref().map(BatchTimer::generation) != Some(generation) {
                debug!("Timer #{generation} is no longer armed; skipping");
                return None;
            }
            st.timer = None;
            st.queue.drain()
        };
        self.dispatch(raw)
    }

    /// Drain and process everything queued now, cancelling any armed timer.
    pub fn run_batch(&self) -> Option<BatchReport> {
        let raw = {
            let mut st = lock_intake(&self.state);
            if let Some(timer) = st.timer.take() {
                timer.cancel();
            }
            st.queue.drain()
        };
        self.dispatch(raw)
    }

    /// Process one drained queue. The lock is not held here; events arriving while files are
    /// processed go to the next batch (and arm the next timer). Returns the report when at
    /// least one file was uploaded.
    fn dispatch(&self, raw: Vec<PathBuf>) -> Option<BatchReport> {
        let raw_count = raw.len();
        let unique = dedup(raw);
        if unique.is_empty() {
            debug!("Nothing queued; no batch");
            return None;
        }
        info!(
            "Dispatching batch of {} files ({} events)",
            unique.len(),
            raw_count
        );

        let mut records: Vec<VideoRecord> = Vec::with_capacity(unique.len());
        let mut dropped = Vec::new();
        let mut registered: Vec<PathBuf> = Vec::new();
        for path in &unique {
            match process_file(&self.ctx, &self.state, path, &mut registered) {
                Ok(record) => records.push(record),
                Err(e) => dropped.push(e),
            }
        }
        log_dropped_files(&dropped, unique.len());

        let report = if records.is_empty() {
            info!("No files survived this batch; nothing to report");
            None
        } else {
            Some(self.report(&unique, &records))
        };
        self.housekeeping(&registered);
        report
    }

    /// One page request, one notification and one completion call for the batch.
    pub fn report(&self, unique: &[PathBuf], records: &[VideoRecord]) -> BatchReport {
        let request = self.page_request(unique, records);
        let fallback = records.first().map(|r| r.url.clone());

        let report_url = match self.ctx.collab.pages.create_page(&request) {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => {
                warn!("Page service returned an empty answer; using the first upload URL");
                fallback
            }
            Err(e) => {
                warn!("Page service failed ({:#}); using the first upload URL", e);
                fallback
            }
        };

        let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        let urls: Vec<String> = report_url.iter().cloned().collect();
        if let Err(e) = self.ctx.collab.notifier.notify(&names, &urls) {
            warn!("Notification failed: {:#}", e);
        }

        let report = BatchReport { names, report_url };
        info!(
            "Batch done: {} uploaded, link {}",
            report.names.len(),
            report.report_url.as_deref().unwrap_or("-")
        );
        if let Some(on_complete) = &self.ctx.collab.on_complete {
            on_complete(&report);
        }
        report
    }

    fn page_request(&self, unique: &[PathBuf], records: &[VideoRecord]) -> PageRequest {
        let mut video_paths: Vec<String> = unique
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        video_paths.sort();
        PageRequest {
            video_paths,
            video_names: records.iter().map(|r| r.name.clone()).collect(),
            video_urls: records.iter().map(|r| r.url.clone()).collect(),
            video_times: records.iter().map(|r| r.start.clone()).collect(),
            video_end_times: records.iter().map(|r| r.end.clone()).collect(),
            survey_data_list: records.iter().map(|r| r.survey.clone()).collect(),
            sheet_id: self.ctx.opts.sheet_id.clone(),
            bucket: self.ctx.opts.bucket.clone(),
        }
    }

    /// Delete this batch's converted artifacts and drop its skip tokens.
    ///
    /// Tokens registered by other batches still in flight are left alone.
    pub fn housekeeping(&self, registered: &[PathBuf]) {
        for path in registered {
            if has_canonical_extension(path) && path.is_file() {
                match std::fs::remove_file(path) {
                    Ok(()) => debug!("Removed converted file {}", path.display()),
                    Err(e) => warn!("Could not remove {}: {}", path.display(), e),
                }
            }
        }
        if registered.is_empty() {
            return;
        }
        let mut st = lock_intake(&self.state);
        for path in registered {
            st.skip.remove(path);
        }
    }
}
