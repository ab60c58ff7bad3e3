#![allow(dead_code)]

use anyhow::{Result, anyhow};
use clipbatch::collab::{Converter, DurationSource, Notifier, PageService, SurveySource, Uploader};
use clipbatch::{BatchReport, Collaborators, HandlerOpts, PageRequest};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// --- fakes ---

/// Copies the source bytes to `dest`, or fails without writing.
#[derive(Default)]
pub struct FakeConverter {
    pub fail: bool,
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl Converter for FakeConverter {
    fn convert(&self, src: &Path, dest: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((src.to_path_buf(), dest.to_path_buf()));
        if self.fail {
            return Err(anyhow!("converter failure"));
        }
        std::fs::copy(src, dest)?;
        Ok(())
    }
}

pub struct FakeDuration(pub Option<f64>);

impl DurationSource for FakeDuration {
    fn duration_secs(&self, _path: &Path) -> Option<f64> {
        self.0
    }
}

/// Returns the file name as key. Names in `fail_names` fail. Each call is recorded first, then
/// takes `delay`.
#[derive(Default)]
pub struct FakeUploader {
    pub fail_names: Vec<String>,
    pub delay: Duration,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl Uploader for FakeUploader {
    fn upload(&self, path: &Path) -> Result<String> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        thread::sleep(self.delay);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail_names.contains(&name) {
            return Err(anyhow!("upload rejected"));
        }
        Ok(name)
    }
}

/// Answers with `answer`, or fails when it is None.
#[derive(Default)]
pub struct FakePages {
    pub answer: Option<String>,
    pub calls: Mutex<Vec<PageRequest>>,
}

impl PageService for FakePages {
    fn create_page(&self, request: &PageRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        self.answer
            .clone()
            .ok_or_else(|| anyhow!("page service unavailable"))
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub calls: Mutex<Vec<(Vec<String>, Vec<String>)>>,
}

impl Notifier for FakeNotifier {
    fn notify(&self, names: &[String], urls: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((names.to_vec(), urls.to_vec()));
        Ok(())
    }
}

pub struct FakeSurvey(pub Value);

impl SurveySource for FakeSurvey {
    fn load(&self) -> Value {
        self.0.clone()
    }
}

/// Every fake plus the reports delivered to the completion handler.
pub struct Fakes {
    pub converter: Arc<FakeConverter>,
    pub uploader: Arc<FakeUploader>,
    pub pages: Arc<FakePages>,
    pub notifier: Arc<FakeNotifier>,
    pub reports: Arc<Mutex<Vec<BatchReport>>>,
    pub duration: Option<f64>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            converter: Arc::new(FakeConverter::default()),
            uploader: Arc::new(FakeUploader::default()),
            pages: Arc::new(FakePages {
                answer: Some("https://pages.example/batch".to_string()),
                ..Default::default()
            }),
            notifier: Arc::new(FakeNotifier::default()),
            reports: Arc::new(Mutex::new(Vec::new())),
            duration: Some(30.0),
        }
    }
}

impl Fakes {
    /// Every upload takes `delay`, keeping a batch in flight long enough to act on it.
    pub fn with_upload_delay(delay: Duration) -> Self {
        Self {
            uploader: Arc::new(FakeUploader {
                delay,
                ..Default::default()
            }),
            ..Self::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        let reports = Arc::clone(&self.reports);
        Collaborators::new(
            self.converter.clone(),
            Arc::new(FakeDuration(self.duration)),
            self.uploader.clone(),
            self.pages.clone(),
            self.notifier.clone(),
            Arc::new(FakeSurvey(json!({"q1": "yes"}))),
        )
        .with_completion(move |r| reports.lock().unwrap().push(r.clone()))
    }

    pub fn reports(&self) -> Vec<BatchReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploader.calls.lock().unwrap().clone()
    }

    pub fn page_calls(&self) -> Vec<PageRequest> {
        self.pages.calls.lock().unwrap().clone()
    }

    pub fn notify_calls(&self) -> Vec<(Vec<String>, Vec<String>)> {
        self.notifier.calls.lock().unwrap().clone()
    }
}

// --- helpers ---

/// Short intervals so batches dispatch in well under a second.
pub fn fast_opts() -> HandlerOpts {
    HandlerOpts {
        batch_interval: Duration::from_millis(150),
        wait_timeout: Duration::from_secs(2),
        wait_interval: Duration::from_millis(20),
        sheet_id: "sheet-1".to_string(),
        bucket: "bkt".to_string(),
        ..HandlerOpts::default()
    }
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_clip(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Poll `cond` until it holds or `timeout` passes. Returns the last result.
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}
