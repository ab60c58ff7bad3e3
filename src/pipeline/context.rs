//! Collaborators and settings shared by every dispatch of a handler.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::collab::{
    Converter, DisabledPageService, DurationSource, FfmpegConverter, FfprobeDuration,
    HttpPageService, HttpUploader, JsonSurveyFile, LogNotifier, Notifier, PageService,
    S3Uploader, SmtpNotifier, SurveySource, Uploader, WebhookNotifier,
};
use crate::engine::stability::StableFileDetector;
use crate::{BatchReport, HandlerOpts, Settings};

/// Called once per batch that produced at least one upload.
pub type CompletionHandler = Arc<dyn Fn(&BatchReport) + Send + Sync>;

/// External collaborators, one per seam. Cheap to clone.
#[derive(Clone)]
pub struct Collaborators {
    pub converter: Arc<dyn Converter>,
    pub durations: Arc<dyn DurationSource>,
    pub uploader: Arc<dyn Uploader>,
    pub pages: Arc<dyn PageService>,
    pub notifier: Arc<dyn Notifier>,
    pub surveys: Arc<dyn SurveySource>,
    pub on_complete: Option<CompletionHandler>,
}

impl Collaborators {
    pub fn new(
        converter: Arc<dyn Converter>,
        durations: Arc<dyn DurationSource>,
        uploader: Arc<dyn Uploader>,
        pages: Arc<dyn PageService>,
        notifier: Arc<dyn Notifier>,
        surveys: Arc<dyn SurveySource>,
    ) -> Self {
        Self {
            converter,
            durations,
            uploader,
            pages,
            notifier,
            surveys,
            on_complete: None,
        }
    }

    /// Register the batch completion handler.
    pub fn with_completion<F>(mut self, f: F) -> Self
    where
        F: Fn(&BatchReport) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(f));
        self
    }

    /// Concrete collaborators from settings: ffmpeg/ffprobe, storage upload (S3 API, or the
    /// PUT gateway when an endpoint is set), page service when a script URL is set, survey file.
    /// Notifications go by mail when an SMTP server is set, else to the webhook, else the log.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let uploader: Arc<dyn Uploader> = match &settings.storage.endpoint {
            Some(endpoint) => {
                info!("Uploading through gateway {endpoint}");
                Arc::new(HttpUploader::new(&settings.storage)?)
            }
            None => Arc::new(S3Uploader::new(&settings.storage)?),
        };
        let pages: Arc<dyn PageService> = match &settings.page.script_url {
            Some(url) => Arc::new(HttpPageService::new(url.clone())?),
            None => {
                info!("No page service configured; batches report the first upload URL");
                Arc::new(DisabledPageService)
            }
        };
        let notify = &settings.notify;
        let notifier: Arc<dyn Notifier> = if notify.smtp.server.is_some() {
            Arc::new(SmtpNotifier::new(&notify.smtp, &notify.recipient)?)
        } else if let Some(url) = &notify.webhook_url {
            Arc::new(WebhookNotifier::new(url.clone(), notify.recipient.clone())?)
        } else {
            Arc::new(LogNotifier {
                recipient: notify.recipient.clone(),
            })
        };
        Ok(Self::new(
            Arc::new(FfmpegConverter::default()),
            Arc::new(FfprobeDuration::default()),
            uploader,
            pages,
            notifier,
            Arc::new(JsonSurveyFile::new(settings.survey_path.clone())),
        ))
    }
}

/// Everything a dispatch needs besides the intake state.
#[derive(Clone)]
pub struct DispatchContext {
    pub opts: HandlerOpts,
    pub detector: StableFileDetector,
    pub collab: Collaborators,
}

impl DispatchContext {
    pub fn new(opts: HandlerOpts, collab: Collaborators) -> Self {
        let detector = StableFileDetector::new(opts.wait_interval, opts.wait_timeout);
        Self {
            opts,
            detector,
            collab,
        }
    }
}
