//! Remote page generation (a web-app script that renders one page per batch).

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::blocking::Client;

use super::PageService;
use crate::PageRequest;
use crate::utils::config::HttpConsts;

/// JSON POST to the script URL; the response body is the page URL.
pub struct HttpPageService {
    client: Client,
    script_url: String,
}

impl HttpPageService {
    pub fn new(script_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(HttpConsts::PAGE_CONNECT_TIMEOUT)
            .timeout(HttpConsts::PAGE_CONNECT_TIMEOUT + HttpConsts::PAGE_READ_TIMEOUT)
            .build()
            .context("build page-service HTTP client")?;
        Ok(Self {
            client,
            script_url: script_url.into(),
        })
    }
}

impl PageService for HttpPageService {
    fn create_page(&self, request: &PageRequest) -> Result<String> {
        debug!(
            "page service: {} videos -> {}",
            request.video_names.len(),
            self.script_url
        );
        let resp = self
            .client
            .post(&self.script_url)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("page service timed out: {e}")
                } else {
                    anyhow!("page service request failed: {e}")
                }
            })?
            .error_for_status()
            .context("page service returned an error status")?;
        let body = resp.text().context("read page service response")?;
        Ok(body.trim().to_string())
    }
}

/// Used when no script URL is configured: every batch falls back to the first upload URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledPageService;

impl PageService for DisabledPageService {
    fn create_page(&self, _request: &PageRequest) -> Result<String> {
        Err(anyhow!("no page service configured"))
    }
}
