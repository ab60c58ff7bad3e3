//! Object storage upload: the S3 API, or plain HTTP PUT through a gateway.

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use reqwest::blocking::Client;
use s3::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use std::path::Path;

use super::Uploader;
use crate::StorageSettings;
use crate::engine::tools::{extension_lower, file_name_string};
use crate::utils::config::HttpConsts;

fn content_type(path: &Path) -> &'static str {
    match extension_lower(path).as_deref() {
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Object key for a local file: its file name.
fn object_key(path: &Path) -> Result<String> {
    let key = file_name_string(path);
    if key.is_empty() {
        return Err(anyhow!("no file name in {}", path.display()));
    }
    Ok(key)
}

/// Uploads through the S3 API with signed requests. Keys are file names at the bucket root.
pub struct S3Uploader {
    bucket: Box<Bucket>,
}

impl S3Uploader {
    /// Static keys when both are set, otherwise the AWS credential chain (env, profile,
    /// instance metadata).
    pub fn new(storage: &StorageSettings) -> Result<Self> {
        if storage.bucket.is_empty() {
            bail!("no storage bucket configured");
        }
        let region: Region = storage
            .region
            .parse()
            .with_context(|| format!("storage region {:?}", storage.region))?;
        let credentials = match (&storage.access_key, &storage.secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access.as_str()), Some(secret.as_str()), None, None, None)
            }
            _ => Credentials::default(),
        }
        .context("load storage credentials")?;
        let bucket = Bucket::new(&storage.bucket, region, credentials)
            .with_context(|| format!("open bucket {}", storage.bucket))?;
        Ok(Self { bucket })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }
}

impl Uploader for S3Uploader {
    fn upload(&self, path: &Path) -> Result<String> {
        let key = object_key(path)?;
        let body =
            std::fs::read(path).with_context(|| format!("read {} for upload", path.display()))?;
        let resp = self
            .bucket
            .put_object_with_content_type(format!("/{key}"), &body, content_type(path))
            .with_context(|| format!("upload {key} to {}", self.bucket.name))?;
        let status = resp.status_code();
        if !(200..300).contains(&status) {
            bail!("upload {key}: storage answered {status}");
        }
        debug!("uploaded {} to {} ({} bytes)", key, self.bucket.name, body.len());
        Ok(key)
    }
}

/// Gateway mode: PUTs the file body to `{endpoint}/{key}`; the key is the file name.
///
/// Works against a gateway (or bucket) that accepts authenticated PUTs. The token, when set, is
/// sent as a bearer token.
pub struct HttpUploader {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpUploader {
    pub fn new(storage: &StorageSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(HttpConsts::UPLOAD_TIMEOUT)
            .build()
            .context("build upload HTTP client")?;
        Ok(Self {
            client,
            endpoint: storage.upload_endpoint().trim_end_matches('/').to_string(),
            token: storage.token.clone(),
        })
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }
}

impl Uploader for HttpUploader {
    fn upload(&self, path: &Path) -> Result<String> {
        let key = object_key(path)?;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open {} for upload", path.display()))?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);

        let mut req = self
            .client
            .put(self.object_url(&key))
            .header(reqwest::header::CONTENT_TYPE, content_type(path))
            .body(file);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .with_context(|| format!("PUT {}", self.object_url(&key)))?;
        resp.error_for_status()
            .with_context(|| format!("upload {key}"))?;
        debug!("uploaded {} ({} bytes)", key, len);
        Ok(key)
    }
}
