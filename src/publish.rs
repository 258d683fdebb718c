//! Artifact publishing to the anonymous file host
//!
//! Catbox.moe takes a multipart upload and answers with the bare file URL
//! as its response body.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Default artifact host API endpoint
const DEFAULT_API_URL: &str = "https://catbox.moe/user/api.php";

/// Default upload timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name the artifact is stored under
const UPLOAD_FILENAME: &str = "proxies.txt";

/// Stores a text artifact and returns its durable URL
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, content: String) -> Result<String>;
}

/// Configuration for the Catbox publisher
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Catbox API endpoint
    pub api_url: String,
    /// Account hash attached to uploads (empty = anonymous)
    pub userhash: String,
    /// Timeout for the upload request
    pub timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            userhash: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PublisherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_userhash(mut self, userhash: String) -> Self {
        self.userhash = userhash;
        self
    }
}

/// Publisher uploading artifacts to Catbox.moe
pub struct CatboxPublisher {
    config: PublisherConfig,
    client: Client,
}

impl CatboxPublisher {
    pub fn new() -> Result<Self> {
        Self::with_config(PublisherConfig::default())
    }

    pub fn with_config(config: PublisherConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Publish for CatboxPublisher {
    async fn publish(&self, content: String) -> Result<String> {
        let file = Part::text(content)
            .file_name(UPLOAD_FILENAME)
            .mime_str("text/plain")
            .map_err(|e| Error::Publish(e.to_string()))?;

        let form = Form::new()
            .text("reqtype", "fileupload")
            .text("userhash", self.config.userhash.clone())
            .part("fileToUpload", file);

        let response = self
            .client
            .post(&self.config.api_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Publish(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Publish(format!("Upload returned HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Publish(e.to_string()))?;
        let url = body.trim();
        if url.is_empty() {
            return Err(Error::Publish("Upload returned an empty body".to_string()));
        }

        info!(url, "artifact published");
        Ok(url.to_string())
    }
}
