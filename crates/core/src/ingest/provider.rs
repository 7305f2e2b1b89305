use crate::config::Settings;
use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// Where the recommendations page comes from.
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Returns the page body decoded to UTF-8.
    async fn fetch_page(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct MdmHttpSource {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl MdmHttpSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let retries = settings.fetch_retries;
        anyhow::ensure!(retries >= 1, "MDM_FETCH_RETRIES must be >= 1");
        anyhow::ensure!(
            settings.fetch_timeout_secs >= 1,
            "MDM_TIMEOUT_SECS must be >= 1"
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .build()
            .context("failed to build mdm http client")?;

        Ok(Self {
            http,
            url: settings.source_url.clone(),
            retries,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        headers
    }

    async fn fetch_once(&self) -> Result<String> {
        let res = self
            .http
            .get(&self.url)
            .headers(self.headers())
            .send()
            .await
            .context("recommendations page request failed")?;

        let status = res.status();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res
            .bytes()
            .await
            .context("failed to read recommendations page body")?;

        if !status.is_success() {
            anyhow::bail!("recommendations page HTTP {status} ({} bytes)", bytes.len());
        }

        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

#[async_trait::async_trait]
impl RecommendationSource for MdmHttpSource {
    fn source_name(&self) -> &'static str {
        "mdm_html"
    }

    async fn fetch_page(&self) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(page) => {
                    tracing::debug!(url = %self.url, bytes = page.len(), "fetched recommendations page");
                    return Ok(page);
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "recommendations fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Decodes a response body using the `charset` of its `Content-Type`, falling back to UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (cow, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "page contained undecodable bytes");
    }
    cow.into_owned()
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}
