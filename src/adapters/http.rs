use crate::utils::error::{RadarError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.startupradar.co";
pub const API_KEY_HEADER: &str = "X-ApiKey";

/// Authenticated read-only client for the startup radar API.
#[derive(Debug, Clone)]
pub struct RadarApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RadarApiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            RadarError::invalid_config("api.base_url", base_url, format!("Invalid URL format: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RadarError::invalid_config(
                "api.base_url",
                base_url.as_str(),
                "URL cannot be used as a base",
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// 把路徑片段接在 base URL 之後，片段會被正確編碼
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RadarError::invalid_config(
                    "api.base_url",
                    self.base_url.as_str(),
                    "URL cannot be used as a base",
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET 並解析 JSON。非 200、逾時或內容無法解析都視為 `SourceFetchFailed`
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], source: &str) -> Result<T> {
        let url = self.endpoint_url(segments)?;

        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request to {} timed out", url)
                } else {
                    format!("request to {} failed: {}", url, e)
                };
                RadarError::fetch_failed(source, reason)
            })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RadarError::fetch_failed(
                source,
                format!("{} returned HTTP {}: {}", url, status, truncate(&body, 200)),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RadarError::fetch_failed(source, format!("reading body failed: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| RadarError::fetch_failed(source, format!("malformed payload: {}", e)))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}
