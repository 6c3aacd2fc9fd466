//! Read-only client for the TfL Road API.

use crate::model::{decode_disruptions, decode_road_statuses, RoadDisruption, RoadStatus};
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

#[derive(Debug, Error)]
pub enum TflError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("TfL API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("TfL API returned HTTP {code}{}", body_suffix(.body))]
    HttpStatus { code: u16, body: String },
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Immutable settings for one [`TflClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    /// Whole-request timeout, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: None,
            app_key: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("tunnel-watch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set credentials; empty strings count as absent.
    pub fn with_credentials(mut self, app_id: Option<String>, app_key: Option<String>) -> Self {
        self.app_id = app_id.filter(|v| !v.is_empty());
        self.app_key = app_key.filter(|v| !v.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TflClient {
    base_url: Url,
    app_id: Option<String>,
    app_key: Option<String>,
    http: Client,
}

impl TflClient {
    pub fn new(config: ClientConfig) -> Result<Self, TflError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            base_url,
            app_id: config.app_id.filter(|v| !v.is_empty()),
            app_key: config.app_key.filter(|v| !v.is_empty()),
            http,
        })
    }

    /// `GET /Road/{ids}`. An empty id list returns immediately.
    pub async fn fetch_road_statuses(&self, ids: &[String]) -> Result<Vec<RoadStatus>, TflError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(&format!("Road/{}", ids.join(",")))?;
        let body = self.get(url).await?;
        let statuses = decode_road_statuses(&body)?;
        debug!(count = statuses.len(), "decoded road statuses");
        Ok(statuses)
    }

    /// `GET /Road/all/Disruption`.
    pub async fn fetch_road_disruptions(&self) -> Result<Vec<RoadDisruption>, TflError> {
        let url = self.endpoint("Road/all/Disruption")?;
        let body = self.get(url).await?;
        let disruptions = decode_disruptions(&body)?;
        debug!(count = disruptions.len(), "decoded road disruptions");
        Ok(disruptions)
    }

    fn endpoint(&self, path: &str) -> Result<Url, TflError> {
        let raw = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| TflError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if self.app_id.is_some() || self.app_key.is_some() {
            let mut pairs = url.query_pairs_mut();
            if let Some(id) = &self.app_id {
                pairs.append_pair("app_id", id);
            }
            if let Some(key) = &self.app_key {
                pairs.append_pair("app_key", key);
            }
        }
        Ok(url)
    }

    /// Issue one GET and return the body of a 2xx response.
    async fn get(&self, url: Url) -> Result<String, TflError> {
        // The query carries credentials, so only the path is logged.
        debug!(path = url.path(), "GET");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            return Err(TflError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, TflError> {
    let url = Url::parse(raw.trim()).map_err(|e| TflError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(TflError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(TflError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "query and fragment are not allowed".to_string(),
        });
    }
    Ok(url)
}
