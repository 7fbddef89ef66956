//! Twitch adapter backed by the Helix `streams` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::adapter::{PlatformAdapter, PlatformLiveStatus};
use super::error::PlatformError;

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    #[serde(default)]
    data: Vec<HelixStream>,
}

#[derive(Debug, Deserialize)]
struct HelixStream {
    user_login: String,
    #[serde(rename = "type", default)]
    stream_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    viewer_count: u64,
    started_at: Option<DateTime<Utc>>,
}

pub struct TwitchAdapter {
    client: Client,
    client_id: String,
    access_token: String,
    api_base: String,
}

impl TwitchAdapter {
    pub const PLATFORM: &'static str = "twitch";
    const API_BASE: &'static str = "https://api.twitch.tv/helix";
    const WEB_BASE: &'static str = "https://www.twitch.tv";

    pub fn new(client: Client, client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            access_token: access_token.into(),
            api_base: Self::API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn parse_streams(handle: &str, body: &str) -> Result<PlatformLiveStatus, PlatformError> {
        let response: StreamsResponse = serde_json::from_str(body)?;

        let stream = response
            .data
            .into_iter()
            .find(|s| s.user_login.eq_ignore_ascii_case(handle));

        Ok(match stream {
            Some(stream) if stream.stream_type == "live" => PlatformLiveStatus {
                is_live: true,
                title: Some(stream.title),
                stream_url: Some(format!("{}/{}", Self::WEB_BASE, stream.user_login)),
                viewer_count: Some(stream.viewer_count),
                started_at: stream.started_at,
            },
            _ => PlatformLiveStatus::offline(),
        })
    }

    fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        let reset = headers
            .get("ratelimit-reset")?
            .to_str()
            .ok()?
            .parse::<i64>()
            .ok()?;
        let secs = reset - Utc::now().timestamp();
        Some(Duration::from_secs(secs.max(0) as u64))
    }
}

#[async_trait]
impl PlatformAdapter for TwitchAdapter {
    fn platform(&self) -> &str {
        Self::PLATFORM
    }

    async fn get_live_status(&self, handle: &str) -> Result<PlatformLiveStatus, PlatformError> {
        let url = format!("{}/streams", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[("user_login", handle)])
            .header("Client-Id", &self.client_id)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(PlatformError::NotFound),
            StatusCode::UNAUTHORIZED => return Err(PlatformError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(PlatformError::RateLimited {
                    retry_after: Self::retry_after(response.headers()),
                });
            }
            status => {
                return Err(PlatformError::Other(format!(
                    "unexpected status {status} for {handle}"
                )));
            }
        }

        let body = response.text().await?;
        debug!(handle, "twitch streams response: {}", body);
        Self::parse_streams(handle, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_live_stream() {
        let body = r#"{
            "data": [{
                "id": "1",
                "user_login": "somestreamer",
                "type": "live",
                "title": "Speedruns",
                "viewer_count": 1234,
                "started_at": "2024-03-04T14:00:00Z"
            }],
            "pagination": {}
        }"#;

        let status = TwitchAdapter::parse_streams("SomeStreamer", body).unwrap();
        assert!(status.is_live);
        assert_eq!(status.title.as_deref(), Some("Speedruns"));
        assert_eq!(status.viewer_count, Some(1234));
        assert_eq!(
            status.stream_url.as_deref(),
            Some("https://www.twitch.tv/somestreamer")
        );
        assert!(status.started_at.is_some());
    }

    #[test]
    fn test_parse_offline_when_empty() {
        let status = TwitchAdapter::parse_streams("nobody", r#"{"data": []}"#).unwrap();
        assert!(!status.is_live);
        assert!(status.title.is_none());
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = TwitchAdapter::parse_streams("nobody", "not json").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidResponse(_)));
    }

    #[test]
    fn test_api_base_trimmed() {
        crate::utils::http_client::install_rustls_provider();
        let adapter = TwitchAdapter::new(Client::new(), "id", "token")
            .with_api_base("http://localhost:8080/helix/");
        assert_eq!(adapter.api_base, "http://localhost:8080/helix");
        assert_eq!(adapter.platform(), "twitch");
    }
}
