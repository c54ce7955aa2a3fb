//! Typed access to the MediaMTX control API (`/v3`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use mtxpanel_core::error::response_message;
use mtxpanel_core::model::{
    HlsMuxer, ListBody, PathConfig, PathInfo, RtmpConn, RtspConn, RtspSession, ServerInfo,
    SrtConn, WebRtcSession,
};
use mtxpanel_core::GlobalConfig;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

pub const API_PREFIX: &str = "/v3";
pub const DEFAULT_API_URL: &str = "http://localhost:9997";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 100;

/// Collections exposed by the `list` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Paths,
    RtmpConns,
    RtspConns,
    RtspSessions,
    WebRtcSessions,
    SrtConns,
    HlsMuxers,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Paths,
        Resource::RtmpConns,
        Resource::RtspConns,
        Resource::RtspSessions,
        Resource::WebRtcSessions,
        Resource::SrtConns,
        Resource::HlsMuxers,
    ];

    /// URL segment, e.g. `rtmpconns`.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Paths => "paths",
            Resource::RtmpConns => "rtmpconns",
            Resource::RtspConns => "rtspconns",
            Resource::RtspSessions => "rtspsessions",
            Resource::WebRtcSessions => "webrtcsessions",
            Resource::SrtConns => "srtconns",
            Resource::HlsMuxers => "hlsmuxers",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Paths => "Paths",
            Resource::RtmpConns => "RTMP Connections",
            Resource::RtspConns => "RTSP Connections",
            Resource::RtspSessions => "RTSP Sessions",
            Resource::WebRtcSessions => "WebRTC Sessions",
            Resource::SrtConns => "SRT Connections",
            Resource::HlsMuxers => "HLS Muxers",
        }
    }

    pub fn list_path(self, page: u32, items_per_page: u32) -> String {
        format!(
            "/{}/list?page={page}&itemsPerPage={items_per_page}",
            self.as_str()
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Resource::ALL.iter().map(|r| r.as_str()).collect();
                format!("unknown resource {s:?} (expected one of {})", known.join(", "))
            })
    }
}

/// Connection counts across every protocol.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCounts {
    pub rtmp_conns: usize,
    pub rtsp_conns: usize,
    pub rtsp_sessions: usize,
    pub webrtc_sessions: usize,
    pub srt_conns: usize,
    pub hls_muxers: usize,
}

impl ConnectionCounts {
    pub fn total(&self) -> usize {
        self.rtmp_conns
            + self.rtsp_conns
            + self.rtsp_sessions
            + self.webrtc_sessions
            + self.srt_conns
            + self.hls_muxers
    }
}

#[derive(Debug, Clone)]
pub struct MediaMtxApi {
    client: reqwest::Client,
    base_url: String,
}

/// Checks that `raw` is an absolute http(s) URL and strips trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(trimmed.to_string())
}

impl MediaMtxApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Same connection pool, different server.
    pub fn at(&self, base_url: &str) -> Result<Self> {
        Self::with_client(self.client.clone(), base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{API_PREFIX}{endpoint}", self.base_url)
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Vec<u8>> {
        let url = self.url(endpoint);
        tracing::debug!(%method, %url, "mediamtx request");

        let mut req = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let body: Option<Value> = serde_json::from_slice(&bytes).ok();
            let message = response_message(body.as_ref());
            tracing::warn!(%method, %url, status = status.as_u16(), %message, "mediamtx error response");
            return Err(ClientError::Response {
                status: status.as_u16(),
                message,
                body,
            });
        }
        Ok(bytes.to_vec())
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let bytes = self.request(Method::GET, endpoint, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Mutations may answer with an empty body; that maps to `Value::Null`.
    async fn mutate<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value> {
        let body = body.map(serde_json::to_value).transpose()?;
        let bytes = self.request(method, endpoint, body).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.get("/info").await
    }

    pub async fn global_config(&self) -> Result<GlobalConfig> {
        self.get("/config/global/get").await
    }

    pub async fn patch_global_config(&self, patch: &GlobalConfig) -> Result<Value> {
        self.mutate(Method::PATCH, "/config/global/patch", Some(patch))
            .await
    }

    /// Writes the current global configuration back unchanged, which makes
    /// the server re-apply it.
    pub async fn reload_configuration(&self) -> Result<Value> {
        let current = self.global_config().await?;
        self.patch_global_config(&current).await
    }

    /// Items of one page of any list endpoint.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        page: u32,
        items_per_page: u32,
    ) -> Result<Vec<T>> {
        let body: ListBody<T> = self.get(&resource.list_path(page, items_per_page)).await?;
        Ok(body.into_items())
    }

    pub async fn paths(&self, page: u32, items_per_page: u32) -> Result<Vec<PathInfo>> {
        self.list(Resource::Paths, page, items_per_page).await
    }

    pub async fn add_path(&self, name: &str, config: &PathConfig) -> Result<Value> {
        self.mutate(Method::POST, &format!("/config/paths/add/{name}"), Some(config))
            .await
    }

    pub async fn patch_path(&self, name: &str, config: &PathConfig) -> Result<Value> {
        self.mutate(
            Method::PATCH,
            &format!("/config/paths/patch/{name}"),
            Some(config),
        )
        .await
    }

    pub async fn delete_path(&self, name: &str) -> Result<Value> {
        self.mutate::<Value>(Method::DELETE, &format!("/config/paths/delete/{name}"), None)
            .await
    }

    pub async fn rtmp_conns(&self, page: u32, items_per_page: u32) -> Result<Vec<RtmpConn>> {
        self.list(Resource::RtmpConns, page, items_per_page).await
    }

    pub async fn rtsp_conns(&self, page: u32, items_per_page: u32) -> Result<Vec<RtspConn>> {
        self.list(Resource::RtspConns, page, items_per_page).await
    }

    pub async fn rtsp_sessions(&self, page: u32, items_per_page: u32) -> Result<Vec<RtspSession>> {
        self.list(Resource::RtspSessions, page, items_per_page)
            .await
    }

    pub async fn kick_rtsp_session(&self, id: &str) -> Result<Value> {
        self.mutate::<Value>(Method::POST, &format!("/rtspsessions/kick/{id}"), None)
            .await
    }

    pub async fn webrtc_sessions(
        &self,
        page: u32,
        items_per_page: u32,
    ) -> Result<Vec<WebRtcSession>> {
        self.list(Resource::WebRtcSessions, page, items_per_page)
            .await
    }

    pub async fn srt_conns(&self, page: u32, items_per_page: u32) -> Result<Vec<SrtConn>> {
        self.list(Resource::SrtConns, page, items_per_page).await
    }

    pub async fn hls_muxers(&self, page: u32, items_per_page: u32) -> Result<Vec<HlsMuxer>> {
        self.list(Resource::HlsMuxers, page, items_per_page).await
    }

    /// Counts every protocol's connections using the default page. The first
    /// failing collection aborts the check.
    pub async fn check_all_connections(&self) -> Result<ConnectionCounts> {
        let (page, per) = (DEFAULT_PAGE, DEFAULT_ITEMS_PER_PAGE);
        Ok(ConnectionCounts {
            rtmp_conns: self.rtmp_conns(page, per).await?.len(),
            rtsp_conns: self.rtsp_conns(page, per).await?.len(),
            rtsp_sessions: self.rtsp_sessions(page, per).await?.len(),
            webrtc_sessions: self.webrtc_sessions(page, per).await?.len(),
            srt_conns: self.srt_conns(page, per).await?.len(),
            hls_muxers: self.hls_muxers(page, per).await?.len(),
        })
    }
}
