use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields the panel does not model. Kept so that equality and round trips
/// see the whole record.
pub type Extra = BTreeMap<String, Value>;

/// A polled record with a stable identifier.
pub trait Record {
    /// Identifier unique within one collection.
    fn record_id(&self) -> &str;
}

/// Server build information (`GET /v3/info`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Direction of a reader/publisher session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Read,
    Publish,
}

impl SessionState {
    /// True for sessions pushing media into the server.
    pub fn is_publishing(self) -> bool {
        self == SessionState::Publish
    }
}

/// RTMP connection (`/v3/rtmpconns/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtmpConn {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// RTSP transport-level connection (`/v3/rtspconns/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtspConn {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub tunnel: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// RTSP session (`/v3/rtspsessions/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtspSession {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub rtp_packets_received: u64,
    #[serde(default)]
    pub rtp_packets_sent: u64,
    #[serde(default)]
    pub rtp_packets_lost: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// WebRTC session (`/v3/webrtcsessions/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebRtcSession {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub peer_connection_established: bool,
    #[serde(default)]
    pub local_candidate: Option<String>,
    #[serde(default)]
    pub remote_candidate: Option<String>,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub rtp_packets_sent: u64,
    #[serde(default)]
    pub rtp_packets_received: u64,
    #[serde(default)]
    pub rtp_packets_lost: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// SRT connection (`/v3/srtconns/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SrtConn {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub packets_sent: u64,
    #[serde(default)]
    pub packets_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub mbps_send_rate: f64,
    #[serde(default)]
    pub mbps_receive_rate: f64,
    #[serde(default)]
    pub packets_send_loss_rate: f64,
    #[serde(default)]
    pub packets_received_loss_rate: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// HLS muxer (`/v3/hlsmuxers/list`). Keyed by path; muxers have no id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HlsMuxer {
    pub path: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub source_ready: bool,
    #[serde(default)]
    pub segment_count: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub last_request: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `{ type, id }` reference used by path sources and readers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Source of a path: either a bare identifier (as written in path
/// configuration, e.g. `publisher` or an URL) or a structured reference
/// reported by the runtime path list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathSource {
    /// Plain identifier or URL.
    Bare(String),
    /// `{ type, id }` object.
    Structured(SourceRef),
}

impl PathSource {
    pub fn bare(id: impl Into<String>) -> Self {
        PathSource::Bare(id.into())
    }

    pub fn structured(kind: impl Into<String>, id: impl Into<String>) -> Self {
        PathSource::Structured(SourceRef {
            kind: kind.into(),
            id: id.into(),
        })
    }

    /// Source type, if the server reported one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            PathSource::Bare(_) => None,
            PathSource::Structured(r) => Some(&r.kind),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PathSource::Bare(id) => id,
            PathSource::Structured(r) => &r.id,
        }
    }

    /// Structured form. Bare sources become `{ type: "", id }`.
    pub fn into_ref(self) -> SourceRef {
        match self {
            PathSource::Bare(id) => SourceRef {
                kind: String::new(),
                id,
            },
            PathSource::Structured(r) => r,
        }
    }
}

impl From<&str> for PathSource {
    fn from(value: &str) -> Self {
        PathSource::Bare(value.to_string())
    }
}

impl From<String> for PathSource {
    fn from(value: String) -> Self {
        PathSource::Bare(value)
    }
}

impl From<SourceRef> for PathSource {
    fn from(value: SourceRef) -> Self {
        PathSource::Structured(value)
    }
}

impl fmt::Display for PathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSource::Bare(id) => f.write_str(id),
            PathSource::Structured(r) if r.kind.is_empty() => f.write_str(&r.id),
            PathSource::Structured(r) => write!(f, "{} ({})", r.kind, r.id),
        }
    }
}

/// Runtime path entry (`/v3/paths/list`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    pub name: String,
    #[serde(default)]
    pub conf_name: Option<String>,
    #[serde(default)]
    pub source: Option<PathSource>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub ready_time: Option<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub readers: Vec<SourceRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Editable path configuration sent to `config/paths/add` and `config/paths/patch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_on_demand: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_part_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_max_part_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp_transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp_any_port: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_init: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_demand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_ready: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Paged list envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total pages at the requested page size.
    #[serde(default)]
    pub page_count: u64,
    #[serde(default)]
    pub item_count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// List responses come either bare or wrapped in a [`Page`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Paged(Page<T>),
}

impl<T> ListBody<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Paged(page) => page.items,
        }
    }
}

macro_rules! record_by {
    ($ty:ty, $field:ident) => {
        impl Record for $ty {
            fn record_id(&self) -> &str {
                &self.$field
            }
        }
    };
}

record_by!(RtmpConn, id);
record_by!(RtspConn, id);
record_by!(RtspSession, id);
record_by!(WebRtcSession, id);
record_by!(SrtConn, id);
record_by!(HlsMuxer, path);
record_by!(PathInfo, name);

/// Anything carrying a `created` timestamp.
pub trait Created {
    fn created(&self) -> Option<&str>;
}

macro_rules! created_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Created for $ty {
                fn created(&self) -> Option<&str> {
                    self.created.as_deref()
                }
            }
        )*
    };
}

created_field!(RtmpConn, RtspConn, RtspSession, WebRtcSession, SrtConn, HlsMuxer);
