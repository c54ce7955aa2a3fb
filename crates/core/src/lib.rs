#![forbid(unsafe_code)]

//! Shared models and logic for the MediaMTX control panel.

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod stats;

pub use config::{AuthAction, AuthInternalUser, AuthPermission, GlobalConfig};
pub use error::{user_message, ApiError, Classify, FailureKind};
pub use model::{
    Created, HlsMuxer, ListBody, Page, PathConfig, PathInfo, PathSource, Record, RtmpConn,
    RtspConn, RtspSession, ServerInfo, SessionState, SourceRef, SrtConn, WebRtcSession,
};
pub use stats::{
    HlsStats, RtmpStats, RtspSessionStats, SrtStats, Summary, TotalStats, WebRtcStats,
};
