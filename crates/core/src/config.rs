//! Global server configuration (`/v3/config/global/*`).
//!
//! Every modelled field is optional so the same type serves as the full
//! document returned by `get` and as a sparse body for `patch`. Keys the
//! schema does not know are kept in [`GlobalConfig::extra`] and written
//! back untouched.

use serde::{Deserialize, Serialize};

use crate::model::Extra;

/// Action a user may be granted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Publish,
    Read,
    /// Access to recorded segments.
    Playback,
    /// Control API access.
    Api,
    Metrics,
    Pprof,
}

impl AuthAction {
    pub const ALL: [AuthAction; 6] = [
        AuthAction::Publish,
        AuthAction::Read,
        AuthAction::Playback,
        AuthAction::Api,
        AuthAction::Metrics,
        AuthAction::Pprof,
    ];
}

/// One permission entry; an empty `path` applies to all paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthPermission {
    pub action: AuthAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Entry of `authInternalUsers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthInternalUser {
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<AuthPermission>,
}

impl AuthInternalUser {
    pub fn can(&self, action: AuthAction) -> bool {
        self.permissions.iter().any(|p| p.action == action)
    }
}

/// Server-wide settings. Doubles as a sparse patch body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    // logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_destinations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_structured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_log_prefix: Option<String>,

    // performance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_queue_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_max_payload_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_read_buffer_size: Option<u64>,

    // hooks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_connect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_connect_restart: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_disconnect: Option<String>,

    // control API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_encryption: Option<bool>,

    // RTSP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp_encryption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsps_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtsp_transports: Option<Vec<String>>,

    // RTMP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmp_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmp_encryption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps_address: Option<String>,

    // HLS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_segment_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_segment_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_always_remux: Option<bool>,

    // WebRTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_handshake_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_track_gather_timeout: Option<String>,
    #[serde(
        rename = "webrtcLocalUDPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webrtc_local_udp_address: Option<String>,
    #[serde(
        rename = "webrtcIPsFromInterfaces",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webrtc_ips_from_interfaces: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_additional_hosts: Option<Vec<String>>,

    // SRT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_address: Option<String>,

    // authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_internal_users: Option<Vec<AuthInternalUser>>,
    #[serde(rename = "authHTTPAddress", default, skip_serializing_if = "Option::is_none")]
    pub auth_http_address: Option<String>,
    #[serde(rename = "authJWTJWKS", default, skip_serializing_if = "Option::is_none")]
    pub auth_jwt_jwks: Option<String>,
    #[serde(rename = "authJWTClaimKey", default, skip_serializing_if = "Option::is_none")]
    pub auth_jwt_claim_key: Option<String>,
    #[serde(rename = "authJWTInHTTPQuery", default, skip_serializing_if = "Option::is_none")]
    pub auth_jwt_in_http_query: Option<bool>,

    /// Keys outside the schema, passed through verbatim.
    #[serde(flatten)]
    pub extra: Extra,
}

// Single list of modelled fields shared by merge/diff/is_empty.
macro_rules! with_fields {
    ($cb:ident ! ($($args:tt)*)) => {
        $cb!($($args)*;
            log_level, log_destinations, log_structured, log_file, sys_log_prefix,
            read_timeout, write_timeout, write_queue_size, udp_max_payload_size,
            udp_read_buffer_size,
            run_on_connect, run_on_connect_restart, run_on_disconnect,
            api, api_address, api_encryption,
            rtsp, rtsp_address, rtsp_encryption, rtsps_address, rtsp_transports,
            rtmp, rtmp_address, rtmp_encryption, rtmps_address,
            hls, hls_address, hls_encryption, hls_variant, hls_segment_count,
            hls_segment_duration, hls_always_remux,
            webrtc, webrtc_address, webrtc_encryption, webrtc_handshake_timeout,
            webrtc_track_gather_timeout, webrtc_local_udp_address,
            webrtc_ips_from_interfaces, webrtc_additional_hosts,
            srt, srt_address,
            auth_method, auth_internal_users, auth_http_address, auth_jwt_jwks,
            auth_jwt_claim_key, auth_jwt_in_http_query
        )
    };
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr; $($f:ident),* $(,)?) => {
        $(
            if $src.$f.is_some() {
                $dst.$f = $src.$f.clone();
            }
        )*
    };
}

macro_rules! diff_fields {
    ($out:expr, $base:expr, $edited:expr; $($f:ident),* $(,)?) => {
        $(
            if $edited.$f.is_some() && $edited.$f != $base.$f {
                $out.$f = $edited.$f.clone();
            }
        )*
    };
}

macro_rules! all_unset {
    ($cfg:expr; $($f:ident),* $(,)?) => {
        true $(&& $cfg.$f.is_none())*
    };
}

impl GlobalConfig {
    /// Apply `patch` on top of `self`. Set fields win; unset fields leave
    /// the current value alone. Unknown keys are merged the same way.
    pub fn merge(&mut self, patch: &GlobalConfig) {
        with_fields!(merge_fields!(self, patch));
        for (k, v) in &patch.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }

    /// Sparse config holding only what `edited` changes relative to `self`.
    pub fn diff(&self, edited: &GlobalConfig) -> GlobalConfig {
        let mut out = GlobalConfig::default();
        with_fields!(diff_fields!(out, self, edited));
        for (k, v) in &edited.extra {
            if self.extra.get(k) != Some(v) {
                out.extra.insert(k.clone(), v.clone());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        with_fields!(all_unset!(self)) && self.extra.is_empty()
    }

    /// Protocol listeners as `(name, enabled)`; unset counts as disabled.
    pub fn protocols(&self) -> [(&'static str, bool); 5] {
        [
            ("rtsp", self.rtsp.unwrap_or(false)),
            ("rtmp", self.rtmp.unwrap_or(false)),
            ("hls", self.hls.unwrap_or(false)),
            ("webrtc", self.webrtc.unwrap_or(false)),
            ("srt", self.srt.unwrap_or(false)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overrides_only_set_fields() {
        let mut base = GlobalConfig {
            log_level: Some("info".into()),
            rtsp: Some(true),
            ..Default::default()
        };
        let patch = GlobalConfig {
            log_level: Some("debug".into()),
            ..Default::default()
        };
        base.merge(&patch);
        assert_eq!(base.log_level.as_deref(), Some("debug"));
        assert_eq!(base.rtsp, Some(true));
    }

    #[test]
    fn merge_carries_unknown_keys() {
        let mut base = GlobalConfig::default();
        let mut patch = GlobalConfig::default();
        patch.extra.insert("playback".into(), json!(true));
        base.merge(&patch);
        assert_eq!(base.extra.get("playback"), Some(&json!(true)));
    }

    #[test]
    fn diff_of_identical_configs_is_empty() {
        let cfg = GlobalConfig {
            hls: Some(true),
            hls_segment_count: Some(7),
            ..Default::default()
        };
        assert!(cfg.diff(&cfg.clone()).is_empty());
    }

    #[test]
    fn diff_picks_changed_fields() {
        let base = GlobalConfig {
            hls: Some(true),
            hls_segment_count: Some(7),
            ..Default::default()
        };
        let mut edited = base.clone();
        edited.hls_segment_count = Some(10);
        let d = base.diff(&edited);
        assert_eq!(d.hls_segment_count, Some(10));
        assert_eq!(d.hls, None);
    }

    #[test]
    fn user_permissions() {
        let u = AuthInternalUser {
            user: "any".into(),
            permissions: vec![AuthPermission {
                action: AuthAction::Read,
                path: None,
            }],
            ..Default::default()
        };
        assert!(u.can(AuthAction::Read));
        assert!(!u.can(AuthAction::Publish));
    }
}
