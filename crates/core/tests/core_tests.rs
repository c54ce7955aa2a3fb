//! Integration tests for the core crate.

use mtxpanel_core::model::{
    HlsMuxer, ListBody, PathConfig, PathInfo, PathSource, Record, RtmpConn, SessionState,
    SourceRef,
};
use mtxpanel_core::GlobalConfig;
use serde_json::json;

#[test]
fn test_session_state_serde() {
    let publish = SessionState::Publish;
    let serialized = serde_json::to_string(&publish).unwrap();
    assert_eq!(serialized, r#""publish""#);
    let deserialized: SessionState = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, publish);
}

#[test]
fn test_list_body_paged() {
    let raw = json!({
        "pageCount": 1,
        "itemCount": 2,
        "items": [
            { "id": "a", "remoteAddr": "10.0.0.1:5000", "state": "publish", "path": "cam", "bytesReceived": 10, "bytesSent": 0 },
            { "id": "b", "remoteAddr": "10.0.0.2:5000", "state": "read", "path": "cam", "bytesReceived": 0, "bytesSent": 10 }
        ]
    });
    let body: ListBody<RtmpConn> = serde_json::from_value(raw).unwrap();
    let items = body.into_items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].record_id(), "a");
    assert_eq!(items[1].state, SessionState::Read);
}

#[test]
fn test_list_body_bare() {
    let raw = json!([{ "path": "cam", "sourceReady": true, "segmentCount": 3, "bytesSent": 100 }]);
    let body: ListBody<HlsMuxer> = serde_json::from_value(raw).unwrap();
    let items = body.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record_id(), "cam");
}

#[test]
fn test_list_body_missing_items() {
    let body: ListBody<RtmpConn> =
        serde_json::from_value(json!({ "pageCount": 0, "itemCount": 0 })).unwrap();
    assert!(body.into_items().is_empty());
}

#[test]
fn test_unknown_record_fields_count_for_equality() {
    let a: RtmpConn = serde_json::from_value(json!({ "id": "a", "custom": 1 })).unwrap();
    let b: RtmpConn = serde_json::from_value(json!({ "id": "a", "custom": 2 })).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_path_source_both_shapes() {
    let bare: PathSource = serde_json::from_value(json!("publisher")).unwrap();
    assert_eq!(bare, PathSource::bare("publisher"));
    assert_eq!(bare.kind(), None);
    assert_eq!(serde_json::to_value(&bare).unwrap(), json!("publisher"));

    let structured: PathSource =
        serde_json::from_value(json!({ "type": "rtspSession", "id": "abc" })).unwrap();
    assert_eq!(structured.kind(), Some("rtspSession"));
    assert_eq!(structured.id(), "abc");
    assert_eq!(
        serde_json::to_value(&structured).unwrap(),
        json!({ "type": "rtspSession", "id": "abc" })
    );
}

#[test]
fn test_path_info_with_null_source() {
    let raw = json!({
        "name": "cam",
        "confName": "all_others",
        "source": null,
        "ready": false,
        "tracks": [],
        "readers": [{ "type": "hlsMuxer", "id": "" }]
    });
    let info: PathInfo = serde_json::from_value(raw).unwrap();
    assert_eq!(info.source, None);
    assert_eq!(
        info.readers,
        vec![SourceRef {
            kind: "hlsMuxer".into(),
            id: String::new()
        }]
    );
}

#[test]
fn test_path_config_sparse_serialisation() {
    let cfg = PathConfig {
        name: Some("cam".into()),
        source: Some("rtsp://10.0.0.5/stream".into()),
        record: Some(false),
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&cfg).unwrap(),
        json!({ "name": "cam", "source": "rtsp://10.0.0.5/stream", "record": false })
    );
}

#[test]
fn test_global_config_passes_unknown_fields_through() {
    let raw = json!({
        "logLevel": "info",
        "rtspEncryption": "no",
        "webrtcIPsFromInterfaces": true,
        "authJWTInHTTPQuery": false,
        "authInternalUsers": [
            { "user": "any", "pass": "", "ips": [], "permissions": [{ "action": "publish" }, { "action": "read", "path": "cam" }] }
        ],
        "playbackAddress": ":9996"
    });
    let cfg: GlobalConfig = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(cfg.webrtc_ips_from_interfaces, Some(true));
    assert_eq!(cfg.extra.get("playbackAddress"), Some(&json!(":9996")));
    assert_eq!(serde_json::to_value(&cfg).unwrap(), raw);
}

#[test]
fn test_global_config_patch_body_is_sparse() {
    let base: GlobalConfig =
        serde_json::from_value(json!({ "logLevel": "info", "hls": true, "srt": true })).unwrap();
    let mut edited = base.clone();
    edited.log_level = Some("debug".into());
    let patch = base.diff(&edited);
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "logLevel": "debug" }));
}
