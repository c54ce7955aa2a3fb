#![forbid(unsafe_code)]

//! Network side of the MediaMTX control panel: the REST client, the polling
//! synchronizer and persisted panel settings.

pub mod api;
pub mod error;
pub mod settings;
pub mod sync;

pub use api::{ConnectionCounts, MediaMtxApi, Resource, DEFAULT_API_URL};
pub use error::ClientError;
pub use settings::{PanelSettings, SettingsError, SettingsStore, Theme};
pub use sync::{FetchState, Snapshot, SyncOptions, SyncState, Synchronizer};
