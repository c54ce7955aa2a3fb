//! `watch` subcommand: drives a synchronizer and prints summaries.

use std::sync::Arc;
use std::time::Duration;

use mtxpanel_client::api::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE};
use mtxpanel_client::sync::{FetchState, Snapshot, SyncOptions, SyncState, Synchronizer};
use mtxpanel_client::{MediaMtxApi, Resource};
use mtxpanel_core::model::{PathInfo, Record, RtspConn};
use mtxpanel_core::stats::{
    HlsStats, RtmpStats, RtspSessionStats, SrtStats, Summary, TotalStats, WebRtcStats,
};
use serde::de::DeserializeOwned;

pub async fn run(api: &MediaMtxApi, resource: Resource, interval: Duration) -> anyhow::Result<()> {
    match resource {
        Resource::Paths => {
            watch(api, resource, interval, TotalStats::compute::<PathInfo>).await
        }
        Resource::RtmpConns => watch(api, resource, interval, RtmpStats::compute).await,
        Resource::RtspConns => {
            watch(api, resource, interval, TotalStats::compute::<RtspConn>).await
        }
        Resource::RtspSessions => watch(api, resource, interval, RtspSessionStats::compute).await,
        Resource::WebRtcSessions => watch(api, resource, interval, WebRtcStats::compute).await,
        Resource::SrtConns => watch(api, resource, interval, SrtStats::compute).await,
        Resource::HlsMuxers => watch(api, resource, interval, HlsStats::compute).await,
    }
}

async fn watch<T, S>(
    api: &MediaMtxApi,
    resource: Resource,
    interval: Duration,
    compute: impl Fn(&[T]) -> S + Send + Sync + 'static,
) -> anyhow::Result<()>
where
    T: DeserializeOwned + Record + PartialEq + Send + Sync + 'static,
    S: Summary + Send + Sync + 'static,
{
    let fetch = {
        let api = api.clone();
        move |base: String| {
            let api = api.at(&base);
            async move {
                api?.list::<T>(resource, DEFAULT_PAGE, DEFAULT_ITEMS_PER_PAGE)
                    .await
            }
        }
    };
    let sync = Synchronizer::spawn(fetch, api.base_url(), SyncOptions::new(interval, compute));
    let mut rx = sync.subscribe();

    eprintln!(
        "watching {} on {} every {} ms, Ctrl-C to stop",
        resource.label(),
        api.base_url(),
        interval.as_millis()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut view = WatchView::default();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                for event in view.observe(&state) {
                    match event {
                        Event::Failed(msg) => eprintln!("error: {msg}"),
                        Event::Recovered => {
                            eprintln!("recovered: {} reachable again", resource.label())
                        }
                        Event::Changed => {
                            print_summary(resource, state.stats.as_ref(), &state.data)
                        }
                    }
                }
            }
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
        }
    }

    sync.shutdown().await;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Failed(String),
    Recovered,
    Changed,
}

/// What the terminal has already been told about a synchronizer.
struct WatchView<T> {
    shown: Option<Snapshot<T>>,
    last_error: Option<String>,
}

impl<T> Default for WatchView<T> {
    fn default() -> Self {
        Self {
            shown: None,
            last_error: None,
        }
    }
}

impl<T> WatchView<T> {
    /// Lines to print for `state`. Repeated errors and unchanged snapshots print nothing.
    fn observe<S>(&mut self, state: &SyncState<T, S>) -> Vec<Event> {
        let mut events = Vec::new();
        match &state.status {
            FetchState::Loading => {}
            FetchState::Error(msg) => {
                if self.last_error.as_ref() != Some(msg) {
                    self.last_error = Some(msg.clone());
                    events.push(Event::Failed(msg.clone()));
                }
            }
            FetchState::Ready => {
                if self.last_error.take().is_some() {
                    events.push(Event::Recovered);
                }
                let fresh = self
                    .shown
                    .as_ref()
                    .map_or(true, |prev| !Arc::ptr_eq(prev, &state.data));
                if fresh {
                    self.shown = Some(Arc::clone(&state.data));
                    events.push(Event::Changed);
                }
            }
        }
        events
    }
}

fn print_summary<T: Record, S: Summary>(resource: Resource, stats: &S, items: &[T]) {
    println!("== {} ==", resource.label());
    for (label, value) in stats.rows() {
        println!("{label:>28}: {value}");
    }
    let ids: Vec<&str> = items.iter().map(Record::record_id).collect();
    if !ids.is_empty() {
        println!("{:>28}: {}", "Items", ids.join(", "));
    }
}
