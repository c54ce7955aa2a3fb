#![forbid(unsafe_code)]

//! mtxpanelctl: command-line control panel for a MediaMTX server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use mtxpanel_client::api::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE};
use mtxpanel_client::{ClientError, MediaMtxApi, PanelSettings, Resource, SettingsStore};
use mtxpanel_core::{Classify, GlobalConfig, PathConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod watch;

#[derive(Parser, Debug)]
#[command(name = "mtxpanelctl")]
struct Args {
    /// MediaMTX API base URL, e.g. http://localhost:9997. Defaults to the saved setting.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Settings file. Defaults to ~/.config/mtxpanel/settings.toml.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level (env-filter syntax).
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    Settings {
        #[command(subcommand)]
        settings: SettingsCmd,
    },
    #[command(flatten)]
    Remote(RemoteCmd),
}

/// Commands that talk to the MediaMTX API.
#[derive(Subcommand, Debug)]
enum RemoteCmd {
    /// Server version and start time.
    Info,
    Config {
        #[command(subcommand)]
        config: ConfigCmd,
    },
    Paths {
        #[command(subcommand)]
        paths: PathsCmd,
    },
    /// One page of a collection, as JSON.
    List {
        resource: Resource,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_ITEMS_PER_PAGE)]
        items_per_page: u32,
    },
    /// Kick an RTSP session.
    Kick {
        #[arg(long)]
        id: String,
    },
    /// Count connections across every protocol.
    Check,
    /// Poll a collection and print its summary whenever it changes.
    Watch {
        resource: Resource,
        /// Poll interval in milliseconds. Defaults to the saved refresh interval.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    Get,
    /// Apply a sparse JSON patch to the global configuration.
    Patch {
        #[arg(long)]
        file: PathBuf,
    },
    /// Re-apply the current global configuration.
    Reload,
}

#[derive(Subcommand, Debug)]
enum PathsCmd {
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_ITEMS_PER_PAGE)]
        items_per_page: u32,
    },
    Add {
        #[arg(long)]
        name: String,
        /// JSON path configuration. Omit for server defaults.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Patch {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCmd {
    Show,
    SetApiUrl {
        url: String,
    },
    ToggleTheme,
    SetRefresh {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        ms: u64,
    },
    Notifications {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = SettingsStore::new(args.settings.unwrap_or_else(SettingsStore::default_path));

    match args.cmd {
        Cmd::Settings { settings } => run_settings(&store, settings),
        Cmd::Remote(cmd) => run_remote(cmd, args.api_url, &store).await,
    }
}

async fn run_remote(
    cmd: RemoteCmd,
    api_url: Option<String>,
    store: &SettingsStore,
) -> anyhow::Result<()> {
    let saved = store.load().context("load settings")?;
    let api_url = api_url.unwrap_or_else(|| saved.api_url.clone());
    let api = MediaMtxApi::new(&api_url).map_err(describe)?;
    tracing::debug!(api_url = %api.base_url(), "using MediaMTX API");

    match cmd {
        RemoteCmd::Info => print_json(&api.server_info().await.map_err(describe)?)?,
        RemoteCmd::Config { config } => match config {
            ConfigCmd::Get => print_json(&api.global_config().await.map_err(describe)?)?,
            ConfigCmd::Patch { file } => {
                let patch: GlobalConfig = read_json(&file).await?;
                if patch.is_empty() {
                    anyhow::bail!("{} contains no configuration fields", file.display());
                }
                api.patch_global_config(&patch).await.map_err(describe)?;
                println!("global configuration patched");
            }
            ConfigCmd::Reload => {
                api.reload_configuration().await.map_err(describe)?;
                println!("configuration reloaded");
            }
        },
        RemoteCmd::Paths { paths } => match paths {
            PathsCmd::List {
                page,
                items_per_page,
            } => print_json(&api.paths(page, items_per_page).await.map_err(describe)?)?,
            PathsCmd::Add { name, file } => {
                let cfg = match file {
                    Some(file) => read_json::<PathConfig>(&file).await?,
                    None => PathConfig::default(),
                };
                api.add_path(&name, &cfg).await.map_err(describe)?;
                println!("path {name} added");
            }
            PathsCmd::Patch { name, file } => {
                let cfg: PathConfig = read_json(&file).await?;
                api.patch_path(&name, &cfg).await.map_err(describe)?;
                println!("path {name} updated");
            }
            PathsCmd::Delete { name } => {
                api.delete_path(&name).await.map_err(describe)?;
                println!("path {name} deleted");
            }
        },
        RemoteCmd::List {
            resource,
            page,
            items_per_page,
        } => {
            let items: Vec<Value> = api
                .list(resource, page, items_per_page)
                .await
                .map_err(describe)?;
            print_json(&items)?;
        }
        RemoteCmd::Kick { id } => {
            api.kick_rtsp_session(&id).await.map_err(describe)?;
            println!("session {id} kicked");
        }
        RemoteCmd::Check => {
            let counts = api.check_all_connections().await.map_err(describe)?;
            print_json(&serde_json::json!({ "counts": counts, "total": counts.total() }))?;
        }
        RemoteCmd::Watch {
            resource,
            interval_ms,
        } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| saved.polling_interval());
            watch::run(&api, resource, interval).await?;
        }
    }

    Ok(())
}

fn run_settings(store: &SettingsStore, cmd: SettingsCmd) -> anyhow::Result<()> {
    let settings: PanelSettings = match cmd {
        SettingsCmd::Show => store.load(),
        SettingsCmd::SetApiUrl { url } => store.update(|s| s.set_api_url(&url)),
        SettingsCmd::ToggleTheme => store.update(|s| {
            s.toggle_theme();
            Ok(())
        }),
        SettingsCmd::SetRefresh { ms } => store.update(|s| s.set_auto_refresh_interval(ms)),
        SettingsCmd::Notifications { enabled } => store.update(|s| {
            s.notifications_enabled = enabled;
            Ok(())
        }),
    }
    .with_context(|| format!("settings file {}", store.path().display()))?;
    print_json(&settings)
}

/// Attaches the operator-facing message to a client failure.
fn describe(e: ClientError) -> anyhow::Error {
    let message = e.classify().user_message();
    anyhow::Error::new(e).context(message)
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
