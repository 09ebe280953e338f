mod action;
mod api;
mod app;
mod app_state;
mod component;
mod components;
mod event_source;
mod focus;
mod playback;
mod radio_directory;
mod route;
mod shell;
#[cfg(test)]
mod test_support;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use euphonium_proto::config::Config;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::app::{App, AppContext};
use crate::event_source::EventSource;
use crate::radio_directory::RadioDirectory;
use crate::route::Route;

/// Terminal control panel for a Euphonium audio device.
#[derive(Parser, Debug)]
#[command(name = "euphonium")]
#[command(version)]
struct Args {
    /// Device base URL (overrides `service.base_url` from the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Route to open, e.g. `/web/plugin/cspot` or `/web/apps/webradio`
    #[arg(short, long)]
    route: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = euphonium_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("panel.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise debug for the panel with the HTTP stack quiet.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("euphonium log: {}", log_path.display());

    tracing::info!("euphonium panel starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = args.url {
        config.service.base_url = url;
    }
    tracing::info!("device at {}", config.service.base_url);

    let api = ApiClient::new(config.service.clone());
    let radio = RadioDirectory::new(api.http().clone(), config.radio_browser.clone());
    let events = EventSource::connect(
        api.http().clone(),
        api.events_url(),
        config.events.reconnect_delay(),
        CancellationToken::new(),
    );

    let start_route = Route::parse(args.route.as_deref().unwrap_or(&config.ui.start_route));

    let app = App::new(AppContext {
        api,
        radio,
        events,
        start_route,
        log_path,
        compact_width: config.ui.compact_width,
    });

    if let Err(e) = app.run().await {
        tracing::error!("panel exited with error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
