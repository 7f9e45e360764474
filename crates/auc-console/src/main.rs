mod push;
mod state;
mod theme;
mod ui;

use auc_api::{AdminApi, ApiError};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::state::{AdminAction, App, LoadRequest, NetOutcome};

const DASHBOARD_REFRESH_SECS: u64 = 30;
const NOTICE_TICK_MS: u64 = 1000;

/// Terminal console for the angel update service admin API.
#[derive(Parser, Debug)]
#[command(name = "auc", version, about)]
struct Args {
    /// Base URL of the admin backend.
    #[arg(long, env = "AUC_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// Initial log level filter for the logs section.
    #[arg(long, default_value = "INFO")]
    log_level: String,

    /// Maximum log entries fetched and retained.
    #[arg(long, default_value_t = 100)]
    log_limit: usize,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("AUC_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    );
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging();

    let api = Arc::new(AdminApi::new(&args.base_url)?);
    let push_endpoint = api.push_endpoint()?;

    let (push_tx, mut push_rx) = mpsc::channel(256);
    tokio::spawn(async move {
        push::push_loop(push_endpoint, push_tx).await;
    });
    let (net_tx, mut net_rx) = mpsc::channel::<NetOutcome>(256);

    let mut app = App::new(args.log_level, args.log_limit);
    app.activate(state::Section::Dashboard);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventStream::new();
    let mut refresh_ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_secs(DASHBOARD_REFRESH_SECS),
        Duration::from_secs(DASHBOARD_REFRESH_SECS),
    );
    let mut notice_ticker = tokio::time::interval(Duration::from_millis(NOTICE_TICK_MS));

    loop {
        for load in app.take_queued_loads() {
            spawn_load(
                Arc::clone(&api),
                load,
                app.log_level.clone(),
                app.log_limit,
                net_tx.clone(),
            );
        }
        for action in app.take_queued_actions() {
            spawn_action(Arc::clone(&api), action, net_tx.clone());
        }

        terminal.draw(|frame| ui::render(frame, &mut app))?;
        if app.should_quit {
            break;
        }

        tokio::select! {
            _ = refresh_ticker.tick() => {
                app.on_refresh_tick();
            }
            _ = notice_ticker.tick() => {
                app.prune_notices(Utc::now());
            }
            Some(signal) = push_rx.recv() => {
                app.apply_push_signal(signal);
            }
            Some(outcome) = net_rx.recv() => {
                app.apply_net_outcome(outcome);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => app.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => warn!("terminal_event_error: {err}"),
                    None => break,
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_load(
    api: Arc<AdminApi>,
    load: LoadRequest,
    log_level: String,
    log_limit: usize,
    tx: mpsc::Sender<NetOutcome>,
) {
    tokio::spawn(async move {
        let outcome = match load {
            LoadRequest::DashboardStats => NetOutcome::DashboardStats(api.dashboard_stats().await),
            LoadRequest::RecentActivity => NetOutcome::RecentActivity(api.recent_activity().await),
            LoadRequest::Collectors => NetOutcome::Collectors(api.collectors().await),
            LoadRequest::Content => NetOutcome::Content(api.content().await),
            LoadRequest::CacheStats => NetOutcome::CacheStats(api.cache_stats().await),
            LoadRequest::Logs => NetOutcome::Logs(api.logs(&log_level, log_limit).await),
        };
        let _ = tx.send(outcome).await;
    });
}

fn spawn_action(api: Arc<AdminApi>, action: AdminAction, tx: mpsc::Sender<NetOutcome>) {
    tokio::spawn(async move {
        let result = run_action(&api, &action).await;
        let _ = tx.send(NetOutcome::Action { action, result }).await;
    });
}

async fn run_action(api: &AdminApi, action: &AdminAction) -> Result<(), ApiError> {
    match action {
        AdminAction::RunCollector(name) => api.run_collector(name).await,
        AdminAction::EnableCollector(name) => api.enable_collector(name).await,
        AdminAction::DisableCollector(name) => api.disable_collector(name).await,
        AdminAction::ClearCache => api.clear_cache().await,
        AdminAction::Upload(request) => {
            let bytes = tokio::fs::read(&request.file_path)
                .await
                .map_err(|err| ApiError::Transport(format!("read {}: {err}", request.file_path)))?;
            api.upload_content(request.clone().into_payload(bytes)).await
        }
    }
}
