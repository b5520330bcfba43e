mod action;
mod app;
mod backend;
mod config;
mod cursor;
mod engine;
mod error;
mod event;
mod http;
mod search;
mod state;
mod tui;
mod types;
mod ui;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::backend::SearchBackend;
use crate::config::Config;
use crate::engine::{Completion, PageRequest, Pager};
use crate::error::ScoutError;
use crate::event::Event;
use crate::http::HttpBackend;
use crate::tui::EventHandler;
use crate::types::SearchResult;

/// Search GitHub users and jump to any page of the results
#[derive(Debug, Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Search query to run on startup
    query: Option<String>,

    /// Page to open
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Base URL of the search API (overrides config and SCOUT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Print the requested page as JSON instead of starting the TUI
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PageOutput<'a> {
    query: &'a str,
    page: u32,
    total_pages: u32,
    result: &'a SearchResult,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load();
    config.apply_api_url(cli.api_url.clone());
    let backend: Arc<dyn SearchBackend> = Arc::new(HttpBackend::new(&config.api)?);

    let initial = cli
        .query
        .as_deref()
        .map(|q| PageRequest::new(q, cli.page))
        .transpose()?;

    if cli.json {
        let request = initial.ok_or_else(|| {
            ScoutError::Validation("--json needs a query to search for".to_string())
        })?;
        return print_page(backend, request).await;
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(backend, initial).await;

    tui::restore()?;

    result
}

/// Load one page without a terminal and write it to stdout
async fn print_page(
    backend: Arc<dyn SearchBackend>,
    request: PageRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel();
    let mut pager = Pager::new(backend, completion_tx);
    pager.set_request(request.clone());
    pager.settle(&mut completion_rx).await;

    let view = pager.view();
    if let Some(message) = view.last_error {
        return Err(ScoutError::Transport(message.to_string()).into());
    }
    let Some(result) = view.result else {
        return Err(ScoutError::Transport("search returned no result".to_string()).into());
    };

    let output = PageOutput {
        query: &request.query,
        page: view.current_page,
        total_pages: result.total_pages(),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    backend: Arc<dyn SearchBackend>,
    initial: Option<PageRequest>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<Completion>();

    let mut app = App::new(Pager::new(backend, completion_tx));
    if let Some(request) = initial {
        app.pager.set_request(request);
    }

    let tick_rate = Duration::from_millis(120);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
            Some(completion) = completion_rx.recv() => {
                app.update(Action::SearchCompleted(completion));
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
