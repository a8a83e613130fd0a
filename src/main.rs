mod action;
mod app;
mod bitbucket;
mod cli;
mod config;
mod error;
mod event;
mod fetch_guard;
mod focus;
mod forge;
mod list;
mod markdown;
mod runtime;
mod scroll;
mod text;
mod tui;
mod types;
mod ui;
mod view;

use std::fs::File;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::bitbucket::Bitbucket;
use crate::cli::Cli;
use crate::config::Config;
use crate::event::Event;
use crate::forge::Forge;
use crate::runtime::{Runtime, SystemOpener};
use crate::tui::EventHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    init_logging(config.log_path().as_deref())?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let forge: Arc<dyn Forge> = Arc::new(Bitbucket::new(&config)?);
    info!(
        forge = forge.name(),
        workspace = %config.workspace,
        repo = %config.repo,
        project = config.project.as_deref().unwrap_or("-"),
        "starting"
    );

    let result = run(forge).await;

    tui::restore()?;

    result
}

/// Log to `log_file`, creating its directory if needed. Without a file,
/// logs are discarded since the UI owns the terminal. `RUST_LOG` sets the
/// filter; the default only shows warnings.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = File::options().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
            .init(),
    }
    Ok(())
}

async fn run(forge: Arc<dyn Forge>) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let runtime = Runtime::new(forge, Arc::new(SystemOpener), action_tx.clone());
    let mut app = App::new();

    // Lay the panes out before the first frame.
    let (width, height) = crossterm::terminal::size()?;
    let action = app.handle_event(Event::Resize(width, height));
    app.update(action);

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    let mut running = true;
    while running {
        tokio::select! {
            Some(event) = events.next() => {
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
                for command in app.update(action) {
                    if !runtime.execute(command) {
                        running = false;
                    }
                }
            }
        }
    }

    Ok(())
}
