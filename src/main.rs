//! HalalNest - a terminal merchant dashboard for the HalalNest marketplace.
//!
//! Shows sales figures and lets a merchant manage products, orders and
//! categories against the HalalNest REST API.

mod api;
mod app;
mod config;
mod error;
mod events;
mod logging;
mod session;
mod tasks;
mod tui;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::api::HalalNestClient;
use crate::app::App;
use crate::config::Config;
use crate::events::EventHandler;
use crate::session::Session;
use crate::tasks::create_task_channel;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "halalnest", version, about)]
struct Args {
    /// Profile to use instead of the configured default.
    #[arg(short, long)]
    profile: Option<String>,

    /// Rows per table page.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Path to an alternative config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = run(args);
    if let Err(e) = &result {
        error!(error = %e, "Exiting with error");
    }
    logging::shutdown();
    result
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    if let Some(page_size) = args.page_size {
        config.settings.page_size = page_size as usize;
    }

    let profile = config.resolve_profile(args.profile.as_deref())?;
    profile.validate()?;
    info!(profile = %profile.name, url = %profile.url, "Using profile");

    let client = HalalNestClient::from_profile(&profile)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    let _runtime_guard = runtime.enter();

    let (mut rx, spawner) = create_task_channel();
    let mut app = App::new(Session::from_profile(&profile), &config.settings)
        .with_backend(client, spawner);

    let mut terminal = tui::init().context("failed to set up the terminal")?;
    app.load_all();

    let events = EventHandler::new();
    let result = (|| -> anyhow::Result<()> {
        while !app.should_quit() {
            terminal.draw(|frame| app.view(frame))?;
            let event = events.next()?;
            app.update(event);
            while let Ok(message) = rx.try_recv() {
                app.handle_api_message(message);
            }
        }
        Ok(())
    })();

    tui::restore().context("failed to restore the terminal")?;
    result
}
