use anyhow::Result;
use clap::Parser;
use rokobot_core::Config;

mod app;
mod cli;
mod handler;
mod keyboard;
mod logging;
mod tui;
mod ui;

use app::App;
use cli::Cli;
use tui::{EventHandler, TICK_RATE};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.resolve(Config::load(), |key| std::env::var(key).ok());

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = logging::init(&Config::data_dir()?, &config.log_level)?;
    tracing::info!(endpoint = %config.endpoint, pacing_ms = config.pacing_ms, "starting rokobot");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(&config);
    let result = run(&mut terminal, &mut app).await;

    app.shutdown();
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await,
            None => break,
        }
    }

    Ok(())
}
