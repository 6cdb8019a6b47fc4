use anyhow::Result;

mod api;
mod app;
mod clipboard;
mod config;
mod dictation;
mod handler;
mod parser;
mod tui;
mod ui;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }

        // Fold finished background work into the app state; the tick
        // event keeps this loop turning while a request is in flight
        app.poll_response().await;
        app.poll_dictation().await;
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file under the platform data dir; the terminal belongs to
/// the UI. Logging is best-effort and silently disabled when the dir is
/// unavailable.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("botica")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("botica.log")) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .try_init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "botica starting");
}
