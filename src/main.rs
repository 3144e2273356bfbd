//! cheroterm - browse a cherosite board from the terminal
//!
//! A terminal UI application that pages through board sections, feeds and
//! saved posts, and lets a logged-in user vote, save, follow and post.

use std::io;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use cheroterm::app::App;
use cheroterm::cli::{Cli, StartupConfig};
use cheroterm::data::SiteClient;
use cheroterm::logging;
use cheroterm::ui;
use cheroterm::worker::WorkerHandle;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let StartupConfig {
        config,
        config_path,
    } = StartupConfig::from_cli(&cli)?;

    let log_path = config.log_path();
    logging::init(&config.log_level, log_path.as_deref())?;
    info!(
        config = %config_path.display(),
        base_url = %config.base_url,
        regions = config.regions.len(),
        "starting cheroterm"
    );

    let client = SiteClient::new(&config.base_url)?;
    let mut worker = WorkerHandle::new(client);
    let mut app = App::new(config.regions).with_viewer_id(config.user_id);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial render to show loading state
    terminal.draw(|f| ui::render(f, &app))?;

    // First page of every region, fetched concurrently
    app.load_all();
    let initial = app.take_requests();
    for response in worker.execute_all(initial).await {
        app.apply(response);
    }

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        for request in app.take_requests() {
            worker.spawn(request);
        }
        while let Some(response) = worker.try_recv() {
            app.apply(response);
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    info!("shutting down");

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
