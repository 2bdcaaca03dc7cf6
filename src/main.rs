//! imgdock - local image cache with a terminal viewer
//!
//! Resolves remote image URLs to cached local files and shows them in a list
//! with a draggable cache panel that snaps to the nearest screen edge.

use std::io;
use std::panic;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use imgdock::app::{App, AppAction};
use imgdock::cache::ImageCache;
use imgdock::cli::{self, Cli, Command};
use imgdock::config::CacheConfig;
use imgdock::loader::{self, LoadHandle};
use imgdock::logging::{self, LogTarget};
use imgdock::ui;

/// Frame interval; keeps the snap animation smooth
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

/// Renders the list, then the dock and help overlays on top
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_image_list(frame, app);
    if app.show_dock {
        ui::render_dock(frame, app);
    }
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.cache_config(CacheConfig::from_env())?;
    let command = cli.command();

    let target = match command {
        Command::View { .. } => LogTarget::default_file(),
        _ => LogTarget::Stderr,
    };
    logging::init_logging(cli.verbose, &target)?;

    let cache = ImageCache::new(&config)?;
    let mut stdout = io::stdout();

    match command {
        Command::Fetch { urls } => cli::run_fetch(&cache, &urls, &mut stdout).await?,
        Command::Clear => cli::run_clear(&cache, &mut stdout).await?,
        Command::Stats { json } => cli::run_stats(&cache, json, &mut stdout).await?,
        Command::View { urls, urls_file } => {
            let urls = cli::view_urls(&urls, urls_file.as_deref())?;
            run_viewer(cache, urls).await?;
        }
    }

    Ok(())
}

async fn run_viewer(cache: ImageCache, urls: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    info!(count = urls.len(), cache_dir = ?cache.cache_dir(), "Starting viewer");

    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(urls.clone(), cache.allowed_host());
    let mut handle = LoadHandle::spawn(cache, urls);
    handle.refresh_stats();

    let result = event_loop(&mut terminal, &mut app, &mut handle).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &mut LoadHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_frame = Instant::now();

    loop {
        let size = terminal.size()?;
        let dock_size = ui::measure_dock(app);
        app.layout(size.width, size.height, dock_size);

        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                // Layout picks up the new size on the next frame
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        while let Some(message) = loader::try_recv(handle) {
            app.apply(message);
        }

        for action in app.take_actions() {
            match action {
                AppAction::Reload(index) => {
                    if let Some(entry) = app.entries.get(index) {
                        handle.reload(index, entry.url.clone());
                    }
                }
                AppAction::ClearCache => handle.clear(),
            }
        }

        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
