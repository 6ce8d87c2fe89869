//! crud-table - browse and delete the records of one REST resource
//!
//! 1. Key events -> `App::handle_event()` -> `UiAction`s
//! 2. `UiAction`s call store intents, which start requests
//! 3. Request outcomes come back through `process_next()` and are mirrored
//!    into the table
//! 4. Store notifications drive the status line and dialogs
//!
//! # Usage
//!
//! ```sh
//! cargo run -p crud-table -- --base-url https://api.example.com api/users --columns id,name,email
//!
//! # Column schema from a JSON file, logs to a file
//! cargo run -p crud-table -- api/users --fields fields.json --log-file crud-table.log
//! ```

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crud_dispatch::{
    notify, DynamicStore, EventKind, FieldSchema, GridOptions, HttpConfig, HttpFetch,
    LoggingMiddleware, Notification, StoreAction, StoreConfig,
};
use crud_table::app::{schema_from_list, App};
use crud_table::poller::spawn_event_poller;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Terminal table over a REST resource
#[derive(Parser, Debug)]
#[command(name = "crud-table")]
#[command(about = "Browse and delete the records of a REST resource")]
struct Args {
    /// Resource route, e.g. `api/users` or `api/users?active=1`
    route: String,

    /// Prefix for relative routes
    #[arg(long, env = "CRUD_TABLE_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "CRUD_TABLE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Query parameter carrying the page number
    #[arg(long, default_value = "page")]
    page_param: String,

    /// Comma-separated fields to show
    #[arg(long, default_value = "id,name")]
    columns: String,

    /// JSON field schema; overrides --columns
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Rows per page before the first load
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Write logs here (filter with CRUD_TABLE_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Also log every store action before it is dispatched
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let fields = match &args.fields {
        Some(path) => serde_json::from_str::<FieldSchema>(&std::fs::read_to_string(path)?)?,
        None => schema_from_list(&args.columns),
    };

    let mut http = HttpConfig {
        base_url: args.base_url.clone(),
        bearer_token: args.token.clone(),
        ..HttpConfig::default()
    };
    if let Some(secs) = args.timeout {
        http = http.with_timeout(Duration::from_secs(secs));
    }
    let fetch = HttpFetch::new(&http)?;

    let (notify_tx, notifications) = notify::channel();
    let middleware = if args.verbose {
        LoggingMiddleware::verbose()
    } else {
        LoggingMiddleware::new()
    };
    let store = DynamicStore::with_parts(
        Arc::new(fetch),
        notify_tx,
        StoreConfig::default().with_page_param(args.page_param.clone()),
        middleware,
    );
    let options = GridOptions::default().with_page_size(args.page_size);

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let result = match App::new(
        store,
        &args.route,
        fields,
        options,
        Rect::new(0, 0, size.width, size.height),
    ) {
        Ok(app) => run_app(&mut terminal, app, notifications).await,
        Err(e) => Err(e.into()),
    };

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_env("CRUD_TABLE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

enum Step {
    Event(EventKind),
    Result(StoreAction),
    Note(Notification),
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EventKind>();
    let cancel_token = CancellationToken::new();

    let _handle = spawn_event_poller(
        event_tx,
        Duration::from_millis(10),
        Duration::from_millis(16),
        cancel_token.clone(),
    );

    app.start()?;
    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| app.render(frame))?;
            should_render = false;
        }

        let step = tokio::select! {
            Some(event) = event_rx.recv() => Step::Event(event),
            Some(action) = app.next_result() => Step::Result(action),
            Some(note) = notifications.recv() => Step::Note(note),
        };

        match step {
            Step::Event(event) => {
                for action in app.handle_event(&event) {
                    app.update(action)?;
                }
                // Cursor moves change the grid without emitting an action.
                should_render = true;
            }
            Step::Result(action) => {
                app.apply(&action)?;
                should_render = true;
            }
            Step::Note(note) => {
                app.notify(note);
                should_render = true;
            }
        }

        if app.should_quit() {
            break;
        }
    }

    cancel_token.cancel();
    Ok(())
}
