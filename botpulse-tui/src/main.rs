/// Botpulse terminal dashboard
///
/// Logs in against the bot's REST API, spawns the data-sync loop, and renders
/// the live dashboard until the user quits or the session expires.
use std::{
    error::Error,
    io::{self, Write},
    sync::Arc,
    time::{Duration, Instant},
};

use botpulse_client::{
    spawn_data_sync, ClientConfig, RestApi, SessionEvent, SessionGateway, Timeframe,
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod ui;

use app::App;

/// Log to a file so tracing output never corrupts the alternate screen.
fn init_tracing() -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create("botpulse-tui.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Credential acquisition: environment first, interactive prompt otherwise.
///
/// Rejected credentials and network faults surface as the same generic
/// message; the gateway logs the real cause.
async fn login_flow(gateway: &SessionGateway) -> Result<bool, Box<dyn Error>> {
    if let (Ok(username), Ok(password)) = (
        std::env::var("BOTPULSE_USERNAME"),
        std::env::var("BOTPULSE_PASSWORD"),
    ) {
        let ok = gateway.login(&username, &password).await;
        if !ok {
            eprintln!("Invalid credentials");
        }
        return Ok(ok);
    }

    for _ in 0..3 {
        print!("Username: ");
        io::stdout().flush()?;
        let mut username = String::new();
        io::stdin().read_line(&mut username)?;

        print!("Password: ");
        io::stdout().flush()?;
        let mut password = String::new();
        io::stdin().read_line(&mut password)?;

        if gateway.login(username.trim(), password.trim()).await {
            return Ok(true);
        }
        eprintln!("Invalid credentials");
    }
    Ok(false)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing()?;

    let config = ClientConfig::default();
    info!("starting botpulse dashboard against {}", config.api_url);
    let gateway = Arc::new(SessionGateway::new(&config)?);

    if !gateway.is_authenticated() && !login_flow(&gateway).await? {
        std::process::exit(1);
    }

    let api = Arc::new(RestApi::new(Arc::clone(&gateway)));
    let sync = spawn_data_sync(api, Timeframe::All, config.refresh_interval);
    let session_events = gateway.subscribe();

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let expired = run_dashboard(&mut terminal, App::new(sync), session_events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if expired? {
        // The sync loop already stopped before this point; this is the
        // login-surface redirect for a terminal client
        println!("Session expired, please log in again.");
    }
    Ok(())
}

/// Main render/input loop. Returns `true` when the session expired.
fn run_dashboard(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    session_events: watch::Receiver<SessionEvent>,
) -> Result<bool, Box<dyn Error>> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    let snapshot = app.sync.snapshot();
    terminal.draw(|f| ui::render(f, &app, &snapshot))?;

    loop {
        if *session_events.borrow() == SessionEvent::Expired {
            app.sync.shutdown();
            return Ok(true);
        }

        if last_tick.elapsed() >= tick_rate {
            let snapshot = app.sync.snapshot();
            terminal.draw(|f| ui::render(f, &app, &snapshot))?;
            last_tick = Instant::now();
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if app.should_quit {
            app.sync.shutdown();
            return Ok(false);
        }
    }
}
