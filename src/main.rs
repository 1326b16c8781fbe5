/*
* Newsdesk - A terminal dashboard for a news backend
*
* Shows live headlines and the backend's user directory in the terminal,
* refreshed on a timer, with signup/login, a persisted theme preference and
* a looping playlist of promo videos handed to an external player.
*/

use std::{
    env, fs,
    fs::OpenOptions,
    io::stdout,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use color_eyre::{eyre::Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use directories::BaseDirs;
use ratatui::layout::Rect;
use ratatui::Terminal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tui_input::{backend::crossterm::EventHandler, Input};

use newsdesk::api::Backend;
use newsdesk::models::LoginRequest;
use newsdesk::player::VideoPlayer;
use newsdesk::tui::app::DEFAULT_COUNTRY;
use newsdesk::tui::ui::{self, Theme};
use newsdesk::tui::{self, App, Mode};

// Constants for file paths and configuration
const APP_NAME: &str = "newsdesk";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "newsdesk.log";

/// Newsdesk: a terminal dashboard for a news backend - live headlines with
/// country/category filters, the user directory, signup/login, and a looping
/// video playlist.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// Country code for news fetches (e.g. in, us, gb)
    #[arg(long = "country", short = 'c')]
    country: Option<String>,

    /// Start with a news category filter applied (e.g. sports)
    #[arg(long = "category", short = 'g')]
    category: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard (the default when no command is given)
    Tui,

    /// Write backend endpoints and defaults into the configuration file
    Setup {
        /// News fetch endpoint
        #[arg(long = "news-url")]
        news_url: Option<String>,

        /// News keyword-search endpoint
        #[arg(long = "search-url")]
        search_url: Option<String>,

        /// Users endpoint (also the base for /signup and /login)
        #[arg(long = "users-url")]
        users_url: Option<String>,

        /// Default country code
        #[arg(long = "country")]
        country: Option<String>,

        /// Data refresh period in seconds
        #[arg(long = "refresh-secs")]
        refresh_secs: Option<u64>,
    },

    /// Restore the default configuration
    Reset,
}

/// Application configuration structure
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
struct Config {
    news_url: String,
    news_search_url: String,
    users_url: String,
    country: String,
    refresh_secs: u64,
    theme: String,
    playlist: Vec<String>,
    player_command: String,
    autoplay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_url: "http://localhost:8080/api/news/fetch-latest".to_string(),
            news_search_url: "http://localhost:8080/api/news/search".to_string(),
            users_url: "http://localhost:8080/api/users".to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            refresh_secs: 60,
            theme: "light".to_string(),
            playlist: vec![
                "video1.mp4".to_string(),
                "video2.mp4".to_string(),
                "video3.mp4".to_string(),
                "video4.mp4".to_string(),
            ],
            player_command: "mpv".to_string(),
            autoplay: true,
        }
    }
}

/// Find or create the application's configuration directory
fn get_config_dir() -> Result<PathBuf> {
    if let Some(base_dirs) = BaseDirs::new() {
        let config_dir = base_dirs.config_dir().join(APP_NAME);
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).wrap_err_with(|| {
                format!("Could not create configuration directory: {:?}", config_dir)
            })?;
        }
        Ok(config_dir)
    } else {
        let fallback = env::current_dir()?.join(".config").join(APP_NAME);
        fs::create_dir_all(&fallback)?;
        Ok(fallback)
    }
}

/// Read a configuration file, or return the defaults when it is missing
fn read_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let config_content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read configuration file: {:?}", path))?;

        let config: Config =
            toml::from_str(&config_content).wrap_err("Could not parse configuration")?;

        Ok(config)
    } else {
        Ok(Config::default())
    }
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    let toml_string = toml::to_string(config).wrap_err("Could not serialize configuration")?;

    fs::write(path, toml_string)
        .wrap_err_with(|| format!("Could not save configuration: {:?}", path))?;

    Ok(())
}

/// Load configuration or return default configuration
fn load_config() -> Result<Config> {
    read_config(&get_config_dir()?.join(CONFIG_FILE))
}

/// Save configuration to file
fn save_config(config: &Config) -> Result<()> {
    write_config(&get_config_dir()?.join(CONFIG_FILE), config)
}

/// Route tracing output to a file in the config directory; the terminal
/// itself belongs to the dashboard.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_dir.join(LOG_FILE))
        .wrap_err("Could not open the log file")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Issue a news fetch for the current filter state
fn refresh_news(app: &mut App, backend: &Backend) {
    let seq = app.begin_news_fetch();
    backend.fetch_news(
        seq,
        app.country.clone(),
        app.selected_category().map(str::to_string),
    );
}

/// Issue a users fetch
fn refresh_users(app: &mut App, backend: &Backend) {
    let seq = app.begin_users_fetch();
    backend.fetch_users(seq);
}

/// Persist the applied theme. A write failure downgrades to a warning; the
/// session keeps the toggled theme either way.
fn persist_theme(theme: Theme) {
    let result = load_config().and_then(|mut config| {
        config.theme = theme.as_config_str().to_string();
        save_config(&config)
    });
    if let Err(err) = result {
        warn!(%err, "could not persist theme preference");
    }
}

/// Run the TUI application
fn run_tui(cli: &Cli) -> Result<()> {
    let config_dir = get_config_dir()?;
    init_logging(&config_dir)?;

    let mut config = load_config()?;
    if let Some(country) = &cli.country {
        config.country = country.clone();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;

    // Create a terminal instance
    let backend_term = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    // Create event handler; backend fetch tasks report through its channel
    let tick_rate = Duration::from_millis(250);
    let event_handler = tui::event::EventHandler::new(tick_rate);

    let backend = Backend::new(
        config.news_url.clone(),
        config.news_search_url.clone(),
        config.users_url.clone(),
        event_handler.sender(),
    )
    .wrap_err("Could not start the backend client")?;

    // Create app state
    let mut app = App::new();
    app.init();
    app.country = config.country.clone();
    app.refresh_interval = Duration::from_secs(config.refresh_secs.max(1));
    app.theme = Theme::from_config_str(&config.theme).unwrap_or(Theme::Light);
    app.player = VideoPlayer::new(config.playlist.clone(), config.player_command.clone());
    if let Some(category) = &cli.category {
        if !app.set_category(category) {
            app.status_message = format!("Unknown category: {}", category);
        }
    }

    info!(country = %app.country, "starting dashboard");

    // Initial load; afterwards the refresh timer takes over
    refresh_news(&mut app, &backend);
    refresh_users(&mut app, &backend);
    if config.autoplay {
        app.player.start();
    }

    // Main loop
    while app.running {
        // Draw UI
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        // Handle events
        match event_handler.receiver.recv() {
            Ok(tui::event::Event::Key(key_event)) => {
                handle_key_event(&mut app, &backend, key_event);
            }
            Ok(tui::event::Event::Mouse(mouse_event)) => {
                let size = terminal.size()?;
                handle_mouse_event(&mut app, mouse_event, size);
            }
            Ok(tui::event::Event::Resize(_, _)) => {}
            Ok(tui::event::Event::Tick) => {
                app.tick();

                if app.refresh_due(Instant::now()) {
                    info!("refreshing news and users");
                    refresh_news(&mut app, &backend);
                    refresh_users(&mut app, &backend);
                }

                if let Some(source) = app.player.poll() {
                    app.status_message = format!("Now playing {}", source);
                }
            }
            Ok(tui::event::Event::News { seq, result }) => app.apply_news(seq, result),
            Ok(tui::event::Event::Users { seq, result }) => app.apply_users(seq, result),
            Ok(tui::event::Event::Signup(result)) => {
                if app.apply_signup(result) {
                    refresh_users(&mut app, &backend);
                }
            }
            Ok(tui::event::Event::Login(result)) => app.apply_login(result),
            Err(_) => {
                app.running = false;
            }
        }
    }

    // Restore terminal
    app.player.stop();
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.backend_mut().execute(DisableMouseCapture)?;

    Ok(())
}

/// Dispatch a key event according to the current mode
fn handle_key_event(app: &mut App, backend: &Backend, key_event: KeyEvent) {
    // The alert overlay swallows all input until it is dismissed.
    if app.alert.is_some() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }

    match app.mode {
        Mode::Normal => match key_event.code {
            KeyCode::Char('q') => {
                app.running = false;
            }
            KeyCode::Char('?') => {
                app.mode = Mode::Help;
            }
            KeyCode::Tab => {
                app.tabs.next();
            }
            KeyCode::BackTab => {
                app.tabs.previous();
            }
            KeyCode::Char('t') => {
                let theme = app.toggle_theme();
                persist_theme(theme);
            }
            KeyCode::Char('s') => {
                app.mode = Mode::Signup;
            }
            KeyCode::Char('l') => {
                app.mode = Mode::Login;
            }
            _ => {
                // Handle different tabs
                match app.tabs.index {
                    0 => handle_news_tab_events(app, backend, key_event.code),
                    1 => handle_users_tab_events(app, key_event.code),
                    _ => {}
                }
            }
        },
        Mode::Signup => handle_signup_events(app, backend, key_event),
        Mode::Login => handle_login_events(app, backend, key_event),
        Mode::Search => handle_search_events(app, backend, key_event),
        Mode::Help => match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                app.mode = Mode::Normal;
            }
            _ => {}
        },
    }
}

/// Handle key events for the news tab
fn handle_news_tab_events(app: &mut App, backend: &Backend, key: KeyCode) {
    match key {
        // Scroll headlines
        KeyCode::Up => app.select_prev_news(),
        KeyCode::Down => app.select_next_news(),

        // Category selection refetches immediately
        KeyCode::Left => {
            app.prev_category();
            category_changed(app, backend);
        }
        KeyCode::Right => {
            app.next_category();
            category_changed(app, backend);
        }

        // Keyword search
        KeyCode::Char('/') => {
            app.search = Input::default();
            app.mode = Mode::Search;
        }

        _ => {}
    }
}

fn category_changed(app: &mut App, backend: &Backend) {
    app.status_message = format!("Category: {}", app.category_label());
    refresh_news(app, backend);
}

/// Handle key events for the users tab
fn handle_users_tab_events(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up => app.select_prev_user(),
        KeyCode::Down => app.select_next_user(),
        _ => {}
    }
}

/// Handle key events for the signup modal
fn handle_signup_events(app: &mut App, backend: &Backend, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            // Local validation first; the request is only built and sent
            // when every rule passes.
            match app.signup.validate() {
                Ok(request) => {
                    app.status_message = "Submitting signup...".to_string();
                    backend.signup(request);
                }
                Err(err) => {
                    app.alert = Some(err.to_string());
                }
            }
        }
        KeyCode::Tab | KeyCode::Down => app.signup.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.signup.focus_prev(),
        KeyCode::Char('p') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.signup.toggle_password_visibility();
        }
        _ => {
            app.signup
                .focused_input_mut()
                .handle_event(&crossterm::event::Event::Key(key_event));
        }
    }
}

/// Handle key events for the login modal
fn handle_login_events(app: &mut App, backend: &Backend, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            // No local validation on login; the backend decides.
            let request = LoginRequest {
                email: app.login.email.value().trim().to_string(),
                password: app.login.password.value().to_string(),
            };
            app.status_message = "Logging in...".to_string();
            backend.login(request);
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => app.login.focus_next(),
        _ => {
            app.login
                .focused_input_mut()
                .handle_event(&crossterm::event::Event::Key(key_event));
        }
    }
}

/// Handle key events for the search prompt
fn handle_search_events(app: &mut App, backend: &Backend, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            let keyword = app.search.value().trim().to_string();
            if keyword.is_empty() {
                app.alert = Some("Please enter a keyword".to_string());
            } else {
                app.mode = Mode::Normal;
                app.status_message = format!("Search results for '{}'", keyword);
                let seq = app.begin_news_fetch();
                backend.search_news(seq, keyword);
            }
        }
        _ => {
            app.search
                .handle_event(&crossterm::event::Event::Key(key_event));
        }
    }
}

/// A left click on the dimmed backdrop outside an open modal closes it; a
/// click inside the modal does not.
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent, size: Rect) {
    if app.alert.is_some() {
        return;
    }
    if !matches!(mouse_event.kind, MouseEventKind::Down(MouseButton::Left)) {
        return;
    }

    let modal = match app.mode {
        Mode::Signup => ui::signup_modal_area(size),
        Mode::Login => ui::login_modal_area(size),
        _ => return,
    };

    if !ui::rect_contains(modal, mouse_event.column, mouse_event.row) {
        app.mode = Mode::Normal;
    }
}

/// Application entry point
fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Setup {
            news_url,
            search_url,
            users_url,
            country,
            refresh_secs,
        }) => {
            let mut config = load_config()?;
            if let Some(value) = news_url {
                config.news_url = value.clone();
            }
            if let Some(value) = search_url {
                config.news_search_url = value.clone();
            }
            if let Some(value) = users_url {
                config.users_url = value.clone();
            }
            if let Some(value) = country {
                config.country = value.clone();
            }
            if let Some(value) = refresh_secs {
                config.refresh_secs = *value;
            }
            save_config(&config)?;

            println!("Setup completed successfully!");
        }
        Some(Commands::Reset) => {
            save_config(&Config::default())?;
            println!("Configuration restored to defaults.");
        }
        Some(Commands::Tui) | None => {
            run_tui(&cli)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.country, DEFAULT_COUNTRY);
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.playlist.len(), 4);
        assert!(config.autoplay);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.theme = "dark".to_string();
        config.country = "us".to_string();
        write_config(&path, &config).unwrap();

        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.theme, "dark");
        assert_eq!(loaded.country, "us");
        assert_eq!(loaded.news_url, config.news_url);
    }

    #[test]
    fn partial_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "theme = \"dark\"\n").unwrap();

        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.theme, "dark");
        assert_eq!(loaded.users_url, Config::default().users_url);
        assert_eq!(loaded.refresh_secs, 60);
    }
}
