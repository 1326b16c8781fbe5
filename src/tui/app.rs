/*
* Newsdesk TUI App Module
*
* Core session state for the dashboard: filter selections, sequence-guarded
* fetch states, the auth forms, theme and clock. All controller transitions
* live here so they can be exercised without a terminal or a network.
*/

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use ratatui::widgets::ListState;
use tracing::{debug, error};
use tui_input::Input;

use crate::api::ApiError;
use crate::models::{NewsItem, SignupRequest, SignupResponse, User};
use crate::player::VideoPlayer;
use crate::tui::ui::{TabPanel, TabsState, Theme};

/// Category buttons offered on the news tab. Index 0 in the picker is "All"
/// (no category filter).
pub const CATEGORIES: &[&str] = &[
    "general",
    "business",
    "entertainment",
    "health",
    "science",
    "sports",
    "technology",
];

/// Country filter applied when nothing else is configured.
pub const DEFAULT_COUNTRY: &str = "in";

/// Application mode enum for the UI state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal mode for navigation
    Normal,
    /// Signup modal is open
    Signup,
    /// Login modal is open
    Login,
    /// Keyword search prompt is open
    Search,
    /// Help screen mode
    Help,
}

/// Lifecycle of one fetched pane: placeholder, data, or a single error line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

/// Fields of the signup modal in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Name,
    Email,
    Password,
    Confirm,
}

/// Local validation failures. Each one blocks submission before any request
/// is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must be at least 3 characters long")]
    NameTooShort,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// State of the signup modal.
#[derive(Default)]
pub struct SignupForm {
    pub name: Input,
    pub email: Input,
    pub password: Input,
    pub confirm: Input,
    pub focus: Option<SignupField>,
    pub show_password: bool,
}

impl SignupForm {
    pub fn focused_field(&self) -> SignupField {
        self.focus.unwrap_or(SignupField::Name)
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        match self.focused_field() {
            SignupField::Name => &mut self.name,
            SignupField::Email => &mut self.email,
            SignupField::Password => &mut self.password,
            SignupField::Confirm => &mut self.confirm,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = Some(match self.focused_field() {
            SignupField::Name => SignupField::Email,
            SignupField::Email => SignupField::Password,
            SignupField::Password => SignupField::Confirm,
            SignupField::Confirm => SignupField::Name,
        });
    }

    pub fn focus_prev(&mut self) {
        self.focus = Some(match self.focused_field() {
            SignupField::Name => SignupField::Confirm,
            SignupField::Email => SignupField::Name,
            SignupField::Password => SignupField::Email,
            SignupField::Confirm => SignupField::Password,
        });
    }

    /// Flip the password and confirmation fields between masked and
    /// plaintext in lockstep.
    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Run the local checks in order and build the request body. Name and
    /// email are trimmed before validation, the passwords are not.
    pub fn validate(&self) -> Result<SignupRequest, ValidationError> {
        let name = self.name.value().trim();
        let email = self.email.value().trim();
        let password = self.password.value();

        if name.chars().count() < 3 {
            return Err(ValidationError::NameTooShort);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        if password.chars().count() < 6 {
            return Err(ValidationError::PasswordTooShort);
        }
        if password != self.confirm.value() {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// `local@domain.tld` with a 2-3 letter lowercase TLD and no spaces.
fn is_valid_email(email: &str) -> bool {
    if email.contains(' ') {
        return false;
    }
    let Some(dot) = email.rfind('.') else {
        return false;
    };
    let tld = &email[dot + 1..];
    if !(2..=3).contains(&tld.len()) || !tld.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    let Some(at) = email[..dot].find('@') else {
        return false;
    };
    // At least one character on each side of the '@'.
    at > 0 && dot > at + 1
}

/// Fields of the login modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// State of the login modal. No local validation happens here.
#[derive(Default)]
pub struct LoginForm {
    pub email: Input,
    pub password: Input,
    pub focus: Option<LoginField>,
}

impl LoginForm {
    pub fn focused_field(&self) -> LoginField {
        self.focus.unwrap_or(LoginField::Email)
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        match self.focused_field() {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = Some(match self.focused_field() {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        });
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Main application state structure
pub struct App {
    /// Whether the application is still running
    pub running: bool,

    /// Current tab state
    pub tabs: TabsState,

    /// Current UI mode
    pub mode: Mode,

    /// Applied colour theme; persisted on every toggle
    pub theme: Theme,

    /// Formatted wall-clock string for the title bar
    pub clock: String,

    /// Status message to display to the user
    pub status_message: String,

    /// Blocking message overlay, the terminal stand-in for `alert()`
    pub alert: Option<String>,

    /// Country filter for news fetches
    pub country: String,

    /// Selected category picker position; 0 means "All"
    pub category_index: usize,

    /// Last news fetch outcome
    pub news: FetchState<Vec<NewsItem>>,

    /// Sequence number of the latest issued news fetch
    pub news_seq: u64,

    /// News list selection for UI rendering
    pub news_state: ListState,

    /// Last users fetch outcome
    pub users: FetchState<Vec<User>>,

    /// Sequence number of the latest issued users fetch
    pub users_seq: u64,

    /// Users list selection for UI rendering
    pub users_state: ListState,

    /// Signup modal state
    pub signup: SignupForm,

    /// Login modal state
    pub login: LoginForm,

    /// Keyword search prompt
    pub search: Input,

    /// Period of the data refresh timer
    pub refresh_interval: Duration,

    /// When the refresh timer last fired
    pub last_refresh: Instant,

    /// Video playlist driver
    pub player: VideoPlayer,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Self {
        Self {
            running: true,
            tabs: TabsState::new(vec![
                TabPanel {
                    id: "english",
                    label: "English News",
                },
                TabPanel {
                    id: "backend",
                    label: "Users",
                },
            ]),
            mode: Mode::Normal,
            theme: Theme::Light,
            clock: format_clock(Local::now()),
            status_message: String::new(),
            alert: None,
            country: DEFAULT_COUNTRY.to_string(),
            category_index: 0,
            news: FetchState::Loading,
            news_seq: 0,
            news_state: ListState::default(),
            users: FetchState::Loading,
            users_seq: 0,
            users_state: ListState::default(),
            signup: SignupForm::default(),
            login: LoginForm::default(),
            search: Input::default(),
            refresh_interval: Duration::from_secs(60),
            last_refresh: Instant::now(),
            player: VideoPlayer::new(Vec::new(), "mpv"),
        }
    }

    /// Initialize the application
    pub fn init(&mut self) {
        self.status_message = "Welcome to Newsdesk! Press '?' for help.".to_string();
    }

    /// Process a tick event
    pub fn tick(&mut self) {
        self.clock = format_clock(Local::now());
    }

    /// Whether the periodic refresh should fire; resets the timer when it
    /// does.
    pub fn refresh_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_refresh) >= self.refresh_interval {
            self.last_refresh = now;
            true
        } else {
            false
        }
    }

    /// The category applied to the next news fetch, if any.
    pub fn selected_category(&self) -> Option<&'static str> {
        if self.category_index == 0 {
            None
        } else {
            CATEGORIES.get(self.category_index - 1).copied()
        }
    }

    pub fn category_label(&self) -> &'static str {
        self.selected_category().unwrap_or("All")
    }

    /// Move the category picker right, wrapping from the last category back
    /// to "All".
    pub fn next_category(&mut self) {
        self.category_index = (self.category_index + 1) % (CATEGORIES.len() + 1);
    }

    /// Move the category picker left.
    pub fn prev_category(&mut self) {
        if self.category_index == 0 {
            self.category_index = CATEGORIES.len();
        } else {
            self.category_index -= 1;
        }
    }

    /// Apply a category by name, e.g. from the CLI override.
    pub fn set_category(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        match CATEGORIES.iter().position(|c| **c == name) {
            Some(index) => {
                self.category_index = index + 1;
                true
            }
            None => false,
        }
    }

    /// Mark the news pane loading and issue a new sequence number. The
    /// caller hands the number to the backend so the completion can be
    /// matched back.
    pub fn begin_news_fetch(&mut self) -> u64 {
        self.news_seq += 1;
        self.news = FetchState::Loading;
        self.news_seq
    }

    /// Apply a news completion. Responses carrying a stale sequence number
    /// were overtaken by a newer request and are dropped.
    pub fn apply_news(&mut self, seq: u64, result: Result<Vec<NewsItem>, ApiError>) {
        if seq != self.news_seq {
            debug!(seq, latest = self.news_seq, "discarding stale news response");
            return;
        }
        match result {
            Ok(items) => {
                self.news_state
                    .select(if items.is_empty() { None } else { Some(0) });
                self.news = FetchState::Loaded(items);
            }
            Err(err) => {
                error!(%err, "failed to fetch news");
                self.news_state.select(None);
                self.news = FetchState::Failed("Failed to load news from backend.".to_string());
            }
        }
    }

    pub fn begin_users_fetch(&mut self) -> u64 {
        self.users_seq += 1;
        self.users = FetchState::Loading;
        self.users_seq
    }

    pub fn apply_users(&mut self, seq: u64, result: Result<Vec<User>, ApiError>) {
        if seq != self.users_seq {
            debug!(seq, latest = self.users_seq, "discarding stale users response");
            return;
        }
        match result {
            Ok(users) => {
                self.users_state
                    .select(if users.is_empty() { None } else { Some(0) });
                self.users = FetchState::Loaded(users);
            }
            Err(err) => {
                error!(%err, "failed to fetch users");
                self.users_state.select(None);
                self.users = FetchState::Failed("Error loading users".to_string());
            }
        }
    }

    /// Apply a signup completion. Returns true when the caller should
    /// trigger a users refresh.
    pub fn apply_signup(&mut self, result: Result<SignupResponse, ApiError>) -> bool {
        match result {
            Ok(response) => {
                self.alert = Some(format!("Sign up successful! Welcome {}", response.name));
                self.signup.reset();
                self.mode = Mode::Normal;
                true
            }
            Err(err) => {
                error!(%err, "signup failed");
                self.alert = Some("Signup failed, please try again.".to_string());
                false
            }
        }
    }

    /// Apply a login completion. 404 and 401 carry specific messages, a
    /// successful body is surfaced verbatim, everything else is generic.
    pub fn apply_login(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(text) => self.alert = Some(text),
            Err(ApiError::UserNotFound) => self.alert = Some("User not found".to_string()),
            Err(ApiError::InvalidPassword) => self.alert = Some("Invalid password".to_string()),
            Err(err) => {
                error!(%err, "login failed");
                self.alert = Some("Login failed, please try again.".to_string());
            }
        }
    }

    /// Flip the theme and return the newly applied value so the caller can
    /// persist it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn loaded_news_len(&self) -> usize {
        match &self.news {
            FetchState::Loaded(items) => items.len(),
            _ => 0,
        }
    }

    fn loaded_users_len(&self) -> usize {
        match &self.users {
            FetchState::Loaded(users) => users.len(),
            _ => 0,
        }
    }

    /// Move the news selection down, wrapping at the end.
    pub fn select_next_news(&mut self) {
        let len = self.loaded_news_len();
        if len == 0 {
            return;
        }
        let i = self
            .news_state
            .selected()
            .map_or(0, |i| if i + 1 < len { i + 1 } else { 0 });
        self.news_state.select(Some(i));
    }

    /// Move the news selection up, wrapping at the start.
    pub fn select_prev_news(&mut self) {
        let len = self.loaded_news_len();
        if len == 0 {
            return;
        }
        let i = self
            .news_state
            .selected()
            .map_or(0, |i| if i > 0 { i - 1 } else { len - 1 });
        self.news_state.select(Some(i));
    }

    pub fn select_next_user(&mut self) {
        let len = self.loaded_users_len();
        if len == 0 {
            return;
        }
        let i = self
            .users_state
            .selected()
            .map_or(0, |i| if i + 1 < len { i + 1 } else { 0 });
        self.users_state.select(Some(i));
    }

    pub fn select_prev_user(&mut self) {
        let len = self.loaded_users_len();
        if len == 0 {
            return;
        }
        let i = self
            .users_state
            .selected()
            .map_or(0, |i| if i > 0 { i - 1 } else { len - 1 });
        self.users_state.select(Some(i));
    }
}

/// Long date, a separator, then a 12-hour time,
/// e.g. `Wednesday, 6 August 2026 | 09:15:42 PM`.
pub fn format_clock(now: DateTime<Local>) -> String {
    now.format("%A, %-d %B %Y | %r").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn set(input: &mut Input, value: &str) {
        *input = Input::new(value.to_string());
    }

    fn filled_form() -> SignupForm {
        let mut form = SignupForm::default();
        set(&mut form.name, "Asha Rao");
        set(&mut form.email, "asha@example.com");
        set(&mut form.password, "secret99");
        set(&mut form.confirm, "secret99");
        form
    }

    #[test]
    fn signup_rejects_short_name() {
        let mut form = filled_form();
        set(&mut form.name, "ab");
        assert_eq!(form.validate(), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn signup_rejects_bad_email() {
        let mut form = filled_form();
        set(&mut form.email, "bad-email");
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn signup_rejects_short_password() {
        let mut form = filled_form();
        set(&mut form.password, "123");
        set(&mut form.confirm, "123");
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn signup_rejects_password_mismatch() {
        let mut form = filled_form();
        set(&mut form.confirm, "secret98");
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn signup_accepts_valid_form_and_trims() {
        let mut form = filled_form();
        set(&mut form.name, "  Asha Rao  ");
        set(&mut form.email, " asha@example.com ");
        let request = form.validate().unwrap();
        assert_eq!(request.name, "Asha Rao");
        assert_eq!(request.email, "asha@example.com");
        assert_eq!(request.password, "secret99");
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.example.com"));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("a@b.COM"));
        assert!(!is_valid_email("a@b.info"));
        assert!(!is_valid_email("@b.io"));
        assert!(!is_valid_email("a@.io"));
        assert!(!is_valid_email("a@b."));
    }

    fn news(title: &str) -> NewsItem {
        NewsItem {
            title: Some(title.to_string()),
            description: None,
            image_url: None,
            url: None,
        }
    }

    #[test]
    fn stale_news_responses_are_discarded() {
        let mut app = App::new();
        let first = app.begin_news_fetch();
        let second = app.begin_news_fetch();

        // The older request resolves last in real life; here order does not
        // matter, only the sequence check.
        app.apply_news(first, Ok(vec![news("old")]));
        assert_eq!(app.news, FetchState::Loading);

        app.apply_news(second, Ok(vec![news("new")]));
        match &app.news {
            FetchState::Loaded(items) => assert_eq!(items[0].display_title(), "new"),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn failed_news_fetch_shows_single_error_line() {
        let mut app = App::new();
        let seq = app.begin_news_fetch();
        app.apply_news(seq, Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        assert_eq!(
            app.news,
            FetchState::Failed("Failed to load news from backend.".to_string())
        );
        assert_eq!(app.news_state.selected(), None);
    }

    #[test]
    fn non_array_users_payload_fails_like_transport() {
        let mut app = App::new();
        let seq = app.begin_users_fetch();
        app.apply_users(seq, Err(ApiError::NotArray));
        assert_eq!(
            app.users,
            FetchState::Failed("Error loading users".to_string())
        );
    }

    #[test]
    fn signup_success_closes_modal_and_requests_users_refresh() {
        let mut app = App::new();
        app.mode = Mode::Signup;
        app.signup = filled_form();

        let refresh = app.apply_signup(Ok(SignupResponse {
            id: Some(1),
            name: "Alice".to_string(),
            email: None,
        }));

        assert!(refresh);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.signup.name.value(), "");
        assert_eq!(
            app.alert.as_deref(),
            Some("Sign up successful! Welcome Alice")
        );
    }

    #[test]
    fn signup_failure_keeps_modal_open() {
        let mut app = App::new();
        app.mode = Mode::Signup;
        let refresh = app.apply_signup(Err(ApiError::Status(StatusCode::CONFLICT)));
        assert!(!refresh);
        assert_eq!(app.mode, Mode::Signup);
        assert_eq!(app.alert.as_deref(), Some("Signup failed, please try again."));
    }

    #[test]
    fn login_status_codes_map_to_messages() {
        let mut app = App::new();

        app.apply_login(Err(ApiError::UserNotFound));
        assert_eq!(app.alert.as_deref(), Some("User not found"));

        app.apply_login(Err(ApiError::InvalidPassword));
        assert_eq!(app.alert.as_deref(), Some("Invalid password"));

        app.apply_login(Ok("Welcome back".to_string()));
        assert_eq!(app.alert.as_deref(), Some("Welcome back"));

        app.apply_login(Err(ApiError::Status(StatusCode::IM_A_TEAPOT)));
        assert_eq!(app.alert.as_deref(), Some("Login failed, please try again."));
    }

    #[test]
    fn category_picker_cycles_through_all_and_back() {
        let mut app = App::new();
        assert_eq!(app.selected_category(), None);

        for expected in CATEGORIES {
            app.next_category();
            assert_eq!(app.selected_category(), Some(*expected));
        }
        app.next_category();
        assert_eq!(app.selected_category(), None);

        app.prev_category();
        assert_eq!(app.selected_category(), Some("technology"));
    }

    #[test]
    fn category_override_by_name() {
        let mut app = App::new();
        assert!(app.set_category("Sports"));
        assert_eq!(app.selected_category(), Some("sports"));
        assert!(!app.set_category("astrology"));
    }

    #[test]
    fn refresh_fires_after_the_interval_and_rearms() {
        let mut app = App::new();
        let due = app.last_refresh + Duration::from_secs(61);
        assert!(app.refresh_due(due));
        assert!(!app.refresh_due(due));
        assert!(app.refresh_due(due + Duration::from_secs(60)));
    }

    #[test]
    fn clock_has_date_time_separator() {
        let clock = format_clock(Local::now());
        assert!(clock.contains(" | "));
    }

    #[test]
    fn news_selection_wraps() {
        let mut app = App::new();
        let seq = app.begin_news_fetch();
        app.apply_news(seq, Ok(vec![news("a"), news("b")]));
        assert_eq!(app.news_state.selected(), Some(0));
        app.select_next_news();
        assert_eq!(app.news_state.selected(), Some(1));
        app.select_next_news();
        assert_eq!(app.news_state.selected(), Some(0));
        app.select_prev_news();
        assert_eq!(app.news_state.selected(), Some(1));
    }
}
