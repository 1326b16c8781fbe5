/*
* Newsdesk TUI UI Module
*
* Rendering for the dashboard: layout, widgets, themes, and the modal
* overlays. Everything draws from the App state; nothing here mutates it
* beyond the list selection handles ratatui needs.
*/

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap,
    },
    Frame,
};

use crate::models::{NewsItem, User};
use crate::tui::app::{App, FetchState, LoginField, Mode, SignupField, CATEGORIES};

/// Binary colour scheme applied to the whole frame. The persisted config
/// string tracks whichever variant is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value written to the config file.
    pub fn as_config_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Value read from the config file at startup.
    pub fn from_config_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// The toggle hint names the *next* action, not the current state.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark Mode",
            Theme::Dark => "Light Mode",
        }
    }

    pub fn base(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
            Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        }
    }

    pub fn accent(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::Blue),
            Theme::Dark => Style::default().fg(Color::Cyan),
        }
    }

    pub fn dim(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::DarkGray),
            Theme::Dark => Style::default().fg(Color::Gray),
        }
    }

    pub fn error(self) -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn highlight(self) -> Style {
        match self {
            Theme::Light => Style::default()
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            Theme::Dark => Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn status_bar(self) -> Style {
        Style::default().fg(Color::White).bg(Color::Blue)
    }
}

/// One tab panel: the stable id and the label painted on its nav button.
pub struct TabPanel {
    pub id: &'static str,
    pub label: &'static str,
}

/// Tab state for managing tab navigation
pub struct TabsState {
    /// The panels in display order
    pub panels: Vec<TabPanel>,
    /// Index of the currently visible panel
    pub index: usize,
}

impl TabsState {
    /// Create a new tabs state with the given panels
    pub fn new(panels: Vec<TabPanel>) -> Self {
        Self { panels, index: 0 }
    }

    /// Select the next tab
    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.panels.len();
    }

    /// Select the previous tab
    pub fn previous(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        } else {
            self.index = self.panels.len() - 1;
        }
    }

    pub fn current(&self) -> &TabPanel {
        &self.panels[self.index]
    }
}

/// Nav-button active state, matched on the visible label text: a button
/// lights up for the `english` panel when its label contains "english"
/// (case-insensitive), and for the `backend` panel when it contains
/// "users". Kept as-is from the observed behaviour.
pub fn button_highlighted(panel_id: &str, label: &str) -> bool {
    let label = label.to_lowercase();
    match panel_id {
        "english" => label.contains("english"),
        "backend" => label.contains("users"),
        _ => false,
    }
}

/// Main render function for the UI
pub fn render(app: &mut App, frame: &mut Frame) {
    let theme = app.theme;

    // Paint the themed background before any widget.
    frame.render_widget(Block::default().style(theme.base()), frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar and tabs
            Constraint::Min(0),    // Main area
            Constraint::Length(1), // Status bar
        ])
        .split(frame.size());

    render_title_and_tabs(app, frame, chunks[0]);

    match app.tabs.index {
        0 => render_news_tab(app, frame, chunks[1]),
        1 => render_users_tab(app, frame, chunks[1]),
        _ => {}
    }

    render_status_bar(app, frame, chunks[2]);

    match app.mode {
        Mode::Search => render_search_box(app, frame),
        Mode::Signup => render_signup_modal(app, frame),
        Mode::Login => render_login_modal(app, frame),
        Mode::Help => render_help_popup(app, frame),
        Mode::Normal => {}
    }

    // The alert overlay draws above everything, like a blocking dialog.
    if app.alert.is_some() {
        render_alert(app, frame);
    }
}

/// Render the title bar, the clock, and the nav buttons
fn render_title_and_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let title_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(app.clock.len() as u16 + 1),
        ])
        .split(rows[0]);

    let title_spans = vec![
        Span::styled("News", theme.accent().add_modifier(Modifier::BOLD)),
        Span::styled("desk", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" - your backend, live"),
    ];
    frame.render_widget(Paragraph::new(Line::from(title_spans)), title_cols[0]);

    let clock = Paragraph::new(app.clock.clone())
        .style(theme.dim())
        .alignment(Alignment::Right);
    frame.render_widget(clock, title_cols[1]);

    // Nav buttons; the active one is found by the label-text contract.
    let active = app.tabs.current().id;
    let tab_titles: Vec<Line> = app
        .tabs
        .panels
        .iter()
        .map(|panel| {
            let style = if button_highlighted(active, panel.label) {
                theme.accent().add_modifier(Modifier::BOLD)
            } else {
                theme.dim()
            };
            Line::from(Span::styled(panel.label, style))
        })
        .collect();

    let tabs = Tabs::new(tab_titles).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, rows[1].union(rows[2]));
}

/// Build the category picker line for the news tab.
fn category_line(app: &App) -> Line<'static> {
    let theme = app.theme;
    let mut spans = vec![Span::styled("Category: ", theme.dim())];
    for (i, label) in std::iter::once("All").chain(CATEGORIES.iter().copied()).enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if i == app.category_index {
            theme.accent().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label.to_string(), style));
    }
    Line::from(spans)
}

/// The list entries for the news pane: one placeholder line while loading,
/// one error line on failure, otherwise one entry per item.
pub fn news_list_items(news: &FetchState<Vec<NewsItem>>, theme: Theme) -> Vec<ListItem<'static>> {
    match news {
        FetchState::Loading => vec![ListItem::new("Loading news...")],
        FetchState::Failed(message) => vec![ListItem::new(Line::from(Span::styled(
            message.clone(),
            theme.error(),
        )))],
        FetchState::Loaded(items) => items
            .iter()
            .map(|item| ListItem::new(news_item_lines(item, theme)))
            .collect(),
    }
}

/// Three lines per headline: title, description, link. Fallback values are
/// substituted for blank or missing fields.
pub fn news_item_lines(item: &NewsItem, theme: Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            item.display_title().to_string(),
            theme.accent().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(item.display_description().to_string())),
        Line::from(Span::styled(item.display_url().to_string(), theme.dim())),
    ]
}

/// Render the news tab
fn render_news_tab(app: &mut App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Category picker
            Constraint::Min(0),    // Headlines
            Constraint::Length(1), // Selected item detail
        ])
        .split(area);

    frame.render_widget(Paragraph::new(category_line(app)), chunks[0]);

    let block = Block::default()
        .title(format!(
            "English News ({} / {})",
            app.country,
            app.category_label()
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let list = List::new(news_list_items(&app.news, theme))
        .block(block)
        .highlight_style(theme.highlight())
        .highlight_symbol(">> ");

    frame.render_stateful_widget(list, chunks[1], &mut app.news_state);

    // Where the selected article and its thumbnail live; the terminal
    // cannot show the image itself.
    let detail = match (&app.news, app.news_state.selected()) {
        (FetchState::Loaded(items), Some(i)) => items
            .get(i)
            .map(|item| format!("{}  [{}]", item.display_url(), item.display_image_url()))
            .unwrap_or_default(),
        _ => String::new(),
    };
    frame.render_widget(Paragraph::new(detail).style(theme.dim()), chunks[2]);
}

/// The list entries for the users pane.
pub fn users_list_items(users: &FetchState<Vec<User>>, theme: Theme) -> Vec<ListItem<'static>> {
    match users {
        FetchState::Loading => vec![ListItem::new("Loading users...")],
        FetchState::Failed(message) => vec![ListItem::new(Line::from(Span::styled(
            message.clone(),
            theme.error(),
        )))],
        FetchState::Loaded(users) => users
            .iter()
            .map(|user| ListItem::new(user.display_line()))
            .collect(),
    }
}

/// Render the users tab
fn render_users_tab(app: &mut App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;

    let block = Block::default()
        .title("Registered Users")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let list = List::new(users_list_items(&app.users, theme))
        .block(block)
        .highlight_style(theme.highlight())
        .highlight_symbol(">> ");

    frame.render_stateful_widget(list, area, &mut app.users_state);
}

/// Render the status bar
fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mode_indicator = match app.mode {
        Mode::Normal => "[Normal]",
        Mode::Signup => "[Sign Up]",
        Mode::Login => "[Login]",
        Mode::Search => "[Search]",
        Mode::Help => "[Help]",
    };

    let playing = if app.player.is_active() {
        let (pos, total) = app.player.playlist().position();
        app.player
            .playlist()
            .current()
            .map(|source| format!("Playing {} ({}/{})  ", source, pos, total))
            .unwrap_or_default()
    } else {
        String::new()
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(playing.len() as u16 + app.theme.toggle_label().len() as u16 + 5),
        ])
        .split(area);

    let status = format!("{} {}", mode_indicator, app.status_message);
    frame.render_widget(
        Paragraph::new(status).style(app.theme.status_bar()),
        cols[0],
    );

    let right = format!("{}[t] {}", playing, app.theme.toggle_label());
    frame.render_widget(
        Paragraph::new(right)
            .style(app.theme.status_bar())
            .alignment(Alignment::Right),
        cols[1],
    );
}

/// Render the keyword search prompt
fn render_search_box(app: &App, frame: &mut Frame) {
    let theme = app.theme;
    let area = centered_rect(60, 3, frame.size());

    let block = Block::default()
        .title("Search News")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(theme.base());

    let value = app.search.value();
    let content = if value.is_empty() {
        Paragraph::new(Span::styled("Enter a keyword", theme.dim())).block(block)
    } else {
        Paragraph::new(value.to_string()).block(block)
    };

    frame.render_widget(Clear, area);
    frame.render_widget(content, area);
    frame.set_cursor(area.x + app.search.visual_cursor() as u16 + 1, area.y + 1);
}

/// Rectangle of the signup modal; exposed for backdrop click hit-tests.
pub fn signup_modal_area(size: Rect) -> Rect {
    centered_rect(50, 16, size)
}

/// Rectangle of the login modal; exposed for backdrop click hit-tests.
pub fn login_modal_area(size: Rect) -> Rect {
    centered_rect(50, 10, size)
}

/// Render the signup modal
fn render_signup_modal(app: &App, frame: &mut Frame) {
    let theme = app.theme;
    let area = signup_modal_area(frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .title("Sign Up")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(theme.base()),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let form = &app.signup;
    let focused = form.focused_field();
    let mask = |value: &str| -> String {
        if form.show_password {
            value.to_string()
        } else {
            "\u{2022}".repeat(value.chars().count())
        }
    };

    render_form_field(frame, theme, chunks[0], "Name", form.name.value().to_string(), focused == SignupField::Name);
    render_form_field(frame, theme, chunks[1], "Email", form.email.value().to_string(), focused == SignupField::Email);
    render_form_field(frame, theme, chunks[2], "Password", mask(form.password.value()), focused == SignupField::Password);
    render_form_field(frame, theme, chunks[3], "Confirm Password", mask(form.confirm.value()), focused == SignupField::Confirm);

    let hint = "[Tab] next field | [Ctrl+P] show/hide password | [Enter] submit | [Esc] close";
    frame.render_widget(Paragraph::new(hint).style(theme.dim()), chunks[4]);

    let (field_area, cursor) = match focused {
        SignupField::Name => (chunks[0], form.name.visual_cursor()),
        SignupField::Email => (chunks[1], form.email.visual_cursor()),
        SignupField::Password => (chunks[2], form.password.visual_cursor()),
        SignupField::Confirm => (chunks[3], form.confirm.visual_cursor()),
    };
    frame.set_cursor(field_area.x + cursor as u16 + 1, field_area.y + 1);
}

/// Render the login modal
fn render_login_modal(app: &App, frame: &mut Frame) {
    let theme = app.theme;
    let area = login_modal_area(frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .title("Login")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(theme.base()),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let form = &app.login;
    let focused = form.focused_field();
    let password = "\u{2022}".repeat(form.password.value().chars().count());

    render_form_field(frame, theme, chunks[0], "Email", form.email.value().to_string(), focused == LoginField::Email);
    render_form_field(frame, theme, chunks[1], "Password", password, focused == LoginField::Password);

    let hint = "[Tab] next field | [Enter] submit | [Esc] close";
    frame.render_widget(Paragraph::new(hint).style(theme.dim()), chunks[2]);

    let (field_area, cursor) = match focused {
        LoginField::Email => (chunks[0], form.email.visual_cursor()),
        LoginField::Password => (chunks[1], form.password.visual_cursor()),
    };
    frame.set_cursor(field_area.x + cursor as u16 + 1, field_area.y + 1);
}

fn render_form_field(
    frame: &mut Frame,
    theme: Theme,
    area: Rect,
    label: &'static str,
    value: String,
    focused: bool,
) {
    let border_style = if focused { theme.accent() } else { theme.dim() };
    let field = Paragraph::new(value).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    frame.render_widget(field, area);
}

/// Render the alert overlay, the stand-in for a blocking dialog
fn render_alert(app: &App, frame: &mut Frame) {
    let Some(message) = &app.alert else {
        return;
    };
    let theme = app.theme;
    let area = centered_rect(60, 7, frame.size());

    let text = Text::from(vec![
        Line::from(message.clone()),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", theme.dim())),
    ]);

    let dialog = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Notice")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(theme.base()),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

/// Render the help popup
fn render_help_popup(app: &App, frame: &mut Frame) {
    let theme = app.theme;
    let area = centered_rect(70, 20, frame.size());

    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled(
            "Newsdesk",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  [Tab] / [Shift+Tab]: Switch between tabs"),
        Line::from("  [Up/Down]: Scroll the visible list"),
        Line::from(""),
        Line::from("News tab:"),
        Line::from("  [Left/Right]: Change the category filter"),
        Line::from("  [/]: Search headlines by keyword"),
        Line::from(""),
        Line::from("Accounts:"),
        Line::from("  [s]: Open the signup form"),
        Line::from("  [l]: Open the login form"),
        Line::from(""),
        Line::from("Other:"),
        Line::from("  [t]: Toggle dark/light theme"),
        Line::from("  [?]: Toggle help"),
        Line::from("  [q]: Quit application"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_text))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(theme.base()),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, area);
}

/// Create a centered rectangle for popups
pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_width = (r.width * percent_x) / 100;
    let height = height.min(r.height);

    let popup_x = (r.width.saturating_sub(popup_width)) / 2;
    let popup_y = (r.height.saturating_sub(height)) / 2;

    Rect::new(r.x + popup_x, r.y + popup_y, popup_width, height)
}

/// Whether a terminal cell lies inside a rectangle; used for backdrop
/// click detection on the modals.
pub fn rect_contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggle_is_an_involution() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn persisted_string_tracks_the_applied_theme() {
        let mut theme = Theme::Dark;
        for _ in 0..2 {
            theme = theme.toggled();
            assert_eq!(Theme::from_config_str(theme.as_config_str()), Some(theme));
        }
    }

    #[test]
    fn toggle_label_names_the_next_action() {
        assert_eq!(Theme::Dark.toggle_label(), "Light Mode");
        assert_eq!(Theme::Light.toggle_label(), "Dark Mode");
    }

    #[test]
    fn unknown_config_theme_is_rejected() {
        assert_eq!(Theme::from_config_str("sepia"), None);
    }

    #[test]
    fn buttons_highlight_by_label_substring() {
        assert!(button_highlighted("english", "English News"));
        assert!(button_highlighted("english", "ENGLISH"));
        assert!(!button_highlighted("english", "Users"));

        assert!(button_highlighted("backend", "Users"));
        assert!(button_highlighted("backend", "All users"));
        assert!(!button_highlighted("backend", "English News"));
    }

    #[test]
    fn news_pane_renders_one_entry_per_item() {
        let items: Vec<NewsItem> = (0..5)
            .map(|i| NewsItem {
                title: Some(format!("headline {}", i)),
                description: None,
                image_url: None,
                url: None,
            })
            .collect();
        let rendered = news_list_items(&FetchState::Loaded(items), Theme::Light);
        assert_eq!(rendered.len(), 5);

        let empty = news_list_items(&FetchState::Loaded(Vec::new()), Theme::Light);
        assert!(empty.is_empty());
    }

    #[test]
    fn news_item_lines_substitute_fallbacks() {
        let item = NewsItem {
            title: Some("  ".to_string()),
            description: None,
            image_url: None,
            url: Some(String::new()),
        };
        let lines = news_item_lines(&item, Theme::Dark);
        assert_eq!(lines[0].spans[0].content, "No Title");
        assert_eq!(lines[1].spans[0].content, "No Description");
        assert_eq!(lines[2].spans[0].content, "#");
    }

    #[test]
    fn loading_and_failed_panes_show_a_single_line() {
        let loading = news_list_items(&FetchState::Loading, Theme::Light);
        assert_eq!(loading.len(), 1);

        let failed = users_list_items(
            &FetchState::Failed("Error loading users".to_string()),
            Theme::Light,
        );
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn users_pane_renders_one_entry_per_user() {
        let users: Vec<User> = (0..3)
            .map(|i| User {
                id: i,
                name: format!("user{}", i),
                email: format!("u{}@example.com", i),
            })
            .collect();
        let rendered = users_list_items(&FetchState::Loaded(users), Theme::Dark);
        assert_eq!(rendered.len(), 3);
    }

    #[test]
    fn rect_contains_is_exclusive_of_the_far_edges() {
        let r = Rect::new(10, 5, 20, 10);
        assert!(rect_contains(r, 10, 5));
        assert!(rect_contains(r, 29, 14));
        assert!(!rect_contains(r, 30, 14));
        assert!(!rect_contains(r, 29, 15));
        assert!(!rect_contains(r, 9, 5));
    }

    #[test]
    fn centered_rect_stays_inside_the_frame() {
        let frame = Rect::new(0, 0, 80, 24);
        let popup = centered_rect(60, 7, frame);
        assert!(popup.x + popup.width <= frame.width);
        assert!(popup.y + popup.height <= frame.height);

        // Tiny terminals must not underflow.
        let tiny = Rect::new(0, 0, 10, 3);
        let popup = centered_rect(60, 7, tiny);
        assert!(popup.height <= tiny.height);
    }
}
