//! Main application state and TUI event loop for the sales dashboard.
//!
//! [`App`] owns the theme, the active tab, the explorer scroll offset and
//! the [`DashboardSession`] whose snapshot it renders. Key presses are
//! translated into session mutations, which recompute before the next draw.

use std::cell::Cell;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::debug;

use sales_runtime::session::{DashboardSession, SessionState};

use crate::comparison_view;
use crate::components::header::Header;
use crate::explorer_view;
use crate::summary_view;
use crate::themes::Theme;

/// Stores beyond this many cannot be toggled from the number keys.
const MAX_HOTKEY_STORES: usize = 9;

/// Explorer rows moved per PageUp/PageDown.
const PAGE_ROWS: usize = 10;

// ── Tab ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    Comparison,
    Explorer,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Summary, Tab::Comparison, Tab::Explorer];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Summary => "Resumen Gerencial",
            Tab::Comparison => "Análisis Comparativo",
            Tab::Explorer => "Explorador de Datos",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Summary => 0,
            Tab::Comparison => 1,
            Tab::Explorer => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    /// First explorer row shown.
    pub scroll: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Shown in the header, usually the source file name.
    pub source_label: String,
    session: DashboardSession,
    /// Explorer rows that fit on screen, as of the last draw.
    explorer_visible: Cell<usize>,
}

impl App {
    pub fn new(session: DashboardSession, theme_name: &str, source_label: impl Into<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Summary,
            scroll: 0,
            should_quit: false,
            source_label: source_label.into(),
            session,
            explorer_visible: Cell::new(0),
        }
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout and yields to the
    /// runtime between iterations so a surrounding `tokio::select!` can still
    /// observe its other branches.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                        self.handle_key(key)
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }

            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.previous(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                let enabled = !self.session.filters().compare;
                debug!("comparison mode: {}", enabled);
                self.session.set_comparison(enabled);
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.session.select_all_stores();
                self.scroll = 0;
            }
            KeyCode::Char('[') => self.change_range(|s| s.shift_primary_months(-1)),
            KeyCode::Char(']') => self.change_range(|s| s.shift_primary_months(1)),
            KeyCode::Char('{') => self.change_range(|s| s.shift_comparison_months(-1)),
            KeyCode::Char('}') => self.change_range(|s| s.shift_comparison_months(1)),
            KeyCode::Char('r') | KeyCode::Char('R') => self.change_range(DashboardSession::reset_ranges),
            KeyCode::Char(d @ '1'..='9') => {
                let idx = (d as usize) - ('1' as usize);
                if let Some(store) = self.session.stores().get(idx).cloned() {
                    debug!("toggling store {}", store);
                    self.session.toggle_store(&store);
                    self.scroll = 0;
                }
            }
            KeyCode::Down => self.scroll_by(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll_by(PAGE_ROWS),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE_ROWS),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    fn explorer_len(&self) -> usize {
        self.session
            .snapshot()
            .map(|s| s.explorer.len())
            .unwrap_or(0)
    }

    fn scroll_by(&mut self, rows: usize) {
        let last = explorer_view::max_scroll(self.explorer_len(), self.explorer_visible.get());
        self.scroll = (self.scroll + rows).min(last);
    }

    fn change_range(&mut self, apply: impl FnOnce(&mut DashboardSession)) {
        apply(&mut self.session);
        self.scroll = 0;
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let period = self.session.filters().primary.date_range.label();
        let header = Header::new(&self.source_label, &period, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(" | ");
        frame.render_widget(tabs, chunks[1]);

        frame.render_widget(Paragraph::new(self.store_selector_line()), chunks[2]);

        self.render_body(frame, chunks[3]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Tab/←→ pestaña · [ ] mes · { } mes comparado · r rangos · c comparar · 1-9 tienda · a todas · ↑↓ desplazar · q salir",
                self.theme.dim,
            ))),
            chunks[4],
        );
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        match self.session.state() {
            SessionState::NoData { reason } => {
                explorer_view::render_no_data(frame, area, reason, &self.theme)
            }
            SessionState::Ready(snapshot) => match self.tab {
                Tab::Summary => summary_view::render_summary_view(frame, area, snapshot, &self.theme),
                Tab::Comparison => {
                    comparison_view::render_comparison_view(frame, area, snapshot, &self.theme)
                }
                Tab::Explorer => {
                    self.explorer_visible.set(explorer_view::visible_rows(area));
                    explorer_view::render_explorer_view(
                        frame,
                        area,
                        &snapshot.explorer,
                        self.scroll,
                        &self.theme,
                    )
                }
            },
        }
    }

    /// `1 [x] Centro  2 [ ] Norte ...`, plus the comparison flag.
    fn store_selector_line(&self) -> Line<'_> {
        let mut spans: Vec<Span> = Vec::new();
        for (i, store) in self.session.stores().iter().enumerate() {
            let selected = self.session.is_store_selected(store);
            let (mark, style) = if selected {
                ("[x]", self.theme.store_selected)
            } else {
                ("[ ]", self.theme.store_unselected)
            };
            let key = if i < MAX_HOTKEY_STORES {
                format!("{}", i + 1)
            } else {
                "-".to_string()
            };
            spans.push(Span::styled(
                format!("{} {} {}  ", key, mark, store),
                style,
            ));
        }
        let compare = if self.session.filters().compare {
            Span::styled(
                format!("Comparar: sí ({})", self.session.comparison_range().label()),
                self.theme.info,
            )
        } else {
            Span::styled("Comparar: no", self.theme.dim)
        };
        spans.push(compare);
        Line::from(spans)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
