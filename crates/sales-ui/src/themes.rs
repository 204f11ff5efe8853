use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. Anything else
/// yields `BackgroundType::Unknown`.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .map(background_from_colorfgbg)
        .unwrap_or(BackgroundType::Unknown)
}

fn background_from_colorfgbg(value: &str) -> BackgroundType {
    match value.split(';').next_back().and_then(|bg| bg.parse::<u8>().ok()) {
        Some(bg) if bg <= 6 => BackgroundType::Dark,
        Some(_) => BackgroundType::Light,
        None => BackgroundType::Unknown,
    }
}

/// Number of colour steps in the heatmap ramp.
pub const HEAT_STEPS: usize = 5;

/// Every style the dashboard uses.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_sparkle: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Tabs ─────────────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── KPI deltas ───────────────────────────────────────────────────────────
    pub delta_up: Style,
    pub delta_down: Style,

    // ── Bars and series ──────────────────────────────────────────────────────
    pub bar_fill: Style,
    pub bar_fill_alt: Style,
    pub bar_empty: Style,
    pub bar_label: Style,
    pub series_primary: Style,
    pub series_comparison: Style,

    // ── Heatmap ──────────────────────────────────────────────────────────────
    /// Coldest to hottest.
    pub heat: [Style; HEAT_STEPS],

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,

    // ── Store selector ───────────────────────────────────────────────────────
    pub store_selected: Style,
    pub store_unselected: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_sparkle: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            delta_up: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            delta_down: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),

            bar_fill: Style::default().fg(Color::Cyan),
            bar_fill_alt: Style::default().fg(Color::Magenta),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::Gray),
            series_primary: Style::default().fg(Color::Cyan),
            series_comparison: Style::default().fg(Color::Magenta),

            heat: [
                Style::default().fg(Color::Blue),
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Red),
            ],

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            store_selected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            store_unselected: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_sparkle: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            delta_up: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            delta_down: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),

            bar_fill: Style::default().fg(Color::Blue),
            bar_fill_alt: Style::default().fg(Color::Magenta),
            bar_empty: Style::default().fg(Color::Gray),
            bar_label: Style::default().fg(Color::DarkGray),
            series_primary: Style::default().fg(Color::Blue),
            series_comparison: Style::default().fg(Color::Magenta),

            heat: [
                Style::default().fg(Color::Blue),
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Magenta),
                Style::default().fg(Color::Red),
            ],

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),

            store_selected: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            store_unselected: Style::default().fg(Color::Gray),
        }
    }

    /// Classic theme using only the basic 8-colour ANSI palette and no bold.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_sparkle: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default().fg(Color::Yellow),
            tab_inactive: Style::default().fg(Color::Gray),

            delta_up: Style::default().fg(Color::Green),
            delta_down: Style::default().fg(Color::Red),

            bar_fill: Style::default().fg(Color::Cyan),
            bar_fill_alt: Style::default().fg(Color::Magenta),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::White),
            series_primary: Style::default().fg(Color::Cyan),
            series_comparison: Style::default().fg(Color::Magenta),

            heat: [
                Style::default().fg(Color::Blue),
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Red),
            ],

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            store_selected: Style::default().fg(Color::Green),
            store_unselected: Style::default().fg(Color::DarkGray),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Green for growth (zero included), red for decline.
    pub fn delta_style(&self, delta_pct: f64) -> Style {
        if delta_pct >= 0.0 {
            self.delta_up
        } else {
            self.delta_down
        }
    }

    /// Heatmap colour for `value` scaled between `min` and `max`.
    ///
    /// A flat range (`max <= min`) uses the middle step.
    pub fn heat_style(&self, value: f64, min: f64, max: f64) -> Style {
        if max <= min {
            return self.heat[HEAT_STEPS / 2];
        }
        let ratio = ((value - min) / (max - min)).clamp(0.0, 1.0);
        let step = ((ratio * HEAT_STEPS as f64) as usize).min(HEAT_STEPS - 1);
        self.heat[step]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
