use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use sales_core::formatting::{format_amount, format_number};

use crate::themes::Theme;

/// Visual settings shared by the horizontal bars.
pub struct BarConfig {
    /// Width in terminal columns of the bar portion.
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
    /// Column width the leading label is padded to.
    pub label_width: usize,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            label_width: 14,
        }
    }
}

/// Pad (or cut) `label` to `width` display columns.
pub fn pad_label(label: &str, width: usize) -> String {
    let current = label.width();
    if current <= width {
        return format!("{}{}", label, " ".repeat(width - current));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn bar_spans<'a>(
    ratio: f64,
    config: &BarConfig,
    fill: Style,
    empty: Style,
) -> [Span<'a>; 2] {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * config.width as f64).round() as u16;
    let rest = config.width.saturating_sub(filled);
    [
        Span::styled(
            config.filled_char.to_string().repeat(filled as usize),
            fill,
        ),
        Span::styled(
            config.empty_char.to_string().repeat(rest as usize),
            empty,
        ),
    ]
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// One store's share of the period total: label, bar, percentage and amount.
pub struct ShareBar<'a> {
    pub store: &'a str,
    /// 0–100.
    pub share_pct: f64,
    pub amount: f64,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(store: &'a str, share_pct: f64, amount: f64, theme: &'a Theme) -> Self {
        Self {
            store,
            share_pct,
            amount,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let [filled, empty] = bar_spans(
            self.share_pct / 100.0,
            &self.config,
            self.theme.bar_fill,
            self.theme.bar_empty,
        );
        Line::from(vec![
            Span::styled(pad_label(self.store, self.config.label_width), self.theme.label),
            filled,
            empty,
            Span::styled(
                format!(
                    " {:>5}% {}",
                    format_number(self.share_pct, 1),
                    format_amount(self.amount)
                ),
                self.theme.bar_label,
            ),
        ])
    }
}

// ── ValueBar ─────────────────────────────────────────────────────────────────

/// A labelled bar proportional to `value / max`, used for mean/median
/// comparisons between stores.
pub struct ValueBar<'a> {
    pub label: String,
    pub value: f64,
    pub max: f64,
    pub fill: Style,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> ValueBar<'a> {
    pub fn new(label: impl Into<String>, value: f64, max: f64, fill: Style, theme: &'a Theme) -> Self {
        Self {
            label: label.into(),
            value,
            max,
            fill,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let ratio = if self.max > 0.0 { self.value / self.max } else { 0.0 };
        let [filled, empty] = bar_spans(ratio, &self.config, self.fill, self.theme.bar_empty);
        Line::from(vec![
            Span::styled(pad_label(&self.label, self.config.label_width), self.theme.label),
            filled,
            empty,
            Span::styled(format!(" {}", format_amount(self.value)), self.theme.bar_label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
