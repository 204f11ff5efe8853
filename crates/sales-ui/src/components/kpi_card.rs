use ratatui::text::{Line, Span};

use sales_core::formatting::{format_amount, format_delta};
use sales_data::analysis::Kpi;

use crate::themes::Theme;

/// A headline figure rendered as three lines: title, value, and the
/// comparison line (delta against the baseline, or why there is none).
pub struct KpiCard<'a> {
    pub title: &'a str,
    pub kpi: &'a Kpi,
    pub theme: &'a Theme,
}

impl<'a> KpiCard<'a> {
    pub fn new(title: &'a str, kpi: &'a Kpi, theme: &'a Theme) -> Self {
        Self { title, kpi, theme }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(self.title, self.theme.label)),
            Line::from(Span::styled(format_amount(self.kpi.current), self.theme.value)),
            self.comparison_line(),
        ]
    }

    fn comparison_line(&self) -> Line<'a> {
        match (self.kpi.baseline, self.kpi.delta_pct) {
            (Some(baseline), Some(delta)) => Line::from(vec![
                Span::styled(format_delta(delta), self.theme.delta_style(delta)),
                Span::styled(format!(" vs {}", format_amount(baseline)), self.theme.dim),
            ]),
            (Some(baseline), None) => Line::from(Span::styled(
                format!("sin base comparable ({})", format_amount(baseline)),
                self.theme.dim,
            )),
            (None, _) => Line::from(""),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn kpi(current: f64, baseline: Option<f64>, delta_pct: Option<f64>) -> Kpi {
        Kpi {
            current,
            baseline,
            delta_pct,
        }
    }

    #[test]
    fn test_kpi_card_without_baseline() {
        let theme = Theme::dark();
        let k = kpi(12_345.0, None, None);
        let lines = KpiCard::new("Ventas Totales", &k, &theme).to_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]), "Ventas Totales");
        assert_eq!(text(&lines[1]), "$12,345");
        assert!(text(&lines[2]).is_empty());
    }

    #[test]
    fn test_kpi_card_growth() {
        let theme = Theme::dark();
        let k = kpi(150.0, Some(100.0), Some(50.0));
        let lines = KpiCard::new("Ventas Totales", &k, &theme).to_lines();
        assert_eq!(text(&lines[2]), "▲ 50.00% vs $100");
        assert_eq!(lines[2].spans[0].style, theme.delta_up);
    }

    #[test]
    fn test_kpi_card_decline() {
        let theme = Theme::dark();
        let k = kpi(50.0, Some(100.0), Some(-50.0));
        let lines = KpiCard::new("Promedio Diario", &k, &theme).to_lines();
        assert!(text(&lines[2]).starts_with("▼ -50.00%"));
        assert_eq!(lines[2].spans[0].style, theme.delta_down);
    }

    #[test]
    fn test_kpi_card_zero_baseline() {
        let theme = Theme::dark();
        let k = kpi(100.0, Some(0.0), None);
        let lines = KpiCard::new("Ventas Totales", &k, &theme).to_lines();
        assert!(text(&lines[2]).contains("sin base comparable"));
    }
}
