//! "Análisis Comparativo" tab: weekday heatmaps and typical-performance
//! bars, one block per period.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use sales_core::formatting::format_compact;
use sales_data::aggregator::HeatmapMatrix;
use sales_data::analysis::{DashboardSnapshot, PeriodBreakdown};

use crate::components::bars::ValueBar;
use crate::themes::Theme;

/// Render the comparison tab into `area`.
///
/// Without comparison data the primary period fills the whole tab and a hint
/// line explains how to enable comparison mode.
pub fn render_comparison_view(
    frame: &mut Frame,
    area: Rect,
    snapshot: &DashboardSnapshot,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let hint = if snapshot.comparison_empty {
        Span::styled(
            "Sin datos en el período de comparación; se muestra solo el período actual.",
            theme.warning,
        )
    } else if snapshot.comparison.is_none() {
        Span::styled("Pulse 'c' para activar el modo comparativo.", theme.dim)
    } else {
        Span::styled("Período actual vs. período comparado", theme.info)
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), chunks[0]);

    match &snapshot.comparison {
        Some(comparison) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            render_period(frame, columns[0], "Actual", &snapshot.primary, theme);
            render_period(frame, columns[1], "Comparado", comparison, theme);
        }
        None => render_period(frame, chunks[1], "Actual", &snapshot.primary, theme),
    }
}

fn render_period(
    frame: &mut Frame,
    area: Rect,
    name: &str,
    period: &PeriodBreakdown,
    theme: &Theme,
) {
    let heatmap_height = period.heatmap.rows.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(heatmap_height), Constraint::Min(0)])
        .split(area);

    render_heatmap(
        frame,
        chunks[0],
        &format!(" Mapa de calor {} ({}) ", name, period.label),
        &period.heatmap,
        theme,
    );
    render_typical_performance(frame, chunks[1], period, theme);
}

/// Three-letter weekday column header, e.g. `"Mié"`.
fn short_weekday(name: &str) -> String {
    name.chars().take(3).collect()
}

/// Render a store × weekday heatmap. Cells without records stay blank.
pub fn render_heatmap(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    matrix: &HeatmapMatrix,
    theme: &Theme,
) {
    let (min, max) = matrix.value_bounds().unwrap_or((0.0, 0.0));

    let header = Row::new(
        std::iter::once(Cell::from("Tienda").style(theme.table_header)).chain(
            matrix
                .weekdays
                .iter()
                .map(|d| Cell::from(short_weekday(d)).style(theme.table_header)),
        ),
    );

    let rows: Vec<Row> = matrix
        .rows
        .iter()
        .map(|row| {
            let cells = std::iter::once(Cell::from(row.store.clone()).style(theme.label)).chain(
                row.cells.iter().map(|cell| match cell {
                    Some(v) => Cell::from(format_compact(*v)).style(theme.heat_style(*v, min, max)),
                    None => Cell::from(""),
                }),
            );
            Row::new(cells)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(14))
        .chain(std::iter::repeat(Constraint::Length(6)).take(7))
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(Span::styled(title.to_string(), theme.header)),
    );

    frame.render_widget(table, area);
}

fn render_typical_performance(frame: &mut Frame, area: Rect, period: &PeriodBreakdown, theme: &Theme) {
    let max = period
        .typical_performance
        .values()
        .map(|s| s.mean.max(s.median))
        .fold(0.0, f64::max);

    let mut lines: Vec<Line> = Vec::new();
    for (store, summary) in &period.typical_performance {
        lines.push(Line::from(Span::styled(store.clone(), theme.bold)));
        lines.push(ValueBar::new("  media", summary.mean, max, theme.bar_fill, theme).to_line());
        lines.push(
            ValueBar::new("  mediana", summary.median, max, theme.bar_fill_alt, theme).to_line(),
        );
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Sin días con ventas en el período.",
            theme.dim,
        )));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(" Desempeño típico (días con ventas) ", theme.header)),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, snapshot};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(snap: &DashboardSnapshot) -> String {
        let backend = TestBackend::new(140, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_comparison_view(frame, area, snap, &theme);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_short_weekday() {
        assert_eq!(short_weekday("Miércoles"), "Mié");
        assert_eq!(short_weekday("Sábado"), "Sáb");
    }

    #[test]
    fn test_render_primary_only_shows_hint() {
        let out = draw(&snapshot(false));
        assert!(out.contains("modo comparativo"), "{out}");
        assert!(out.contains("Mapa de calor Actual"), "{out}");
        assert!(!out.contains("Mapa de calor Comparado"), "{out}");
        assert!(out.contains("Lun"), "{out}");
        assert!(out.contains("mediana"), "{out}");
    }

    #[test]
    fn test_render_with_comparison_shows_both_periods() {
        let out = draw(&snapshot(true));
        assert!(out.contains("Mapa de calor Actual"), "{out}");
        assert!(out.contains("Mapa de calor Comparado"), "{out}");
    }

    #[test]
    fn test_render_empty_comparison_warns() {
        let mut snap = snapshot(false);
        snap.comparison_empty = true;
        let out = draw(&snap);
        assert!(out.contains("Sin datos en el período de comparación"), "{out}");
    }

    #[test]
    fn test_render_heatmap_missing_cells_blank() {
        use sales_data::aggregator::HeatmapRow;

        let matrix = HeatmapMatrix {
            weekdays: sales_core::calendar::WEEKDAY_NAMES,
            rows: vec![HeatmapRow {
                store: "Centro".to_string(),
                cells: [Some(1_200.0), None, None, None, None, None, Some(35_000.0)],
            }],
        };
        let backend = TestBackend::new(80, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_heatmap(frame, area, " Mapa ", &matrix, &theme);
            })
            .unwrap();
        let out = buffer_text(terminal.backend().buffer());
        assert!(out.contains("1.2k"), "{out}");
        assert!(out.contains("35k"), "{out}");
        assert!(!out.contains("NaN"), "{out}");
        assert!(!out.contains(" 0 "), "{out}");
    }
}
