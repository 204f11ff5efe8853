//! "Resumen Gerencial" tab: KPI cards, the monthly trend chart and the
//! store composition bars.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use sales_core::calendar;
use sales_core::formatting::format_amount;
use sales_data::aggregator::MonthlyPoint;
use sales_data::analysis::{DashboardSnapshot, MonthlyTrend, TrendMode};

use crate::components::bars::ShareBar;
use crate::components::kpi_card::KpiCard;
use crate::themes::Theme;

/// Render the summary tab into `area`.
pub fn render_summary_view(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let composition_height = snapshot.composition.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(composition_height.min(12)),
        ])
        .split(area);

    render_kpis(frame, chunks[0], snapshot, theme);
    render_trend_chart(frame, chunks[1], &snapshot.monthly, theme);
    render_composition(frame, chunks[2], snapshot, theme);
}

fn render_kpis(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let cards = [
        ("Ventas Totales", &snapshot.kpis.total_sales),
        ("Promedio Diario", &snapshot.kpis.average_daily_sales),
    ];
    for (column, (title, kpi)) in columns.iter().zip(cards) {
        let mut lines = KpiCard::new(title, kpi, theme).to_lines();
        if snapshot.comparison_empty {
            lines[2] = Line::from(Span::styled(
                "sin datos en el período de comparación",
                theme.warning,
            ));
        }
        frame.render_widget(
            Paragraph::new(Text::from(lines)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.table_border),
            ),
            *column,
        );
    }
}

/// X coordinate of a point: its position in a chronological series, or its
/// calendar month when periods are overlaid.
fn x_of(mode: TrendMode, index: usize, point: &MonthlyPoint) -> f64 {
    match mode {
        TrendMode::Chronological => index as f64,
        TrendMode::CalendarMonth => point.month_number as f64,
    }
}

fn to_points(mode: TrendMode, series: &[MonthlyPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| (x_of(mode, i, p), p.total))
        .collect()
}

fn render_trend_chart(frame: &mut Frame, area: Rect, trend: &MonthlyTrend, theme: &Theme) {
    let primary = to_points(trend.mode, &trend.primary);
    let comparison = trend
        .comparison
        .as_deref()
        .map(|series| to_points(trend.mode, series))
        .unwrap_or_default();

    let all = primary.iter().chain(comparison.iter());
    let x_min = all.clone().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = all.clone().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_max = all.map(|p| p.1).fold(0.0, f64::max);
    let (x_min, x_max) = if x_min.is_finite() && x_max > x_min {
        (x_min, x_max)
    } else {
        (x_min.min(0.0), x_min.max(0.0) + 1.0)
    };
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let label_at = |x: f64| -> String {
        match trend.mode {
            TrendMode::CalendarMonth => calendar::month_name(x as u32).unwrap_or("").to_string(),
            TrendMode::Chronological => trend
                .primary
                .get(x as usize)
                .map(|p| p.label.clone())
                .unwrap_or_default(),
        }
    };
    let x_labels = vec![Span::raw(label_at(x_min)), Span::raw(label_at(x_max))];
    let y_labels = vec![
        Span::raw("$0"),
        Span::raw(format_amount(y_top / 2.0)),
        Span::raw(format_amount(y_top)),
    ];

    let mut datasets = vec![Dataset::default()
        .name("Período actual")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.series_primary)
        .data(&primary)];
    if trend.comparison.is_some() {
        datasets.push(
            Dataset::default()
                .name("Período comparado")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.series_comparison)
                .data(&comparison),
        );
    }

    let title = match trend.mode {
        TrendMode::Chronological => " Tendencia Mensual ",
        TrendMode::CalendarMonth => " Tendencia Mensual (mes a mes) ",
    };

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(title, theme.header)),
        )
        .x_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, y_top])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn render_composition(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let lines: Vec<Line> = snapshot
        .composition
        .iter()
        .map(|share| ShareBar::new(&share.store, share.share_pct, share.sum, theme).to_line())
        .collect();

    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(" Participación por Tienda ", theme.header)),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
