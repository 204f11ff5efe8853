//! "Explorador de Datos" tab: the filtered records, newest first.
//!
//! Renders a bordered [`ratatui::widgets::Table`] starting at the current
//! scroll offset, with a totals line in the block title.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use sales_core::formatting::{format_amount, format_number};
use sales_data::aggregator::ExplorerRow;

use crate::themes::Theme;

/// Rows that fit in `area` once borders and the header are taken out.
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// Largest useful scroll offset for `total` rows in a viewport of `visible`.
pub fn max_scroll(total: usize, visible: usize) -> usize {
    total.saturating_sub(visible.max(1))
}

/// Render the explorer table into `area`, skipping the first `scroll` rows.
pub fn render_explorer_view(
    frame: &mut Frame,
    area: Rect,
    rows: &[ExplorerRow],
    scroll: usize,
    theme: &Theme,
) {
    let header_cells = ["Fecha", "Tienda", "Ventas", "Día"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let visible = visible_rows(area);
    let start = scroll.min(max_scroll(rows.len(), visible));

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.date_label.clone()),
                Cell::from(row.store.clone()),
                Cell::from(Line::from(format_amount(row.amount)).right_aligned()),
                Cell::from(row.weekday),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(24),
        Constraint::Length(14),
        Constraint::Length(12),
    ];

    let title = format!(
        " Explorador de Datos: {} registros, filas {}-{} ",
        format_number(rows.len() as f64, 0),
        if rows.is_empty() { 0 } else { start + 1 },
        (start + visible).min(rows.len()),
    );

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(title, theme.header)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder for filters that select no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, reason: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No hay datos para los filtros seleccionados", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(reason.to_string(), theme.dim)),
        Line::from(Span::styled(
            "Pulse 'a' para seleccionar todas las tiendas o 'q' para salir",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Dashboard de Ventas "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
