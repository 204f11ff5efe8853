//! Sales source loading.
//!
//! Reads a workbook sheet (via `calamine`) or a CSV file (via `csv`) with a
//! date, store and amount column and turns it into a [`Dataset`]. Both
//! formats are first lowered to rows of [`Cell`]s so header matching and
//! per-row validation are shared.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use sales_core::calendar::DateParser;
use sales_core::error::{Result, SalesError};
use sales_core::models::{Dataset, RowErrorPolicy, SalesRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

const DATE_HEADERS: &[&str] = &["fecha", "date"];
const STORE_HEADERS: &[&str] = &["tienda", "store"];
const AMOUNT_HEADERS: &[&str] = &["ventas", "amount", "sales"];

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A single source cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// A cell the source itself typed as a date: spreadsheet serial days.
    Serial(f64),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn header_name(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.trim().to_lowercase()),
            _ => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => Cell::Serial(dt.as_f64()),
            Data::Error(e) => Cell::Text(format!("#{e:?}")),
        }
    }
}

// ── LoadReport ────────────────────────────────────────────────────────────────

/// Which reader handled the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// `.csv` (any case) is CSV; everything else goes through the workbook
    /// reader, which sniffs xlsx/xls/ods itself.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SourceFormat::Csv,
            _ => SourceFormat::Workbook,
        }
    }
}

/// What happened during a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub source: PathBuf,
    pub format: SourceFormat,
    /// Non-blank data rows seen after the header.
    pub rows_read: usize,
    pub rows_loaded: usize,
    /// Rows dropped under [`RowErrorPolicy::Skip`].
    pub rows_skipped: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `path` into a [`Dataset`].
///
/// `sheet` names the worksheet for workbook sources and is ignored for CSV.
pub fn load_dataset(
    path: &Path,
    sheet: &str,
    policy: RowErrorPolicy,
) -> Result<(Dataset, LoadReport)> {
    if !path.is_file() {
        return Err(SalesError::SourceNotFound(path.to_path_buf()));
    }

    let format = SourceFormat::from_path(path);
    debug!(path = %path.display(), ?format, "loading sales source");

    let rows = match format {
        SourceFormat::Csv => read_csv_rows(path)?,
        SourceFormat::Workbook => read_workbook_rows(path, sheet)?,
    };

    let source_name = path.display().to_string();
    let (records, counts) = parse_rows(&source_name, rows, policy)?;
    let dataset = Dataset::from_records(records);

    let report = LoadReport {
        source: path.to_path_buf(),
        format,
        rows_read: counts.rows_read,
        rows_loaded: dataset.len(),
        rows_skipped: counts.rows_skipped,
    };

    info!(
        "Loaded {} sales rows from {} ({} skipped)",
        report.rows_loaded, source_name, report.rows_skipped
    );

    Ok((dataset, report))
}

/// Row counters produced by [`parse_rows`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Turn raw cell rows (header first) into validated records.
///
/// Rows are numbered the way a spreadsheet numbers them: the first row of
/// `rows` is row 1.
pub fn parse_rows<I>(
    source_name: &str,
    rows: I,
    policy: RowErrorPolicy,
) -> Result<(Vec<SalesRecord>, RowCounts)>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let malformed = |reason: String| SalesError::MalformedSource {
        source_name: source_name.to_string(),
        reason,
    };

    let mut rows = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| (idx + 1, row))
        .filter(|(_, row)| !row.iter().all(Cell::is_blank));

    let Some((_, header)) = rows.next() else {
        return Err(malformed("source has no header row".to_string()));
    };
    let columns = ColumnMap::from_header(&header).map_err(malformed)?;

    let mut records = Vec::new();
    let mut counts = RowCounts::default();

    for (row_number, row) in rows {
        counts.rows_read += 1;
        match columns.parse_row(row_number, &row) {
            Ok(record) => records.push(record),
            Err(err) => match policy {
                RowErrorPolicy::Abort => return Err(malformed(err.to_string())),
                RowErrorPolicy::Skip => {
                    warn!(source = source_name, "skipping bad row: {}", err);
                    counts.rows_skipped += 1;
                }
            },
        }
    }

    if records.is_empty() {
        return Err(malformed("no valid sales rows".to_string()));
    }

    Ok((records, counts))
}

// ── Format readers ────────────────────────────────────────────────────────────

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let source_name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SalesError::MalformedSource {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SalesError::MalformedSource {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>> {
    let source_name = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| SalesError::MalformedSource {
        source_name: source_name.clone(),
        reason: format!("cannot open workbook: {e}"),
    })?;

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| SalesError::MalformedSource {
            source_name: source_name.clone(),
            reason: format!("cannot read worksheet '{sheet}': {e}"),
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect())
}

// ── Column mapping and row validation ─────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    store: usize,
    amount: usize,
}

impl ColumnMap {
    fn from_header(header: &[Cell]) -> std::result::Result<Self, String> {
        let names: Vec<Option<String>> = header.iter().map(Cell::header_name).collect();
        let find = |aliases: &[&str]| {
            names
                .iter()
                .position(|n| n.as_deref().is_some_and(|n| aliases.contains(&n)))
        };

        let date = find(DATE_HEADERS);
        let store = find(STORE_HEADERS);
        let amount = find(AMOUNT_HEADERS);

        match (date, store, amount) {
            (Some(date), Some(store), Some(amount)) => Ok(Self {
                date,
                store,
                amount,
            }),
            _ => {
                let missing: Vec<&str> = [
                    (date, DATE_HEADERS[0]),
                    (store, STORE_HEADERS[0]),
                    (amount, AMOUNT_HEADERS[0]),
                ]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name)
                .collect();
                Err(format!("missing required column(s): {}", missing.join(", ")))
            }
        }
    }

    fn parse_row(&self, row_number: usize, row: &[Cell]) -> Result<SalesRecord> {
        let row_error = |reason: String| SalesError::MalformedRow {
            row: row_number,
            reason,
        };
        let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

        let date = parse_date_cell(cell(self.date)).map_err(row_error)?;
        let store = parse_store_cell(cell(self.store)).map_err(row_error)?;
        let amount = parse_amount_cell(cell(self.amount)).map_err(row_error)?;

        Ok(SalesRecord::new(date, store, amount))
    }
}

/// Plain numbers below this are bare years or day counts, not dates.
/// Date-typed workbook cells are exempt.
const MIN_PLAIN_SERIAL: f64 = 10_000.0;

fn parse_date_cell(cell: &Cell) -> std::result::Result<chrono::NaiveDate, String> {
    let parsed = match cell {
        Cell::Empty => return Err("missing date".to_string()),
        Cell::Serial(serial) => DateParser::from_serial(*serial),
        Cell::Number(serial) => plain_serial(*serial),
        Cell::Text(text) => DateParser::parse(text).or_else(|err| {
            // Serial numbers exported as text.
            match parse_serial_text(text) {
                Some(serial) => plain_serial(serial),
                None => Err(err),
            }
        }),
    };
    parsed.map_err(|e| e.to_string())
}

fn plain_serial(serial: f64) -> Result<chrono::NaiveDate> {
    if serial < MIN_PLAIN_SERIAL {
        return Err(SalesError::InvalidDate(serial.to_string()));
    }
    DateParser::from_serial(serial)
}

/// Digits with an optional fractional part, e.g. `45366` or `45366.5`.
fn parse_serial_text(text: &str) -> Option<f64> {
    let text = text.trim();
    let (int, frac) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if int.is_empty() || !all_digits(int) || !all_digits(frac) {
        return None;
    }
    text.parse().ok()
}

fn parse_store_cell(cell: &Cell) -> std::result::Result<String, String> {
    match cell {
        Cell::Text(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Cell::Number(n) if n.fract() == 0.0 => Ok(format!("{}", *n as i64)),
        Cell::Number(n) => Ok(n.to_string()),
        _ => Err("missing store".to_string()),
    }
}

fn parse_amount_cell(cell: &Cell) -> std::result::Result<f64, String> {
    let amount = match cell {
        Cell::Empty => return Err("missing amount".to_string()),
        Cell::Number(n) | Cell::Serial(n) => *n,
        Cell::Text(text) => parse_amount_text(text)
            .ok_or_else(|| format!("amount is not a number: '{}'", text.trim()))?,
    };

    if !amount.is_finite() {
        return Err(format!("amount is not finite: {amount}"));
    }
    if amount < 0.0 {
        return Err(format!("amount is negative: {amount}"));
    }
    Ok(amount)
}

/// `"$1,234.50"` → `1234.5`. Commas are only accepted as thousands
/// separators in the integer part, so decimal-comma text is rejected.
fn parse_amount_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();
    let (int, frac) = match cleaned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (cleaned.as_str(), None),
    };
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    if int.contains(',') {
        let mut groups = int.trim_start_matches(|c: char| c == '-' || c == '+').split(',');
        let lead = groups.next()?;
        if lead.is_empty() || lead.len() > 3 || groups.any(|g| g.len() != 3) {
            return None;
        }
    }
    let digits = int.replace(',', "");
    match frac {
        Some(frac) => format!("{digits}.{frac}").parse().ok(),
        None => digits.parse().ok(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
