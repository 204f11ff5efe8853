use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calendar::{self, DateRange};

/// What the loader does with a row that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Reject the whole load on the first bad row.
    #[default]
    Abort,
    /// Drop the bad row, log it, and keep loading.
    Skip,
}

impl RowErrorPolicy {
    /// Parse `"abort"` / `"skip"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "abort" => Some(Self::Abort),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// One daily sales observation for one store, as read from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the sales (time of day already discarded).
    pub date: NaiveDate,
    /// Store identifier.
    pub store: String,
    /// Non-negative sales amount.
    pub amount: f64,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, store: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            store: store.into(),
            amount,
        }
    }
}

/// A [`SalesRecord`] plus the calendar attributes derived from its date.
///
/// The derived fields are private and only ever computed from `date`, so
/// they can never drift from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    record: SalesRecord,
    year: i32,
    month_number: u32,
    month_name: &'static str,
    weekday_name: &'static str,
    year_month_key: String,
}

impl EnrichedRecord {
    /// Derive every calendar attribute from `record.date`.
    pub fn enrich(record: SalesRecord) -> Self {
        let date = record.date;
        let month_number = date.month();
        Self {
            year: date.year(),
            month_number,
            // `NaiveDate::month` is always 1–12.
            month_name: calendar::MONTH_NAMES[(month_number - 1) as usize],
            weekday_name: calendar::weekday_name(date.weekday()),
            year_month_key: calendar::year_month_key(date),
            record,
        }
    }

    pub fn record(&self) -> &SalesRecord {
        &self.record
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn store(&self) -> &str {
        &self.record.store
    }

    pub fn amount(&self) -> f64 {
        self.record.amount
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1–12.
    pub fn month_number(&self) -> u32 {
        self.month_number
    }

    pub fn month_name(&self) -> &'static str {
        self.month_name
    }

    pub fn weekday(&self) -> Weekday {
        self.record.date.weekday()
    }

    pub fn weekday_name(&self) -> &'static str {
        self.weekday_name
    }

    pub fn year_month_key(&self) -> &str {
        &self.year_month_key
    }
}

impl From<SalesRecord> for EnrichedRecord {
    fn from(record: SalesRecord) -> Self {
        Self::enrich(record)
    }
}

/// The full, read-only set of enriched records built once per load.
///
/// No uniqueness is enforced on `(date, store)`: duplicate rows are
/// legitimate and are summed by the aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    records: Vec<EnrichedRecord>,
}

impl Dataset {
    /// Enrich `records` and keep them in `(date, store)` order.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut records: Vec<EnrichedRecord> =
            records.into_iter().map(EnrichedRecord::enrich).collect();
        records.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.store().cmp(b.store())));
        Self { records }
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest dates present, or `None` for an empty dataset.
    pub fn date_span(&self) -> Option<DateRange> {
        let first = self.records.first()?.date();
        let last = self.records.last()?.date();
        Some(DateRange {
            start: first,
            end: last,
        })
    }

    /// Sorted, de-duplicated store identifiers.
    pub fn stores(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.store().to_string()).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
