//! Sales aggregation over a filtered view.
//!
//! Every operation is a pure function of a [`FilteredView`]; none of them
//! keep state between calls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sales_core::calendar::{self, WEEKDAY_NAMES};
use sales_core::error::{Result, SalesError};
use sales_core::stats::{self, Summary};
use serde::Serialize;

use crate::filter::FilteredView;

// ── Result shapes ─────────────────────────────────────────────────────────────

/// One point of a monthly sales series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// Present for chronological series, absent when months of different
    /// years are overlaid.
    pub year: Option<i32>,
    pub month_number: u32,
    /// `"2024-03"` for chronological series, `"Mar"` for overlays.
    pub label: String,
    pub total: f64,
}

/// One store's slice of the period total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreShare {
    pub store: String,
    pub sum: f64,
    /// Percentage of the view total, 0–100.
    pub share_pct: f64,
}

/// One store's row of the weekday heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub store: String,
    /// Mean amount per weekday, Monday first. `None` where the store has no
    /// records on that weekday.
    pub cells: [Option<f64>; 7],
}

/// Store × weekday matrix of mean amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub weekdays: [&'static str; 7],
    pub rows: Vec<HeatmapRow>,
}

impl HeatmapMatrix {
    /// Smallest and largest defined cell, for colour scaling.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter().flatten().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// One line of the record explorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerRow {
    pub date: NaiveDate,
    /// `dd/mm/yyyy`.
    pub date_label: String,
    pub store: String,
    pub amount: f64,
    pub weekday: &'static str,
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless aggregator; all methods are associated functions.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Sum of every amount in the view.
    pub fn total_sales(view: &FilteredView<'_>) -> f64 {
        view.amounts().sum()
    }

    /// Mean of per-day totals: amounts are first summed across stores for
    /// each date, then those daily sums are averaged.
    pub fn average_daily_sales(view: &FilteredView<'_>) -> f64 {
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in view.records() {
            *by_day.entry(record.date()).or_insert(0.0) += record.amount();
        }
        let daily: Vec<f64> = by_day.into_values().collect();
        stats::mean(&daily).unwrap_or(0.0)
    }

    /// `(current - baseline) / baseline * 100`.
    ///
    /// A zero (or non-finite) baseline is [`SalesError::NotComparable`].
    pub fn period_over_period_delta(current: f64, baseline: f64) -> Result<f64> {
        if baseline == 0.0 || !baseline.is_finite() || !current.is_finite() {
            return Err(SalesError::NotComparable { current, baseline });
        }
        Ok((current - baseline) / baseline * 100.0)
    }

    /// Per-store mean and median over non-zero amounts.
    ///
    /// Stores whose every record is zero get no entry.
    pub fn typical_performance_by_store(view: &FilteredView<'_>) -> BTreeMap<String, Summary> {
        let mut by_store: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in view.records().iter().filter(|r| r.amount() != 0.0) {
            by_store
                .entry(record.store())
                .or_default()
                .push(record.amount());
        }
        by_store
            .into_iter()
            .filter_map(|(store, amounts)| {
                Summary::from_values(&amounts).map(|s| (store.to_string(), s))
            })
            .collect()
    }

    /// Mean amount for each (store, weekday), zero-amount records included.
    pub fn heatmap_matrix(view: &FilteredView<'_>) -> HeatmapMatrix {
        let mut sums: BTreeMap<&str, [(f64, usize); 7]> = BTreeMap::new();
        for record in view.records() {
            let col = record.weekday().num_days_from_monday() as usize;
            let cell = &mut sums.entry(record.store()).or_insert([(0.0, 0); 7])[col];
            cell.0 += record.amount();
            cell.1 += 1;
        }

        let rows = sums
            .into_iter()
            .map(|(store, cells)| HeatmapRow {
                store: store.to_string(),
                cells: cells.map(|(sum, count)| (count > 0).then(|| sum / count as f64)),
            })
            .collect();

        HeatmapMatrix {
            weekdays: WEEKDAY_NAMES,
            rows,
        }
    }

    /// Monthly totals in chronological order, keyed by `"YYYY-MM"`.
    pub fn monthly_series(view: &FilteredView<'_>) -> Vec<MonthlyPoint> {
        let mut by_month: BTreeMap<&str, (i32, u32, f64)> = BTreeMap::new();
        for record in view.records() {
            by_month
                .entry(record.year_month_key())
                .or_insert((record.year(), record.month_number(), 0.0))
                .2 += record.amount();
        }
        by_month
            .into_iter()
            .map(|(key, (year, month_number, total))| MonthlyPoint {
                year: Some(year),
                month_number,
                label: key.to_string(),
                total,
            })
            .collect()
    }

    /// Monthly totals keyed by calendar month only, January first, so two
    /// periods from different years line up month by month.
    pub fn monthly_series_by_calendar_month(view: &FilteredView<'_>) -> Vec<MonthlyPoint> {
        let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();
        for record in view.records() {
            *by_month.entry(record.month_number()).or_insert(0.0) += record.amount();
        }
        by_month
            .into_iter()
            .map(|(month_number, total)| MonthlyPoint {
                year: None,
                month_number,
                label: calendar::month_name(month_number)
                    .unwrap_or_default()
                    .to_string(),
                total,
            })
            .collect()
    }

    /// Per-store totals with their share of the view total, largest first.
    pub fn store_composition(view: &FilteredView<'_>) -> Vec<StoreShare> {
        let total = Self::total_sales(view);
        let mut by_store: BTreeMap<&str, f64> = BTreeMap::new();
        for record in view.records() {
            *by_store.entry(record.store()).or_insert(0.0) += record.amount();
        }

        let mut shares: Vec<StoreShare> = by_store
            .into_iter()
            .map(|(store, sum)| StoreShare {
                store: store.to_string(),
                sum,
                share_pct: if total > 0.0 { sum / total * 100.0 } else { 0.0 },
            })
            .collect();
        // BTreeMap order already breaks ties by store name; sort is stable.
        shares.sort_by(|a, b| b.sum.total_cmp(&a.sum));
        shares
    }

    /// The view's records, newest first, then by store.
    pub fn explorer_rows(view: &FilteredView<'_>) -> Vec<ExplorerRow> {
        let mut rows: Vec<ExplorerRow> = view
            .records()
            .iter()
            .map(|r| ExplorerRow {
                date: r.date(),
                date_label: calendar::format_day_first(r.date()),
                store: r.store().to_string(),
                amount: r.amount(),
                weekday: r.weekday_name(),
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.store.cmp(&b.store)));
        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, FilterSpec};
    use sales_core::models::{Dataset, SalesRecord};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(records: Vec<(NaiveDate, &str, f64)>) -> Dataset {
        Dataset::from_records(
            records
                .into_iter()
                .map(|(d, s, a)| SalesRecord::new(d, s, a))
                .collect(),
        )
    }

    fn all_of(ds: &Dataset) -> FilteredView<'_> {
        filter(ds, &FilterSpec::all(ds).unwrap()).unwrap()
    }

    // ── Totals ────────────────────────────────────────────────────────────────

    #[test]
    fn test_total_sales() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 100.0),
            (ymd(2024, 1, 2), "B", 250.0),
        ]);
        assert_eq!(SalesAggregator::total_sales(&all_of(&ds)), 350.0);
    }

    #[test]
    fn test_average_daily_sums_stores_first() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 100.0),
            (ymd(2024, 1, 1), "B", 100.0),
        ]);
        assert_eq!(SalesAggregator::average_daily_sales(&all_of(&ds)), 200.0);
    }

    #[test]
    fn test_average_daily_across_days() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 100.0),
            (ymd(2024, 1, 1), "B", 50.0),
            (ymd(2024, 1, 2), "A", 50.0),
        ]);
        // Daily totals 150 and 50.
        assert_eq!(SalesAggregator::average_daily_sales(&all_of(&ds)), 100.0);
    }

    #[test]
    fn test_duplicate_rows_are_summed() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 10.0),
            (ymd(2024, 1, 1), "A", 15.0),
        ]);
        let view = all_of(&ds);
        assert_eq!(SalesAggregator::total_sales(&view), 25.0);
        assert_eq!(SalesAggregator::average_daily_sales(&view), 25.0);
    }

    // ── Delta ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_delta_basic() {
        assert_eq!(SalesAggregator::period_over_period_delta(150.0, 100.0).unwrap(), 50.0);
        assert_eq!(SalesAggregator::period_over_period_delta(50.0, 100.0).unwrap(), -50.0);
    }

    #[test]
    fn test_delta_zero_baseline_not_comparable() {
        let err = SalesAggregator::period_over_period_delta(100.0, 0.0).unwrap_err();
        assert!(matches!(err, SalesError::NotComparable { .. }));
        assert!(SalesAggregator::period_over_period_delta(0.0, 0.0).is_err());
    }

    // ── Typical performance ───────────────────────────────────────────────────

    #[test]
    fn test_typical_performance_excludes_zeros() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 0.0),
            (ymd(2024, 1, 2), "A", 0.0),
            (ymd(2024, 1, 3), "A", 100.0),
        ]);
        let perf = SalesAggregator::typical_performance_by_store(&all_of(&ds));
        let a = perf["A"];
        assert_eq!(a.mean, 100.0);
        assert_eq!(a.median, 100.0);
        assert_eq!(a.count, 1);
    }

    #[test]
    fn test_typical_performance_all_zero_store_has_no_entry() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 0.0),
            (ymd(2024, 1, 1), "B", 40.0),
            (ymd(2024, 1, 2), "B", 60.0),
        ]);
        let perf = SalesAggregator::typical_performance_by_store(&all_of(&ds));
        assert!(!perf.contains_key("A"));
        assert_eq!(perf["B"].mean, 50.0);
        assert_eq!(perf["B"].median, 50.0);
        assert!(perf.values().all(|s| s.mean.is_finite()));
    }

    // ── Heatmap ───────────────────────────────────────────────────────────────

    #[test]
    fn test_heatmap_includes_zeros() {
        // Mon, Tue, Wed.
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 0.0),
            (ymd(2024, 1, 2), "A", 0.0),
            (ymd(2024, 1, 3), "A", 100.0),
        ]);
        let matrix = SalesAggregator::heatmap_matrix(&all_of(&ds));
        assert_eq!(matrix.rows.len(), 1);
        let cells = matrix.rows[0].cells;
        assert_eq!(cells[0], Some(0.0));
        assert_eq!(cells[1], Some(0.0));
        assert_eq!(cells[2], Some(100.0));
        assert!(cells[3..].iter().all(Option::is_none));
    }

    #[test]
    fn test_heatmap_means_and_fixed_column_order() {
        // 2024-01-07 and 2024-01-14 are Sundays; data arrives Sunday first.
        let ds = dataset(vec![
            (ymd(2024, 1, 7), "B", 10.0),
            (ymd(2024, 1, 14), "B", 30.0),
            (ymd(2024, 1, 8), "A", 5.0),
        ]);
        let matrix = SalesAggregator::heatmap_matrix(&all_of(&ds));
        assert_eq!(matrix.weekdays[0], "Lunes");
        assert_eq!(matrix.weekdays[6], "Domingo");
        let stores: Vec<&str> = matrix.rows.iter().map(|r| r.store.as_str()).collect();
        assert_eq!(stores, vec!["A", "B"]);
        assert_eq!(matrix.rows[0].cells[0], Some(5.0));
        assert_eq!(matrix.rows[1].cells[6], Some(20.0));
        assert_eq!(matrix.rows[1].cells[0], None);
        assert_eq!(matrix.value_bounds(), Some((5.0, 20.0)));
    }

    // ── Monthly series ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_series_chronological() {
        let ds = dataset(vec![
            (ymd(2024, 2, 1), "A", 5.0),
            (ymd(2023, 12, 31), "A", 10.0),
            (ymd(2024, 2, 20), "B", 7.0),
        ]);
        let series = SalesAggregator::monthly_series(&all_of(&ds));
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-02"]);
        assert_eq!(series[1].total, 12.0);
        assert_eq!(series[0].year, Some(2023));
    }

    #[test]
    fn test_monthly_series_keys_are_record_year_month_keys() {
        let ds = dataset(vec![
            (ymd(2024, 1, 9), "A", 1.0),
            (ymd(2024, 10, 3), "A", 2.0),
            (ymd(2024, 10, 30), "B", 3.0),
        ]);
        let view = all_of(&ds);
        let labels: Vec<String> = SalesAggregator::monthly_series(&view)
            .into_iter()
            .map(|p| p.label)
            .collect();
        let mut keys: Vec<String> = ds
            .records()
            .iter()
            .map(|r| r.year_month_key().to_string())
            .collect();
        keys.dedup();
        assert_eq!(labels, keys);
        assert_eq!(labels, vec!["2024-01", "2024-10"]);
    }

    #[test]
    fn test_monthly_series_by_calendar_month_drops_year() {
        let ds = dataset(vec![
            (ymd(2023, 3, 1), "A", 5.0),
            (ymd(2024, 3, 1), "A", 7.0),
            (ymd(2023, 12, 1), "A", 1.0),
        ]);
        let series = SalesAggregator::monthly_series_by_calendar_month(&all_of(&ds));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Mar");
        assert_eq!(series[0].total, 12.0);
        assert_eq!(series[0].year, None);
        assert_eq!(series[1].label, "Dic");
    }

    #[test]
    fn test_monthly_series_sums_to_total() {
        let ds = dataset(vec![
            (ymd(2023, 11, 5), "A", 120.0),
            (ymd(2023, 12, 24), "B", 75.0),
            (ymd(2024, 1, 1), "A", 0.0),
            (ymd(2024, 1, 2), "B", 310.0),
            (ymd(2024, 2, 29), "A", 42.0),
        ]);
        let view = all_of(&ds);
        let total = SalesAggregator::total_sales(&view);
        let chrono_sum: f64 = SalesAggregator::monthly_series(&view)
            .iter()
            .map(|p| p.total)
            .sum();
        let calendar_sum: f64 = SalesAggregator::monthly_series_by_calendar_month(&view)
            .iter()
            .map(|p| p.total)
            .sum();
        assert_eq!(chrono_sum, total);
        assert_eq!(calendar_sum, total);
    }

    // ── Composition and explorer ──────────────────────────────────────────────

    #[test]
    fn test_store_composition_sorted_with_shares() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "A", 25.0),
            (ymd(2024, 1, 1), "B", 50.0),
            (ymd(2024, 1, 2), "C", 25.0),
        ]);
        let comp = SalesAggregator::store_composition(&all_of(&ds));
        let stores: Vec<&str> = comp.iter().map(|s| s.store.as_str()).collect();
        assert_eq!(stores, vec!["B", "A", "C"]);
        assert_eq!(comp[0].share_pct, 50.0);
        assert_eq!(comp[1].share_pct, 25.0);
    }

    #[test]
    fn test_store_composition_all_zero() {
        let ds = dataset(vec![(ymd(2024, 1, 1), "A", 0.0)]);
        let comp = SalesAggregator::store_composition(&all_of(&ds));
        assert_eq!(comp[0].share_pct, 0.0);
    }

    #[test]
    fn test_explorer_rows_newest_first() {
        let ds = dataset(vec![
            (ymd(2024, 1, 1), "B", 1.0),
            (ymd(2024, 1, 10), "A", 2.0),
            (ymd(2024, 1, 1), "A", 3.0),
        ]);
        let rows = SalesAggregator::explorer_rows(&all_of(&ds));
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.date_label.as_str(), r.store.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("10/01/2024", "A"), ("01/01/2024", "A"), ("01/01/2024", "B")]
        );
        assert_eq!(rows[0].weekday, "Miércoles");
    }
}
