//! Dashboard pipeline: filter the dataset for both periods and run every
//! aggregate the dashboard shows, returning one [`DashboardSnapshot`].

use std::collections::BTreeMap;

use chrono::Utc;
use sales_core::calendar::DateRange;
use sales_core::error::Result;
use sales_core::models::Dataset;
use sales_core::stats::Summary;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{
    ExplorerRow, HeatmapMatrix, MonthlyPoint, SalesAggregator, StoreShare,
};
use crate::filter::{filter, FilterSpec, FilteredView};

// ── Filters ───────────────────────────────────────────────────────────────────

/// Everything the user can choose on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilters {
    pub primary: FilterSpec,
    /// Comparison mode toggle.
    pub compare: bool,
    /// Explicit comparison range; one year before `primary` when `None`.
    pub comparison_range: Option<DateRange>,
}

impl DashboardFilters {
    /// Full data span, every store, no comparison.
    pub fn for_dataset(dataset: &Dataset) -> Option<Self> {
        Some(Self {
            primary: FilterSpec::all(dataset)?,
            compare: false,
            comparison_range: None,
        })
    }

    /// The comparison filter when comparison mode is on.
    pub fn comparison_spec(&self) -> Option<FilterSpec> {
        self.compare
            .then(|| self.primary.comparison(self.comparison_range))
    }
}

// ── Snapshot types ────────────────────────────────────────────────────────────

/// A headline figure with its optional comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub current: f64,
    pub baseline: Option<f64>,
    /// `None` without a baseline or when the baseline is zero.
    pub delta_pct: Option<f64>,
}

impl Kpi {
    fn new(current: f64, baseline: Option<f64>) -> Self {
        let delta_pct = baseline.and_then(|b| {
            SalesAggregator::period_over_period_delta(current, b)
                .map_err(|e| debug!("delta omitted: {}", e))
                .ok()
        });
        Self {
            current,
            baseline,
            delta_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_sales: Kpi,
    pub average_daily_sales: Kpi,
}

/// How the monthly trend is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMode {
    /// `"YYYY-MM"`, one period.
    Chronological,
    /// Calendar month only, both periods overlaid.
    CalendarMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub mode: TrendMode,
    pub primary: Vec<MonthlyPoint>,
    pub comparison: Option<Vec<MonthlyPoint>>,
}

/// Per-period breakdowns shown side by side in comparison mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBreakdown {
    pub range: DateRange,
    pub label: String,
    pub record_count: usize,
    pub heatmap: HeatmapMatrix,
    pub typical_performance: BTreeMap<String, Summary>,
}

impl PeriodBreakdown {
    fn from_view(view: &FilteredView<'_>) -> Self {
        let range = view.spec().date_range;
        Self {
            range,
            label: range.label(),
            record_count: view.len(),
            heatmap: SalesAggregator::heatmap_matrix(view),
            typical_performance: SalesAggregator::typical_performance_by_store(view),
        }
    }
}

/// Everything the dashboard renders for one set of filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// RFC 3339 timestamp of the computation.
    pub generated_at: String,
    pub filters: DashboardFilters,
    pub kpis: KpiSet,
    pub monthly: MonthlyTrend,
    pub composition: Vec<StoreShare>,
    pub primary: PeriodBreakdown,
    pub comparison: Option<PeriodBreakdown>,
    /// Comparison mode was on but the comparison period had no records.
    pub comparison_empty: bool,
    pub explorer: Vec<ExplorerRow>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the whole pipeline for `filters`.
///
/// An empty primary view is an error ([`SalesError::EmptyFilterResult`]);
/// an empty comparison view only drops the comparison sections.
///
/// [`SalesError::EmptyFilterResult`]: sales_core::error::SalesError::EmptyFilterResult
pub fn build_snapshot(dataset: &Dataset, filters: &DashboardFilters) -> Result<DashboardSnapshot> {
    // ── Step 1: Views ─────────────────────────────────────────────────────────
    let primary = filter(dataset, &filters.primary)?;

    let comparison = match filters.comparison_spec() {
        None => None,
        Some(spec) => match filter(dataset, &spec) {
            Ok(view) => Some(view),
            Err(e) if e.is_empty_result() => {
                debug!("comparison period dropped: {}", e);
                None
            }
            Err(e) => return Err(e),
        },
    };
    let comparison_empty = filters.compare && comparison.is_none();

    // ── Step 2: KPIs ──────────────────────────────────────────────────────────
    let kpis = KpiSet {
        total_sales: Kpi::new(
            SalesAggregator::total_sales(&primary),
            comparison.as_ref().map(SalesAggregator::total_sales),
        ),
        average_daily_sales: Kpi::new(
            SalesAggregator::average_daily_sales(&primary),
            comparison.as_ref().map(SalesAggregator::average_daily_sales),
        ),
    };

    // ── Step 3: Monthly trend ─────────────────────────────────────────────────
    let monthly = match &comparison {
        Some(comp) => MonthlyTrend {
            mode: TrendMode::CalendarMonth,
            primary: SalesAggregator::monthly_series_by_calendar_month(&primary),
            comparison: Some(SalesAggregator::monthly_series_by_calendar_month(comp)),
        },
        None => MonthlyTrend {
            mode: TrendMode::Chronological,
            primary: SalesAggregator::monthly_series(&primary),
            comparison: None,
        },
    };

    // ── Step 4: Assemble ──────────────────────────────────────────────────────
    let snapshot = DashboardSnapshot {
        generated_at: Utc::now().to_rfc3339(),
        filters: filters.clone(),
        kpis,
        monthly,
        composition: SalesAggregator::store_composition(&primary),
        primary: PeriodBreakdown::from_view(&primary),
        comparison: comparison.as_ref().map(PeriodBreakdown::from_view),
        comparison_empty,
        explorer: SalesAggregator::explorer_rows(&primary),
    };

    debug!(
        "Snapshot built: {} primary records, comparison={}",
        snapshot.primary.record_count,
        snapshot.comparison.is_some()
    );

    Ok(snapshot)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_core::error::SalesError;
    use sales_core::models::SalesRecord;
    use std::collections::BTreeSet;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            SalesRecord::new(ymd(2023, 3, 1), "Centro", 100.0),
            SalesRecord::new(ymd(2023, 3, 2), "Norte", 0.0),
            SalesRecord::new(ymd(2024, 3, 1), "Centro", 150.0),
            SalesRecord::new(ymd(2024, 3, 1), "Norte", 50.0),
            SalesRecord::new(ymd(2024, 4, 2), "Centro", 40.0),
        ])
    }

    fn filters_2024(compare: bool) -> DashboardFilters {
        let ds = dataset();
        DashboardFilters {
            primary: FilterSpec::new(range(ymd(2024, 1, 1), ymd(2024, 12, 31)), ds.stores()),
            compare,
            comparison_range: None,
        }
    }

    #[test]
    fn test_snapshot_without_comparison() {
        let ds = dataset();
        let snap = build_snapshot(&ds, &filters_2024(false)).unwrap();

        assert_eq!(snap.kpis.total_sales.current, 240.0);
        assert_eq!(snap.kpis.total_sales.baseline, None);
        assert_eq!(snap.kpis.total_sales.delta_pct, None);
        // Daily totals 200 and 40.
        assert_eq!(snap.kpis.average_daily_sales.current, 120.0);
        assert_eq!(snap.monthly.mode, TrendMode::Chronological);
        assert_eq!(snap.monthly.primary.len(), 2);
        assert!(snap.comparison.is_none());
        assert!(!snap.comparison_empty);
        assert_eq!(snap.explorer.len(), 3);
        assert_eq!(snap.composition[0].store, "Centro");
    }

    #[test]
    fn test_snapshot_with_default_comparison() {
        let ds = dataset();
        let snap = build_snapshot(&ds, &filters_2024(true)).unwrap();

        let total = &snap.kpis.total_sales;
        assert_eq!(total.baseline, Some(100.0));
        let delta = total.delta_pct.unwrap();
        assert!((delta - 140.0).abs() < 1e-9, "delta = {delta}");
        assert_eq!(snap.monthly.mode, TrendMode::CalendarMonth);
        let comp_months = snap.monthly.comparison.as_ref().unwrap();
        assert_eq!(comp_months[0].label, "Mar");

        let comparison = snap.comparison.as_ref().unwrap();
        assert_eq!(comparison.range, range(ymd(2023, 1, 1), ymd(2023, 12, 31)));
        // Norte only sold zero in 2023.
        assert!(!comparison.typical_performance.contains_key("Norte"));
        assert_eq!(comparison.heatmap.rows.len(), 2);
    }

    #[test]
    fn test_snapshot_zero_baseline_has_no_delta() {
        let ds = dataset();
        let mut filters = filters_2024(true);
        filters.primary.stores = BTreeSet::from(["Norte".to_string()]);
        let snap = build_snapshot(&ds, &filters).unwrap();
        assert_eq!(snap.kpis.total_sales.baseline, Some(0.0));
        assert_eq!(snap.kpis.total_sales.delta_pct, None);
    }

    #[test]
    fn test_snapshot_empty_comparison_is_dropped() {
        let ds = dataset();
        let mut filters = filters_2024(true);
        filters.comparison_range = Some(range(ymd(2010, 1, 1), ymd(2010, 12, 31)));
        let snap = build_snapshot(&ds, &filters).unwrap();
        assert!(snap.comparison.is_none());
        assert!(snap.comparison_empty);
        assert_eq!(snap.kpis.total_sales.baseline, None);
        assert_eq!(snap.monthly.mode, TrendMode::Chronological);
    }

    #[test]
    fn test_snapshot_empty_primary_is_error() {
        let ds = dataset();
        let mut filters = filters_2024(false);
        filters.primary.stores.clear();
        let err = build_snapshot(&ds, &filters).unwrap_err();
        assert!(matches!(err, SalesError::EmptyFilterResult { .. }));
    }

    #[test]
    fn test_filters_for_dataset() {
        let ds = dataset();
        let filters = DashboardFilters::for_dataset(&ds).unwrap();
        assert!(!filters.compare);
        assert!(filters.comparison_spec().is_none());
        assert_eq!(filters.primary.date_range.start, ymd(2023, 3, 1));
        assert!(DashboardFilters::for_dataset(&Dataset::default()).is_none());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let ds = dataset();
        let snap = build_snapshot(&ds, &filters_2024(true)).unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["kpis"]["total_sales"]["current"], 240.0);
        assert_eq!(json["monthly"]["mode"], "calendar_month");
        assert_eq!(json["primary"]["heatmap"]["weekdays"][0], "Lunes");
        assert!(json["explorer"][0]["date_label"].is_string());
    }
}
