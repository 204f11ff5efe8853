//! Per-user dashboard session.
//!
//! A [`DashboardSession`] owns its filters and the snapshot computed from
//! them, and shares the loaded [`Dataset`] read-only with any other session.
//! Each mutator recomputes the snapshot before returning, so the state seen
//! by the caller always matches the current filters.

use std::sync::Arc;
use std::time::Instant;

use sales_core::calendar::DateRange;
use sales_core::error::{Result, SalesError};
use sales_core::models::Dataset;
use sales_core::settings::Settings;
use sales_data::analysis::{build_snapshot, DashboardFilters, DashboardSnapshot};
use tracing::{debug, warn};

// ── SessionState ──────────────────────────────────────────────────────────────

/// Outcome of the latest recomputation.
#[derive(Debug, Clone)]
pub enum SessionState {
    Ready(Box<DashboardSnapshot>),
    /// The current filters select nothing; `reason` is user-facing.
    NoData { reason: String },
}

impl SessionState {
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        match self {
            SessionState::Ready(snapshot) => Some(&**snapshot),
            SessionState::NoData { .. } => None,
        }
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

pub struct DashboardSession {
    dataset: Arc<Dataset>,
    filters: DashboardFilters,
    state: SessionState,
    /// Sorted store names available for selection.
    stores: Vec<String>,
}

impl DashboardSession {
    /// Start a session over `dataset` with explicit `filters`.
    pub fn new(dataset: Arc<Dataset>, filters: DashboardFilters) -> Self {
        let stores = dataset.stores().into_iter().collect();
        let state = compute(&dataset, &filters);
        Self {
            dataset,
            filters,
            state,
            stores,
        }
    }

    /// Start a session over the full data span and every store.
    pub fn with_defaults(dataset: Arc<Dataset>) -> Result<Self> {
        let filters = DashboardFilters::for_dataset(&dataset).ok_or_else(empty_dataset)?;
        Ok(Self::new(dataset, filters))
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn filters(&self) -> &DashboardFilters {
        &self.filters
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.state.snapshot()
    }

    /// Every store in the dataset, sorted.
    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn is_store_selected(&self, store: &str) -> bool {
        self.filters.primary.stores.contains(store)
    }

    // ── Mutators ──────────────────────────────────────────────────────────────

    pub fn set_primary_range(&mut self, range: DateRange) {
        self.filters.primary.date_range = range;
        self.recompute();
    }

    /// Flip `store` in or out of the selection. Unknown stores are ignored
    /// and `false` is returned.
    pub fn toggle_store(&mut self, store: &str) -> bool {
        if !self.stores.iter().any(|s| s == store) {
            return false;
        }
        let selected = &mut self.filters.primary.stores;
        if !selected.remove(store) {
            selected.insert(store.to_string());
        }
        self.recompute();
        true
    }

    pub fn select_all_stores(&mut self) {
        self.filters.primary.stores = self.stores.iter().cloned().collect();
        self.recompute();
    }

    pub fn clear_stores(&mut self) {
        self.filters.primary.stores.clear();
        self.recompute();
    }

    pub fn set_comparison(&mut self, enabled: bool) {
        self.filters.compare = enabled;
        self.recompute();
    }

    /// `None` returns to the default one-year-back range.
    pub fn set_comparison_range(&mut self, range: Option<DateRange>) {
        self.filters.comparison_range = range;
        self.recompute();
    }

    /// The comparison range in effect, explicit or one year back.
    pub fn comparison_range(&self) -> DateRange {
        self.filters
            .comparison_range
            .unwrap_or_else(|| self.filters.primary.date_range.shifted_back_one_year())
    }

    /// Move the primary range by `months`, keeping its length in months.
    pub fn shift_primary_months(&mut self, months: i32) {
        let range = self.filters.primary.date_range.shifted_by_months(months);
        debug!("primary range -> {}", range.label());
        self.set_primary_range(range);
    }

    /// Move the comparison range by `months`, pinning it from then on.
    pub fn shift_comparison_months(&mut self, months: i32) {
        let range = self.comparison_range().shifted_by_months(months);
        debug!("comparison range -> {}", range.label());
        self.set_comparison_range(Some(range));
    }

    /// Full data span, default comparison range. Stores and the comparison
    /// toggle are left as they are.
    pub fn reset_ranges(&mut self) {
        if let Some(span) = self.dataset.date_span() {
            self.filters.primary.date_range = span;
        }
        self.set_comparison_range(None);
    }

    fn recompute(&mut self) {
        self.state = compute(&self.dataset, &self.filters);
    }
}

fn compute(dataset: &Dataset, filters: &DashboardFilters) -> SessionState {
    let started = Instant::now();
    let state = match build_snapshot(dataset, filters) {
        Ok(snapshot) => SessionState::Ready(Box::new(snapshot)),
        Err(e) => {
            if e.is_empty_result() {
                debug!("no data for filters: {}", e);
            } else {
                warn!("snapshot failed: {}", e);
            }
            SessionState::NoData {
                reason: e.to_string(),
            }
        }
    };
    debug!("Recomputed dashboard in {:?}", started.elapsed());
    state
}

fn empty_dataset() -> SalesError {
    SalesError::Config("the sales dataset is empty".to_string())
}

// ── Settings → filters ────────────────────────────────────────────────────────

/// Build the initial filters from command-line settings.
///
/// Missing bounds default to the data span; given bounds are clamped to it
/// (a range entirely outside the data is kept as-is so it yields an empty
/// result). An empty `--stores` list selects every store. Comparison bounds
/// default to the primary bounds one year back.
pub fn filters_from_settings(dataset: &Dataset, settings: &Settings) -> Result<DashboardFilters> {
    let span = dataset.date_span().ok_or_else(empty_dataset)?;

    let requested = DateRange::new(
        settings.start.unwrap_or(span.start),
        settings.end.unwrap_or(span.end),
    )?;
    let date_range = requested.clamp_to(&span).unwrap_or(requested);

    let known = dataset.stores();
    let stores = if settings.stores.is_empty() {
        known
    } else {
        let chosen: std::collections::BTreeSet<String> = settings
            .stores
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for unknown in chosen.difference(&known) {
            warn!("store '{}' does not appear in the sales data", unknown);
        }
        chosen
    };

    let comparison_range = if settings.compare_start.is_some() || settings.compare_end.is_some() {
        let fallback = date_range.shifted_back_one_year();
        let requested = DateRange::new(
            settings.compare_start.unwrap_or(fallback.start),
            settings.compare_end.unwrap_or(fallback.end),
        )?;
        Some(requested.clamp_to(&span).unwrap_or(requested))
    } else {
        None
    };

    Ok(DashboardFilters {
        primary: sales_data::filter::FilterSpec::new(date_range, stores),
        compare: settings.compare,
        comparison_range,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
