//! Period and store filtering over a loaded [`Dataset`].

use std::collections::BTreeSet;

use sales_core::calendar::DateRange;
use sales_core::error::{Result, SalesError};
use sales_core::models::{Dataset, EnrichedRecord};
use serde::{Deserialize, Serialize};

/// A date range plus the set of stores to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_range: DateRange,
    pub stores: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new(date_range: DateRange, stores: BTreeSet<String>) -> Self {
        Self { date_range, stores }
    }

    /// The whole dataset span with every store, or `None` for an empty dataset.
    pub fn all(dataset: &Dataset) -> Option<Self> {
        Some(Self::new(dataset.date_span()?, dataset.stores()))
    }

    /// The comparison counterpart of this spec: the given range, or this
    /// range one year back, over the same stores.
    pub fn comparison(&self, range: Option<DateRange>) -> Self {
        Self {
            date_range: range.unwrap_or_else(|| self.date_range.shifted_back_one_year()),
            stores: self.stores.clone(),
        }
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        self.date_range.contains(record.date()) && self.stores.contains(record.store())
    }
}

/// The records of a dataset that satisfy a [`FilterSpec`].
///
/// Only [`filter`] builds one, and it never builds an empty one.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    spec: FilterSpec,
    records: Vec<&'a EnrichedRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn records(&self) -> &[&'a EnrichedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Views returned by [`filter`] are never empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.amount())
    }
}

/// Select the records matching `spec`.
///
/// An empty store set matches nothing. Any filter that matches nothing is
/// reported as [`SalesError::EmptyFilterResult`].
pub fn filter<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Result<FilteredView<'a>> {
    let records: Vec<&EnrichedRecord> = dataset
        .records()
        .iter()
        .filter(|r| spec.matches(r))
        .collect();

    if records.is_empty() {
        return Err(SalesError::EmptyFilterResult {
            period: spec.date_range.label(),
        });
    }

    Ok(FilteredView {
        spec: spec.clone(),
        records,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_core::models::SalesRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stores(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            SalesRecord::new(ymd(2023, 3, 1), "A", 10.0),
            SalesRecord::new(ymd(2024, 3, 1), "A", 100.0),
            SalesRecord::new(ymd(2024, 3, 2), "B", 50.0),
            SalesRecord::new(ymd(2024, 3, 31), "A", 5.0),
            SalesRecord::new(ymd(2024, 4, 1), "A", 7.0),
        ])
    }

    fn march_2024() -> DateRange {
        DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap()
    }

    #[test]
    fn test_filter_inclusive_bounds() {
        let ds = dataset();
        let view = filter(&ds, &FilterSpec::new(march_2024(), stores(&["A", "B"]))).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.amounts().sum::<f64>(), 155.0);
    }

    #[test]
    fn test_filter_store_subset() {
        let ds = dataset();
        let view = filter(&ds, &FilterSpec::new(march_2024(), stores(&["B"]))).unwrap();
        assert_eq!(view.len(), 1);
        assert!(!view.is_empty());
        assert_eq!(view.records()[0].store(), "B");
    }

    #[test]
    fn test_filter_empty_store_set_is_empty_result() {
        let ds = dataset();
        let err = filter(&ds, &FilterSpec::new(march_2024(), BTreeSet::new())).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_filter_range_outside_dataset_is_empty_result() {
        let ds = dataset();
        let range = DateRange::new(ymd(2030, 1, 1), ymd(2030, 12, 31)).unwrap();
        let err = filter(&ds, &FilterSpec::new(range, stores(&["A", "B"]))).unwrap_err();
        assert!(matches!(err, SalesError::EmptyFilterResult { .. }));
        assert!(err.to_string().contains("01/01/2030"));
    }

    #[test]
    fn test_filter_unknown_store_is_empty_result() {
        let ds = dataset();
        let err = filter(&ds, &FilterSpec::new(march_2024(), stores(&["Z"]))).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_filter_spec_all() {
        let ds = dataset();
        let spec = FilterSpec::all(&ds).unwrap();
        assert_eq!(spec.date_range.start, ymd(2023, 3, 1));
        assert_eq!(spec.date_range.end, ymd(2024, 4, 1));
        assert_eq!(spec.stores, stores(&["A", "B"]));
        assert_eq!(filter(&ds, &spec).unwrap().len(), ds.len());
        assert!(FilterSpec::all(&Dataset::default()).is_none());
    }

    #[test]
    fn test_comparison_defaults_to_one_year_back() {
        let primary = FilterSpec::new(march_2024(), stores(&["A"]));
        let comparison = primary.comparison(None);
        assert_eq!(comparison.date_range.start, ymd(2023, 3, 1));
        assert_eq!(comparison.date_range.end, ymd(2023, 3, 31));
        assert_eq!(comparison.stores, primary.stores);

        let ds = dataset();
        let view = filter(&ds, &comparison).unwrap();
        assert_eq!(view.amounts().sum::<f64>(), 10.0);
    }

    #[test]
    fn test_comparison_override_keeps_stores() {
        let primary = FilterSpec::new(march_2024(), stores(&["A", "B"]));
        let custom = DateRange::new(ymd(2024, 4, 1), ymd(2024, 4, 30)).unwrap();
        let comparison = primary.comparison(Some(custom));
        assert_eq!(comparison.date_range, custom);
        assert_eq!(comparison.stores, primary.stores);
    }
}
