use log::{debug, info};

use crate::config::*;
use crate::normalize::years_of;

/// A rendering collaborator, notified with the fresh views after every selection.
pub trait ViewSink {
    fn render(&mut self, filter: YearFilter, views: &AggregateViews);
}

/// Holds the current year selection and the views computed for it.
///
/// The controller owns the normalized records. They are shared by every recomputation
/// and never modified: a selection only picks a subset of them.
#[derive(Debug, Clone)]
pub struct FilterController {
    records: Vec<NormalizedRecord>,
    years: Vec<i32>,
    filter: YearFilter,
    views: AggregateViews,
}

impl FilterController {
    /// Creates a controller showing the most recent year of the records.
    ///
    /// Without any record, the controller starts on all the years.
    pub fn new(records: Vec<NormalizedRecord>) -> FilterController {
        let years = years_of(&records);
        let initial = match years.last() {
            Some(y) => YearFilter::SpecificYear(*y),
            None => YearFilter::AllYears,
        };
        info!(
            "FilterController: {} records over {} years, initial selection: {}",
            records.len(),
            years.len(),
            initial
        );
        let mut controller = FilterController {
            records,
            years,
            filter: initial,
            views: AggregateViews::default(),
        };
        controller.recompute();
        controller
    }

    /// Changes the selection and recomputes the views.
    pub fn set_filter(&mut self, filter: YearFilter) -> &AggregateViews {
        self.filter = filter;
        self.recompute();
        &self.views
    }

    /// Changes the selection and hands the new views to the rendering collaborator.
    pub fn select(&mut self, filter: YearFilter, sink: &mut dyn ViewSink) {
        self.set_filter(filter);
        sink.render(self.filter, &self.views);
    }

    fn recompute(&mut self) {
        let filter = self.filter;
        let selected = self.records.iter().filter(move |r| filter.matches(r.year));
        self.views = crate::aggregate(selected);
        if self.views.is_empty() {
            info!("recompute: no data for selection {}", self.filter);
        } else {
            debug!("recompute: selection {}", self.filter);
        }
    }

    /// The records matching the current selection, in input order.
    pub fn filtered_records(&self) -> Vec<&NormalizedRecord> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r.year))
            .collect()
    }

    pub fn filter(&self) -> YearFilter {
        self.filter
    }

    /// The years that can be selected, in increasing order.
    pub fn available_years(&self) -> &[i32] {
        &self.years
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn views(&self) -> &AggregateViews {
        &self.views
    }

    pub fn region_totals(&self) -> &RegionTotals {
        &self.views.region_totals
    }

    pub fn country_ranking(&self) -> &CountryRanking {
        &self.views.country_ranking
    }

    pub fn gender_totals(&self) -> &GenderTotals {
        &self.views.gender_totals
    }
}
