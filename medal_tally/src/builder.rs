pub use crate::config::*;
use crate::controller::FilterController;
use crate::normalize::{normalize, NormalizedSet};
use crate::resolver::CodeResolver;

/// A builder for assembling the inputs of a tally.
///
/// It is the simplest entry point when the data does not come from files.
///
/// ```
/// pub use medal_tally::builder::Builder;
/// pub use medal_tally::YearFilter;
///
/// let mut builder = Builder::new()
///     .cross_reference(&[("United States".to_string(), "USA".to_string())]);
///
/// builder.add_result_simple(2012, "United States");
/// builder.add_result_simple(2012, "United States");
/// builder.add_result(2012, Some("URS"), None, Some("Women"), Some(3.0));
///
/// let (mut controller, _) = builder.build();
/// let views = controller.set_filter(YearFilter::SpecificYear(2012));
/// assert_eq!(views.region_totals.get("USA"), 2.0);
/// assert_eq!(views.region_totals.get("RUS"), 3.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _cross_reference: Vec<CrossReferenceEntry>,
    pub(crate) _regions: Vec<GeoRegion>,
    pub(crate) _rows: Vec<RawResultRow>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets the cross-reference table, as (code or name, canonical id) pairs.
    pub fn cross_reference(self, pairs: &[(String, String)]) -> Builder {
        Builder {
            _cross_reference: pairs
                .iter()
                .map(|(key, canonical_id)| CrossReferenceEntry {
                    key: key.clone(),
                    canonical_id: canonical_id.clone(),
                })
                .collect(),
            ..self
        }
    }

    /// Sets the regions of the geographic dataset.
    pub fn regions(self, regions: &[GeoRegion]) -> Builder {
        Builder {
            _regions: regions.to_vec(),
            ..self
        }
    }

    /// Adds a single medal for a country, given by name or code.
    pub fn add_result_simple(&mut self, year: i32, country: &str) {
        self.add_result(year, None, Some(country), None, None)
    }

    /// Adds a result.
    ///
    /// code: a short country code, name: a country name. At least one of them should be
    /// provided for the result to appear in the ranking.
    pub fn add_result(
        &mut self,
        year: i32,
        code: Option<&str>,
        name: Option<&str>,
        gender: Option<&str>,
        medals: Option<f64>,
    ) {
        self.add_raw_row(&RawResultRow {
            year: year.to_string(),
            code: code.map(|s| s.to_string()),
            name: name.map(|s| s.to_string()),
            gender: gender.map(|s| s.to_string()),
            medal_count: medals.map(|m| m.to_string()),
        })
    }

    pub fn add_raw_row(&mut self, row: &RawResultRow) {
        self._rows.push(row.clone());
    }

    /// The resolver for the current cross-reference table and regions.
    pub fn resolver(&self) -> CodeResolver {
        let mut resolver = CodeResolver::new(&self._cross_reference);
        resolver.register_regions(&self._regions);
        resolver
    }

    /// Normalizes all the rows and returns a controller over them, along with the
    /// normalization diagnostics.
    ///
    /// The records are moved into the controller: the returned set only keeps the
    /// skipped rows and the unresolved identifiers.
    pub fn build(self) -> (FilterController, NormalizedSet) {
        let mut ns = normalize(&self._rows, &self.resolver());
        let controller = FilterController::new(std::mem::take(&mut ns.records));
        (controller, ns)
    }
}
