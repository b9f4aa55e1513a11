// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The gender assigned to a result row that does not carry one.
pub const UNKNOWN_GENDER: &str = "Unknown";

/// The number of countries kept in a ranking.
pub const TOP_COUNTRIES: usize = 10;

/// One result row, as read from the source table.
///
/// All the fields are still raw text. The readers pick, for each field, the first
/// non-empty value among the candidate columns of the table.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawResultRow {
    pub year: String,
    /// A short code (ISO alpha-3, NOC code, ...) identifying the country.
    pub code: Option<String>,
    /// A free-text country name.
    pub name: Option<String>,
    pub gender: Option<String>,
    /// An explicit number of medals for this row. When absent, the row counts as one medal.
    pub medal_count: Option<String>,
}

/// One entry of the auxiliary cross-reference table.
///
/// The key is either a source-system code (for example a historical Olympic code) or a
/// country name. The canonical id follows the identifier scheme of the geographic dataset.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CrossReferenceEntry {
    pub key: String,
    pub canonical_id: String,
}

/// One shape of the geographic dataset.
///
/// The identifiers are checked in priority order: alpha-3 code, numeric id, display name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct GeoRegion {
    pub alpha3: Option<String>,
    pub numeric_id: Option<String>,
    pub name: Option<String>,
}

// ******** Normalized data structures *********

/// A result row after normalization. Never modified once built.
#[derive(PartialEq, Debug, Clone)]
pub struct NormalizedRecord {
    pub year: i32,
    /// The canonical code used to join this record to a region, if it could be resolved.
    pub join_key: Option<String>,
    pub country_display_name: String,
    pub gender: String,
    /// Always finite and non-negative.
    pub medal_weight: f64,
}

/// A row excluded from every aggregate because its year could not be read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SkippedRow {
    /// The position of the row in the input, starting at 0.
    pub index: usize,
    pub raw_year: String,
}

/// A country identifier that could not be mapped to a join key.
///
/// These rows are still counted in the country ranking and the gender totals.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnresolvedIdentifier {
    pub code: Option<String>,
    pub name: Option<String>,
    pub occurrences: usize,
}

// ******** Output data structures *********

/// The total medal weight per join key.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RegionTotals {
    pub(crate) totals: std::collections::BTreeMap<String, f64>,
}

impl RegionTotals {
    /// The total for the given join key, 0 if the key did not appear.
    pub fn get(&self, join_key: &str) -> f64 {
        self.totals.get(join_key).cloned().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.totals.iter()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The sum of all the region totals.
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// The largest region total, if any region has been counted.
    pub fn max(&self) -> Option<f64> {
        self.totals.values().cloned().reduce(f64::max)
    }
}

/// The countries with the most medals, in decreasing order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct CountryRanking {
    pub entries: Vec<(String, f64)>,
}

/// The medal totals per gender, in decreasing order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct GenderTotals {
    pub entries: Vec<(String, f64)>,
}

/// The three views computed for one selection of records.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AggregateViews {
    pub region_totals: RegionTotals,
    pub country_ranking: CountryRanking,
    pub gender_totals: GenderTotals,
}

impl AggregateViews {
    /// True when the selection did not contain any record.
    ///
    /// Renderers should display an explicit "no data" state in this case.
    pub fn is_empty(&self) -> bool {
        self.region_totals.is_empty()
            && self.country_ranking.entries.is_empty()
            && self.gender_totals.entries.is_empty()
    }
}

/// Errors returned by the library.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// A year filter that is neither a year nor "all".
    InvalidYearFilter(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::InvalidYearFilter(s) => {
                write!(f, "Invalid year filter {:?}: expected a year or 'all'", s)
            }
        }
    }
}

// ********* Configuration **********

/// The selection of records to aggregate.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum YearFilter {
    AllYears,
    SpecificYear(i32),
}

impl YearFilter {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            YearFilter::AllYears => true,
            YearFilter::SpecificYear(y) => *y == year,
        }
    }
}

impl FromStr for YearFilter {
    type Err = TallyErrors;

    fn from_str(s: &str) -> Result<YearFilter, TallyErrors> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::AllYears);
        }
        trimmed
            .parse::<i32>()
            .map(YearFilter::SpecificYear)
            .map_err(|_| TallyErrors::InvalidYearFilter(s.to_string()))
    }
}

impl Display for YearFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearFilter::AllYears => write!(f, "All years"),
            YearFilter::SpecificYear(y) => write!(f, "{}", y),
        }
    }
}
