mod config;
pub mod builder;
pub mod controller;
pub mod manual;
pub mod normalize;
pub mod regions;
pub mod resolver;

use log::debug;

use std::{
    collections::{BTreeMap, HashMap},
    ops::AddAssign,
};

pub use crate::config::*;
pub use crate::controller::{FilterController, ViewSink};
pub use crate::normalize::{normalize, NormalizedSet};
pub use crate::regions::{join_regions, RegionValue};
pub use crate::resolver::{CodeResolver, HISTORICAL_OVERRIDES};

// **** Private structures ****

#[derive(PartialEq, Debug, Clone, Copy, PartialOrd)]
struct MedalCount(f64);

impl MedalCount {
    const EMPTY: MedalCount = MedalCount(0.0);
}

impl AddAssign for MedalCount {
    fn add_assign(&mut self, rhs: MedalCount) {
        self.0 += rhs.0;
    }
}

// Running sums per group, keeping the order in which the groups first appeared.
struct GroupedSums {
    order: Vec<(String, MedalCount)>,
    positions: HashMap<String, usize>,
}

impl GroupedSums {
    fn new() -> GroupedSums {
        GroupedSums {
            order: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn add(&mut self, key: &str, count: MedalCount) {
        match self.positions.get(key) {
            Some(idx) => self.order[*idx].1 += count,
            None => {
                self.positions.insert(key.to_string(), self.order.len());
                self.order.push((key.to_string(), count));
            }
        }
    }

    /// The groups by decreasing total. Groups with the same total stay in order of first
    /// appearance (the sort is stable).
    fn into_sorted(self) -> Vec<(String, f64)> {
        let mut res: Vec<(String, f64)> = self.order.into_iter().map(|(k, c)| (k, c.0)).collect();
        res.sort_by(|a, b| b.1.total_cmp(&a.1));
        res
    }
}

/// Computes the three views over the given records.
///
/// The records are usually the subset selected by a [`FilterController`], borrowed from
/// the normalized set. No record produces three empty views.
pub fn aggregate<'a, I>(records: I) -> AggregateViews
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();
    let views = AggregateViews {
        region_totals: region_totals(records.clone()),
        country_ranking: country_ranking(records.clone()),
        gender_totals: gender_totals(records.clone()),
    };
    debug!(
        "aggregate: {} records -> {} regions, {} ranked countries, {} genders",
        records.count(),
        views.region_totals.len(),
        views.country_ranking.entries.len(),
        views.gender_totals.entries.len()
    );
    views
}

/// Sums the medal weights per join key. Records without a join key are not counted.
pub fn region_totals<'a>(records: impl IntoIterator<Item = &'a NormalizedRecord>) -> RegionTotals {
    let mut totals: BTreeMap<String, MedalCount> = BTreeMap::new();
    for r in records {
        if let Some(k) = r.join_key.as_ref() {
            let e = totals.entry(k.clone()).or_insert(MedalCount::EMPTY);
            *e += MedalCount(r.medal_weight);
        }
    }
    RegionTotals {
        totals: totals.into_iter().map(|(k, c)| (k, c.0)).collect(),
    }
}

/// The [`TOP_COUNTRIES`] countries with the highest totals.
///
/// Countries with an empty display name are not ranked. Ties are broken by the order in
/// which the countries first appear in the records.
pub fn country_ranking<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
) -> CountryRanking {
    let mut sums = GroupedSums::new();
    for r in records {
        if r.country_display_name.trim().is_empty() {
            continue;
        }
        sums.add(&r.country_display_name, MedalCount(r.medal_weight));
    }
    let mut entries = sums.into_sorted();
    entries.truncate(TOP_COUNTRIES);
    CountryRanking { entries }
}

/// The totals for every gender, by decreasing total.
pub fn gender_totals<'a>(records: impl IntoIterator<Item = &'a NormalizedRecord>) -> GenderTotals {
    let mut sums = GroupedSums::new();
    for r in records {
        sums.add(&r.gender, MedalCount(r.medal_weight));
    }
    GenderTotals {
        entries: sums.into_sorted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, key: Option<&str>, name: &str, gender: &str, w: f64) -> NormalizedRecord {
        NormalizedRecord {
            year,
            join_key: key.map(|s| s.to_string()),
            country_display_name: name.to_string(),
            gender: gender.to_string(),
            medal_weight: w,
        }
    }

    fn sum(entries: &[(String, f64)]) -> f64 {
        entries.iter().map(|(_, w)| *w).sum()
    }

    #[test]
    fn empty_input_gives_empty_views() {
        let none: Vec<NormalizedRecord> = Vec::new();
        let views = aggregate(&none);
        assert!(views.is_empty());
        assert!(views.region_totals.is_empty());
        assert!(views.country_ranking.entries.is_empty());
        assert!(views.gender_totals.entries.is_empty());
    }

    #[test]
    fn region_totals_only_count_resolved_records() {
        let records = vec![
            rec(2012, Some("USA"), "United States", "Men", 2.0),
            rec(2012, None, "Atlantis", "Men", 5.0),
            rec(2012, Some("USA"), "United States", "Women", 1.0),
            rec(2012, Some("CHN"), "China", "Women", 1.0),
        ];
        let rt = region_totals(&records);
        assert_eq!(rt.get("USA"), 3.0);
        assert_eq!(rt.get("CHN"), 1.0);
        assert_eq!(rt.len(), 2);
        let resolved: f64 = records
            .iter()
            .filter(|r| r.join_key.is_some())
            .map(|r| r.medal_weight)
            .sum();
        assert_eq!(rt.total(), resolved);
    }

    #[test]
    fn ranking_is_truncated_and_sorted() {
        let mut records = Vec::new();
        for i in 0..15 {
            for _ in 0..(i % 4) + 1 {
                records.push(rec(2000, None, &format!("C{}", i), "Men", 1.0));
            }
        }
        let ranking = country_ranking(&records);
        assert_eq!(ranking.entries.len(), TOP_COUNTRIES);
        for w in ranking.entries.windows(2) {
            assert!(w[0].1 >= w[1].1);
        }
        // C3, C7 and C11 have 4 medals each and appear in that order.
        let top: Vec<&str> = ranking.entries[..3].iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(top, vec!["C3", "C7", "C11"]);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let records = vec![
            rec(2000, None, "Kenya", "Men", 1.0),
            rec(2000, None, "Brazil", "Men", 2.0),
            rec(2000, None, "Jamaica", "Men", 1.0),
            rec(2000, None, "Kenya", "Men", 1.0),
        ];
        let ranking = country_ranking(&records);
        assert_eq!(
            ranking.entries,
            vec![
                ("Kenya".to_string(), 2.0),
                ("Brazil".to_string(), 2.0),
                ("Jamaica".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn blank_countries_are_not_ranked() {
        let records = vec![
            rec(2000, None, "", "Men", 3.0),
            rec(2000, None, "Kenya", "Men", 1.0),
        ];
        let views = aggregate(&records);
        assert_eq!(views.country_ranking.entries, vec![("Kenya".to_string(), 1.0)]);
        // Still counted in the gender totals.
        assert_eq!(views.gender_totals.entries, vec![("Men".to_string(), 4.0)]);
    }

    #[test]
    fn gender_totals_match_the_ranked_total() {
        let records = vec![
            rec(2012, Some("USA"), "United States", "Men", 2.0),
            rec(2012, None, "Atlantis", "Women", 1.0),
            rec(2012, Some("CHN"), "China", "Women", 3.0),
            rec(2012, Some("CHN"), "China", "Unknown", 1.0),
        ];
        let views = aggregate(&records);
        assert_eq!(
            views.gender_totals.entries,
            vec![
                ("Women".to_string(), 4.0),
                ("Men".to_string(), 2.0),
                ("Unknown".to_string(), 1.0)
            ]
        );
        assert_eq!(
            sum(&views.gender_totals.entries),
            sum(&views.country_ranking.entries)
        );
    }
}
