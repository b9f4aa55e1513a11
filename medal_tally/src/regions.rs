use crate::config::{GeoRegion, RegionTotals};
use crate::resolver::{CodeResolver, MISSING_CODE};

impl GeoRegion {
    /// The identifiers of this region, in decreasing priority.
    pub fn identifiers(&self) -> Vec<String> {
        [&self.alpha3, &self.numeric_id, &self.name]
            .iter()
            .filter_map(|o| o.as_deref())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != MISSING_CODE)
            .map(|s| s.to_uppercase())
            .collect()
    }

    /// The first usable raw identifier. See [`CodeResolver::region_join_key`] for the key
    /// used against the region totals.
    pub fn join_key(&self) -> Option<String> {
        self.identifiers().into_iter().next()
    }

    /// A label for displaying the region: its name, or its join key.
    pub fn label(&self) -> String {
        self.name
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| self.join_key())
            .unwrap_or_default()
    }
}

/// The value attached to one region of the map.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionValue {
    pub label: String,
    pub join_key: Option<String>,
    /// The region total, 0 when nothing was counted for this region.
    pub medals: f64,
}

/// Attaches a total to every region of the geographic dataset, in the order of the dataset.
///
/// The identifiers of each region go through the same resolver as the results, so that
/// boundaries keyed by numeric id or by name still meet the alpha-3 totals.
pub fn join_regions(
    regions: &[GeoRegion],
    totals: &RegionTotals,
    resolver: &CodeResolver,
) -> Vec<RegionValue> {
    regions
        .iter()
        .map(|r| {
            let join_key = resolver.region_join_key(r);
            let medals = join_key.as_deref().map(|k| totals.get(k)).unwrap_or(0.0);
            RegionValue {
                label: r.label(),
                join_key,
                medals,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrossReferenceEntry, RawResultRow};
    use crate::normalize::normalize;

    fn region(alpha3: Option<&str>, numeric_id: Option<&str>, name: Option<&str>) -> GeoRegion {
        GeoRegion {
            alpha3: alpha3.map(|s| s.to_string()),
            numeric_id: numeric_id.map(|s| s.to_string()),
            name: name.map(|s| s.to_string()),
        }
    }

    #[test]
    fn join_key_priority() {
        assert_eq!(
            region(Some("fra"), Some("250"), Some("France")).join_key(),
            Some("FRA".to_string())
        );
        assert_eq!(
            region(Some("-99"), Some("250"), Some("France")).join_key(),
            Some("250".to_string())
        );
        assert_eq!(
            region(None, Some(" "), Some("Kosovo")).join_key(),
            Some("KOSOVO".to_string())
        );
        assert_eq!(region(None, None, None).join_key(), None);
    }

    #[test]
    fn regions_without_medals_get_zero() {
        let mut totals = RegionTotals::default();
        totals.totals.insert("FRA".to_string(), 4.0);
        let regions = vec![
            region(Some("FRA"), None, Some("France")),
            region(Some("BEL"), None, None),
            region(None, None, None),
        ];
        let values = join_regions(&regions, &totals, &CodeResolver::default());
        assert_eq!(
            values,
            vec![
                RegionValue {
                    label: "France".to_string(),
                    join_key: Some("FRA".to_string()),
                    medals: 4.0
                },
                RegionValue {
                    label: "BEL".to_string(),
                    join_key: Some("BEL".to_string()),
                    medals: 0.0
                },
                RegionValue {
                    label: "".to_string(),
                    join_key: None,
                    medals: 0.0
                },
            ]
        );
    }

    fn results(rows: &[(&str, u32)]) -> Vec<RawResultRow> {
        let mut res = Vec::new();
        for (country, n) in rows.iter() {
            for _ in 0..*n {
                res.push(RawResultRow {
                    year: "2020".to_string(),
                    code: None,
                    name: Some(country.to_string()),
                    gender: None,
                    medal_count: None,
                });
            }
        }
        res
    }

    #[test]
    fn numeric_and_named_regions_meet_the_totals() {
        let mut resolver = CodeResolver::new(&[
            CrossReferenceEntry {
                key: "France".to_string(),
                canonical_id: "FRA".to_string(),
            },
            CrossReferenceEntry {
                key: "Kosovo".to_string(),
                canonical_id: "XKX".to_string(),
            },
        ]);
        let regions = vec![
            region(None, Some("250"), Some("France")),
            region(None, None, Some("Kosovo")),
        ];
        resolver.register_regions(&regions);
        let ns = normalize(&results(&[("FRA", 5), ("Kosovo", 2)]), &resolver);
        let totals = crate::region_totals(&ns.records);
        assert_eq!(totals.get("FRA"), 5.0);
        assert_eq!(totals.get("XKX"), 2.0);

        let values = join_regions(&regions, &totals, &resolver);
        assert_eq!(values[0].join_key, Some("FRA".to_string()));
        assert_eq!(values[0].medals, 5.0);
        assert_eq!(values[0].label, "France");
        assert_eq!(values[1].join_key, Some("XKX".to_string()));
        assert_eq!(values[1].medals, 2.0);
    }

    #[test]
    fn numeric_only_regions_use_numeric_codes_of_the_table() {
        let resolver = CodeResolver::new(&[CrossReferenceEntry {
            key: "036".to_string(),
            canonical_id: "AUS".to_string(),
        }]);
        let mut totals = RegionTotals::default();
        totals.totals.insert("AUS".to_string(), 7.0);
        // Numeric ids of TopoJSON files are sometimes plain numbers.
        let regions = vec![region(None, Some("36"), None), region(None, Some("999"), None)];
        let values = join_regions(&regions, &totals, &resolver);
        assert_eq!(values[0].join_key, Some("AUS".to_string()));
        assert_eq!(values[0].medals, 7.0);
        assert_eq!(values[0].label, "36");
        assert_eq!(values[1].join_key, Some("999".to_string()));
        assert_eq!(values[1].medals, 0.0);
    }
}
