use log::{debug, info};
use std::collections::HashMap;

use crate::config::{CrossReferenceEntry, GeoRegion};

/// Codes and names of nations that no longer exist (or competed under another name),
/// mapped to the ISO alpha-3 code of their principal successor.
///
/// These entries are checked before any lookup in the cross-reference table.
pub const HISTORICAL_OVERRIDES: &[(&str, &str)] = &[
    // Soviet Union
    ("URS", "RUS"),
    ("SOVIET UNION", "RUS"),
    // Unified Team (1992)
    ("EUN", "RUS"),
    ("UNIFIED TEAM", "RUS"),
    // Russian Empire
    ("RU1", "RUS"),
    ("RUSSIAN EMPIRE", "RUS"),
    // Russian Olympic Committee (2020-2022)
    ("ROC", "RUS"),
    // West Germany
    ("FRG", "DEU"),
    ("WEST GERMANY", "DEU"),
    // East Germany
    ("GDR", "DEU"),
    ("EAST GERMANY", "DEU"),
    // United Team of Germany (1956-1964)
    ("EUA", "DEU"),
    ("UNITED TEAM OF GERMANY", "DEU"),
    // Czechoslovakia
    ("TCH", "CZE"),
    ("CZECHOSLOVAKIA", "CZE"),
    // Bohemia
    ("BOH", "CZE"),
    ("BOHEMIA", "CZE"),
    // Yugoslavia
    ("YUG", "SRB"),
    ("YUGOSLAVIA", "SRB"),
    // Serbia and Montenegro
    ("SCG", "SRB"),
    ("SERBIA AND MONTENEGRO", "SRB"),
    // Australasia (1908-1912)
    ("ANZ", "AUS"),
    ("AUSTRALASIA", "AUS"),
    // Rhodesia
    ("RHO", "ZWE"),
    ("RHODESIA", "ZWE"),
    // Zaire
    ("ZAI", "COD"),
    ("ZAIRE", "COD"),
    // Netherlands Antilles
    ("AHO", "CUW"),
    ("NETHERLANDS ANTILLES", "CUW"),
];

/// Maps every known representation of a country to one canonical join key.
///
/// The lookup order is:
/// 1. the code in the override table
/// 2. the code in the cross-reference table
/// 3. the name in the override table
/// 4. the name in the cross-reference table
///
/// All keys are trimmed and uppercased, both when building and when resolving.
#[derive(Debug, Clone)]
pub struct CodeResolver {
    overrides: HashMap<String, String>,
    cross_reference: HashMap<String, String>,
}

impl Default for CodeResolver {
    fn default() -> Self {
        CodeResolver::new(&[])
    }
}

impl CodeResolver {
    /// Builds a resolver from the entries of the cross-reference table.
    ///
    /// Entries with an empty key or an empty canonical id are ignored. When a key appears
    /// several times, the first entry wins. Every canonical id is also registered as a
    /// key mapping to itself.
    pub fn new(entries: &[CrossReferenceEntry]) -> CodeResolver {
        let overrides: HashMap<String, String> = HISTORICAL_OVERRIDES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut resolver = CodeResolver {
            overrides,
            cross_reference: HashMap::new(),
        };

        for entry in entries.iter() {
            resolver.insert(&entry.key, &entry.canonical_id);
        }
        for entry in entries.iter() {
            resolver.insert(&entry.canonical_id, &entry.canonical_id);
        }
        info!(
            "CodeResolver: {} cross-reference keys from {} entries, {} overrides",
            resolver.cross_reference.len(),
            entries.len(),
            resolver.overrides.len()
        );
        resolver
    }

    /// Registers the identifiers of the geographic dataset.
    ///
    /// A region with a proper alpha-3 code makes that code known, even when the
    /// cross-reference table does not list it. The name of a region maps to the join key
    /// of the region when that key is canonical. Regions known only by a numeric id or a
    /// name that nothing resolves add no key. Existing entries are never replaced.
    pub fn register_regions(&mut self, regions: &[GeoRegion]) {
        let before = self.cross_reference.len();
        for region in regions.iter() {
            let key = match self.resolve_region(region) {
                Some(k) => k,
                None => match region.alpha3.as_deref().filter(|s| is_alpha3(s)) {
                    Some(a3) => normalize_key(a3),
                    None => {
                        debug!("register_regions: no canonical key for {:?}", region);
                        continue;
                    }
                },
            };
            if let Some(a3) = region.alpha3.as_deref().filter(|s| is_alpha3(s)) {
                self.insert(a3, &key);
            }
            if let Some(name) = region.name.as_ref() {
                self.insert(name, &key);
            }
        }
        debug!(
            "register_regions: {} new keys from {} regions",
            self.cross_reference.len() - before,
            regions.len()
        );
    }

    /// Resolves the identifiers of a region, in the order alpha-3, numeric id, name.
    ///
    /// Returns None when none of them is known.
    pub fn resolve_region(&self, region: &GeoRegion) -> Option<String> {
        let usable = |o: &Option<String>| -> Option<String> {
            o.as_deref()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && *s != MISSING_CODE)
                .map(|s| s.to_string())
        };
        usable(&region.alpha3)
            .and_then(|a3| self.resolve(Some(a3.as_str()), None))
            .or_else(|| usable(&region.numeric_id).and_then(|n| self.resolve(Some(n.as_str()), None)))
            .or_else(|| usable(&region.name).and_then(|n| self.resolve(None, Some(n.as_str()))))
    }

    /// The key joining a region to the region totals: its resolved key, or its first raw
    /// identifier when nothing resolves.
    pub fn region_join_key(&self, region: &GeoRegion) -> Option<String> {
        self.resolve_region(region).or_else(|| region.join_key())
    }

    fn insert(&mut self, key: &str, canonical_id: &str) {
        let k = normalize_key(key);
        let v = canonical_id.trim().to_uppercase();
        if k.is_empty() || v.is_empty() {
            return;
        }
        self.cross_reference.entry(k).or_insert(v);
    }

    /// Resolves a code and a name to a join key.
    ///
    /// Returns None when neither the code nor the name is known. This is not an error:
    /// the record will simply not appear on the region map.
    pub fn resolve(&self, raw_code: Option<&str>, raw_name: Option<&str>) -> Option<String> {
        let code = raw_code.map(normalize_key).filter(|s| !s.is_empty());
        let name = raw_name.map(normalize_key).filter(|s| !s.is_empty());

        code.iter()
            .chain(name.iter())
            .find_map(|k| {
                self.overrides
                    .get(k)
                    .or_else(|| self.cross_reference.get(k))
            })
            .cloned()
    }

    /// The number of keys known to the cross-reference table (overrides excluded).
    pub fn len(&self) -> usize {
        self.cross_reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cross_reference.is_empty()
    }
}

// Placeholder used by Natural Earth for shapes without an official code.
pub(crate) const MISSING_CODE: &str = "-99";

// Numeric codes are compared without their leading zeros ("004" and "4").
fn normalize_key(s: &str) -> String {
    let k = s.trim().to_uppercase();
    if !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = k.trim_start_matches('0');
        if stripped.is_empty() {
            return "0".to_string();
        }
        return stripped.to_string();
    }
    k
}

fn is_alpha3(s: &str) -> bool {
    let s = s.trim();
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic())
}
