use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};

use crate::config::*;
use crate::resolver::CodeResolver;

/// The outcome of normalizing a full results table.
///
/// Built once per load. The records are never modified afterwards.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct NormalizedSet {
    pub records: Vec<NormalizedRecord>,
    /// Rows excluded from every aggregate because the year could not be read.
    pub skipped: Vec<SkippedRow>,
    /// Identifiers that could not be resolved, in order of first appearance.
    pub unresolved: Vec<UnresolvedIdentifier>,
}

impl NormalizedSet {
    /// All the years present in the records, in increasing order.
    pub fn years(&self) -> Vec<i32> {
        years_of(&self.records)
    }

    /// The most recent year present in the records.
    pub fn max_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    /// The number of records that did not get a join key.
    pub fn unresolved_count(&self) -> usize {
        self.records.iter().filter(|r| r.join_key.is_none()).count()
    }
}

pub(crate) fn years_of(records: &[NormalizedRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    years.into_iter().collect()
}

/// Normalizes the raw rows of a results table.
///
/// Row-level problems never interrupt the processing of the other rows:
/// - a row with an unreadable year is skipped
/// - an unreadable medal count counts as one medal
/// - an unresolved country is kept, without a join key
pub fn normalize(rows: &[RawResultRow], resolver: &CodeResolver) -> NormalizedSet {
    let mut records: Vec<NormalizedRecord> = Vec::with_capacity(rows.len());
    let mut skipped: Vec<SkippedRow> = Vec::new();
    let mut unresolved: Vec<UnresolvedIdentifier> = Vec::new();
    // Position of each (code, name) pair in the unresolved list.
    let mut unresolved_idx: HashMap<(Option<String>, Option<String>), usize> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let year = match parse_year(&row.year) {
            Some(y) => y,
            None => {
                debug!("normalize: row {}: skipping unreadable year {:?}", index, row.year);
                skipped.push(SkippedRow {
                    index,
                    raw_year: row.year.clone(),
                });
                continue;
            }
        };

        let code = non_empty(&row.code);
        let name = non_empty(&row.name);
        let join_key = resolver.resolve(code.as_deref(), name.as_deref());

        if join_key.is_none() {
            let k = (code.clone(), name.clone());
            match unresolved_idx.get(&k) {
                Some(idx) => unresolved[*idx].occurrences += 1,
                None => {
                    unresolved_idx.insert(k, unresolved.len());
                    unresolved.push(UnresolvedIdentifier {
                        code: code.clone(),
                        name: name.clone(),
                        occurrences: 1,
                    });
                }
            }
        }

        let country_display_name = name.or(code).unwrap_or_default();
        let gender = non_empty(&row.gender).unwrap_or_else(|| UNKNOWN_GENDER.to_string());
        let medal_weight = medal_weight(row.medal_count.as_deref());

        records.push(NormalizedRecord {
            year,
            join_key,
            country_display_name,
            gender,
            medal_weight,
        });
    }

    info!(
        "normalize: {} records from {} rows ({} skipped, {} distinct unresolved identifiers)",
        records.len(),
        rows.len(),
        skipped.len(),
        unresolved.len()
    );
    for u in unresolved.iter() {
        warn!(
            "normalize: could not resolve code {:?} / name {:?} ({} rows)",
            u.code, u.name, u.occurrences
        );
    }

    NormalizedSet {
        records,
        skipped,
        unresolved,
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
}

/// Reads a year. Spreadsheet exports sometimes write years as floats ("2012.0"): these are
/// accepted when they have no fractional part.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Some(f as i32),
        _ => None,
    }
}

/// The weight of a row: the explicit medal count when it is a finite, non-negative number,
/// 1 otherwise.
///
/// An explicit `0` is kept as a weight of 0 and is not read as a missing count: a row that
/// states it carries no medal must not add one to the totals. Only an absent or unreadable
/// count falls back to 1.
pub fn medal_weight(raw: Option<&str>) -> f64 {
    match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => 1.0,
        Some(s) => match s.parse::<f64>() {
            Ok(w) if w.is_finite() && w >= 0.0 => w,
            _ => {
                debug!("medal_weight: unreadable medal count {:?}, using 1", s);
                1.0
            }
        },
    }
}
