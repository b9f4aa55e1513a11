// Column lookup shared by the CSV and Excel readers.

use std::path::Path;

use crate::atlas::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Given the header of a table, finds the positions of the candidate columns that are present,
/// in the order of the candidates.
///
/// Names are compared without surrounding spaces (or byte-order mark) and without case.
pub fn find_columns(header: &[Option<String>], candidates: &[String]) -> Vec<usize> {
    let clean = |s: &str| s.trim_start_matches('\u{feff}').trim().to_lowercase();
    candidates
        .iter()
        .filter_map(|cand| {
            let c = clean(cand);
            header
                .iter()
                .position(|h| h.as_deref().map(clean) == Some(c.clone()))
        })
        .collect()
}

/// Like find_columns, but at least one of the candidates must be present.
pub fn require_columns(
    path: &str,
    header: &[Option<String>],
    candidates: &[String],
) -> AtlasResult<Vec<usize>> {
    let positions = find_columns(header, candidates);
    ensure!(
        !positions.is_empty(),
        MissingColumnSnafu {
            path: simplify_file_name(path),
            candidates: candidates.to_vec(),
        }
    );
    Ok(positions)
}

/// The first non-empty cell among the given positions of a row.
pub fn first_non_empty(row: &[Option<String>], positions: &[usize]) -> Option<String> {
    positions.iter().find_map(|idx| {
        row.get(*idx)
            .and_then(|c| c.as_ref())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    })
}

/// Where to find each field of a result row in a given table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultsLayout {
    pub year: Vec<usize>,
    pub code: Vec<usize>,
    pub name: Vec<usize>,
    pub gender: Vec<usize>,
    pub medal_count: Vec<usize>,
}

impl ResultsLayout {
    /// Checks the header of a results table.
    ///
    /// The year column is mandatory, and so is at least one code or name column.
    pub fn from_header(
        path: &str,
        header: &[Option<String>],
        source: &ResultsSource,
    ) -> AtlasResult<ResultsLayout> {
        let year = require_columns(path, header, &source.year_columns())?;
        let code = find_columns(header, &source.code_columns());
        let name = find_columns(header, &source.name_columns());
        if code.is_empty() && name.is_empty() {
            let mut candidates = source.code_columns();
            candidates.extend(source.name_columns());
            return MissingColumnSnafu {
                path: simplify_file_name(path),
                candidates,
            }
            .fail();
        }
        let layout = ResultsLayout {
            year,
            code,
            name,
            gender: find_columns(header, &source.gender_columns()),
            medal_count: find_columns(header, &source.medal_count_columns()),
        };
        debug!("ResultsLayout: {:?} -> {:?}", header, layout);
        Ok(layout)
    }

    pub fn read_row(&self, row: &[Option<String>]) -> RawResultRow {
        RawResultRow {
            year: first_non_empty(row, &self.year).unwrap_or_default(),
            code: first_non_empty(row, &self.code),
            name: first_non_empty(row, &self.name),
            gender: first_non_empty(row, &self.gender),
            medal_count: first_non_empty(row, &self.medal_count),
        }
    }
}
