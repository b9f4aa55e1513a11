// Primitives for reading CSV files.

use std::fs::File;

use crate::atlas::{
    io_common::{first_non_empty, require_columns, ResultsLayout},
    *,
};

pub fn read_csv_results(path: &str, source: &ResultsSource) -> AtlasResult<Vec<RawResultRow>> {
    let (header, records) = get_records(path)?;
    let layout = ResultsLayout::from_header(path, &header, source)?;

    let mut res: Vec<RawResultRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is on line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row = layout.read_row(&to_cells(&line));
        debug!("read_csv_results: lineno: {:?} row: {:?}", lineno, &row);
        res.push(row);
    }
    info!("read_csv_results: {} rows from {:?}", res.len(), path);
    Ok(res)
}

/// Reads the cross-reference table.
///
/// Every key column of a row produces one entry pointing to the canonical id of the row.
pub fn read_csv_cross_reference(
    path: &str,
    source: &CrossReferenceSource,
) -> AtlasResult<Vec<CrossReferenceEntry>> {
    let (header, records) = get_records(path)?;
    let key_cols = require_columns(path, &header, &source.key_columns())?;
    let canonical_cols = require_columns(path, &header, &source.canonical_columns())?;

    let mut res: Vec<CrossReferenceEntry> = Vec::new();
    let mut num_incomplete: usize = 0;
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells = to_cells(&line);
        let canonical_id = match first_non_empty(&cells, &canonical_cols) {
            Some(x) => x,
            None => {
                num_incomplete += 1;
                continue;
            }
        };
        for col in key_cols.iter() {
            if let Some(key) = first_non_empty(&cells, &[*col]) {
                res.push(CrossReferenceEntry {
                    key,
                    canonical_id: canonical_id.clone(),
                });
            }
        }
    }
    info!(
        "read_csv_cross_reference: {} entries from {:?} ({} rows without canonical id)",
        res.len(),
        path,
        num_incomplete
    );
    Ok(res)
}

fn to_cells(record: &csv::StringRecord) -> Vec<Option<String>> {
    record
        .iter()
        .map(|s| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        })
        .collect()
}

fn get_records(
    path: &str,
) -> AtlasResult<(Vec<Option<String>>, csv::StringRecordsIntoIter<File>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header = to_cells(rdr.headers().context(CsvOpenSnafu { path })?);
    debug!("get_records: {:?} header: {:?}", path, header);
    Ok((header, rdr.into_records()))
}
