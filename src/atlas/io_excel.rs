use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::atlas::{io_common::ResultsLayout, *};

pub fn read_excel_results(path: &str, source: &ResultsSource) -> AtlasResult<Vec<RawResultRow>> {
    let wrange = get_range(path, source)?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(read_cell)
        .collect();
    debug!("read_excel_results: header: {:?}", header);
    let layout = ResultsLayout::from_header(path, &header, source)?;

    let mut res: Vec<RawResultRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<Option<String>> = row.iter().map(read_cell).collect();
        let raw = layout.read_row(&cells);
        debug!("read_excel_results: idx: {:?} row: {:?}", idx, &raw);
        res.push(raw);
    }
    info!("read_excel_results: {} rows from {:?}", res.len(), path);
    Ok(res)
}

// Numbers are turned back into text: the normalizer does the parsing for all the providers.
fn read_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => {
            debug!("read_cell: ignoring cell {:?}", cell);
            None
        }
    }
}

fn get_range(path: &str, source: &ResultsSource) -> AtlasResult<calamine::Range<Data>> {
    let worksheet_name_o = source.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}
