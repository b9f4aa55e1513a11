use log::{debug, info, warn};

use medal_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::atlas::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_geojson;

#[derive(Debug, Snafu)]
pub enum AtlasError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "Excel file {path} has several worksheets, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Missing column in {path}: expected one of {candidates:?}"))]
    MissingColumn {
        path: String,
        candidates: Vec<String>,
    },
    #[snafu(display("No features or geometries found in {path}"))]
    MissingFeatures { path: String },
    #[snafu(display("Unknown provider for the results: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Invalid year selection"))]
    InvalidFilter { source: TallyErrors },
    #[snafu(display("Missing parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Missing input: {what} (use a configuration file or the command line)"))]
    MissingInput { what: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AtlasResult<T> = Result<T, AtlasError>;

/// All the inputs, as read from the disk.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub rows: Vec<RawResultRow>,
    pub regions: Vec<GeoRegion>,
    pub cross_reference: Vec<CrossReferenceEntry>,
}

// Receives the views and keeps their JSON rendering.
struct SummaryWriter<'a> {
    regions: &'a [GeoRegion],
    resolver: &'a CodeResolver,
    rendered: Option<JSValue>,
}

impl<'a> ViewSink for SummaryWriter<'a> {
    fn render(&mut self, filter: YearFilter, views: &AggregateViews) {
        self.rendered = Some(views_to_json(filter, views, self.regions, self.resolver));
    }
}

fn medals_json(x: f64) -> JSValue {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        json!(x as i64)
    } else {
        json!(x)
    }
}

fn format_medals(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{:.2}", x)
    }
}

/// A one-line description of the gender totals.
pub fn gender_summary_line(filter: YearFilter, totals: &GenderTotals) -> String {
    if totals.entries.is_empty() {
        return match filter {
            YearFilter::AllYears => {
                "No data available in this dataset for the selected range.".to_string()
            }
            YearFilter::SpecificYear(y) => format!("Year {}: no data available in this dataset.", y),
        };
    }
    let prefix = match filter {
        YearFilter::AllYears => "All years combined: ".to_string(),
        YearFilter::SpecificYear(y) => format!("Year {}: ", y),
    };
    let parts: Vec<String> = totals
        .entries
        .iter()
        .map(|(g, m)| format!("{}: {} medals", g, format_medals(*m)))
        .collect();
    format!("{}{}", prefix, parts.join(" · "))
}

fn views_to_json(
    filter: YearFilter,
    views: &AggregateViews,
    regions: &[GeoRegion],
    resolver: &CodeResolver,
) -> JSValue {
    let mut region_totals: JSMap<String, JSValue> = JSMap::new();
    for (key, medals) in views.region_totals.iter() {
        region_totals.insert(key.clone(), medals_json(*medals));
    }

    let ranking: Vec<JSValue> = views
        .country_ranking
        .entries
        .iter()
        .map(|(name, medals)| json!({"country": name, "medals": medals_json(*medals)}))
        .collect();

    let genders: Vec<JSValue> = views
        .gender_totals
        .entries
        .iter()
        .map(|(gender, medals)| json!({"gender": gender, "medals": medals_json(*medals)}))
        .collect();

    let region_values: Vec<JSValue> = join_regions(regions, &views.region_totals, resolver)
        .iter()
        .map(|rv| json!({"region": rv.label, "id": rv.join_key, "medals": medals_json(rv.medals)}))
        .collect();

    json!({
        "noData": views.is_empty(),
        "regionTotals": region_totals,
        "maxRegionTotal": views.region_totals.max().map(medals_json),
        "countryRanking": ranking,
        "genderTotals": genders,
        "genderSummary": gender_summary_line(filter, &views.gender_totals),
        "regions": region_values,
    })
}

fn diagnostics_to_json(ns: &NormalizedSet) -> JSValue {
    let skipped: Vec<JSValue> = ns
        .skipped
        .iter()
        .map(|s| json!({"row": s.index, "year": s.raw_year}))
        .collect();
    let unresolved: Vec<JSValue> = ns
        .unresolved
        .iter()
        .map(|u| json!({"code": u.code, "name": u.name, "rows": u.occurrences}))
        .collect();
    json!({
        "records": ns.records.len(),
        "unresolvedRecords": ns.unresolved_count(),
        "skippedRows": skipped,
        "unresolved": unresolved,
    })
}

/// Builds the configuration from the optional configuration file, overridden by the
/// command line. Returns the configuration and the directory the relative paths are
/// resolved against.
pub fn resolve_config(args: &Args) -> AtlasResult<(AtlasConfig, PathBuf)> {
    let (mut config, root) = match args.config.as_ref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, root)
        }
        None => {
            let input = args.input.clone().context(MissingInputSnafu {
                what: "results file (--input)",
            })?;
            let geography = args.geography.clone().context(MissingInputSnafu {
                what: "geographic boundaries (--geography)",
            })?;
            let xref = args.xref.clone().context(MissingInputSnafu {
                what: "cross-reference table (--xref)",
            })?;
            let config = AtlasConfig {
                output_settings: OutputSettings {
                    dashboard_name: "Medals".to_string(),
                    output_path: None,
                    year: None,
                },
                results: ResultsSource::new(input),
                geography: GeographySource { file_path: geography },
                cross_reference: CrossReferenceSource::new(xref),
            };
            (config, PathBuf::new())
        }
    };

    if args.config.is_some() {
        if let Some(input) = args.input.clone() {
            config.results.file_path = input;
        }
        if let Some(geography) = args.geography.clone() {
            config.geography.file_path = geography;
        }
        if let Some(xref) = args.xref.clone() {
            config.cross_reference.file_path = xref;
        }
    }
    if let Some(input_type) = args.input_type.clone() {
        config.results.provider = Some(input_type);
    }
    if let Some(ws) = args.excel_worksheet_name.clone() {
        config.results.excel_worksheet_name = Some(ws);
    }
    if let Some(year) = args.year.clone() {
        config.output_settings.year = Some(year);
    }
    if let Some(out) = args.out.clone() {
        config.output_settings.output_path = Some(out);
    }
    Ok((config, root))
}

fn full_path(root: &Path, p: &str) -> String {
    let pb: PathBuf = [root, Path::new(p)].iter().collect();
    pb.as_path().display().to_string()
}

/// Reads the three sources. Any failure aborts the whole load.
pub fn load_sources(config: &AtlasConfig, root: &Path) -> AtlasResult<LoadedSources> {
    let results_path = full_path(root, &config.results.file_path);
    info!("Attempting to read results file {:?}", results_path);
    let rows = match config.results.provider().as_str() {
        "csv" => io_csv::read_csv_results(&results_path, &config.results),
        "xlsx" => io_excel::read_excel_results(&results_path, &config.results),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }?;

    let geo_path = full_path(root, &config.geography.file_path);
    info!("Attempting to read geographic file {:?}", geo_path);
    let regions = io_geojson::read_geojson_regions(&geo_path)?;

    let xref_path = full_path(root, &config.cross_reference.file_path);
    info!("Attempting to read cross-reference file {:?}", xref_path);
    let cross_reference = io_csv::read_csv_cross_reference(&xref_path, &config.cross_reference)?;

    Ok(LoadedSources {
        rows,
        regions,
        cross_reference,
    })
}

/// Runs the whole pipeline on the loaded sources and assembles the summary.
pub fn build_summary_js(config: &AtlasConfig, sources: &LoadedSources) -> AtlasResult<JSValue> {
    let mut resolver = CodeResolver::new(&sources.cross_reference);
    resolver.register_regions(&sources.regions);
    let ns = normalize(&sources.rows, &resolver);
    let diagnostics = diagnostics_to_json(&ns);

    let mut controller = FilterController::new(ns.records);
    let filter: YearFilter = match config.output_settings.year.as_ref() {
        Some(y) => y.parse().context(InvalidFilterSnafu {})?,
        None => controller.filter(),
    };

    let mut writer = SummaryWriter {
        regions: &sources.regions,
        resolver: &resolver,
        rendered: None,
    };
    controller.select(filter, &mut writer);
    let results = match writer.rendered {
        Some(js) => js,
        None => whatever!("No view was rendered for selection {}", filter),
    };
    if controller.views().is_empty() {
        warn!("No data for selection {}", filter);
    }

    Ok(json!({
        "config": {
            "dashboard": config.output_settings.dashboard_name,
            "year": filter.to_string(),
        },
        "years": controller.available_years(),
        "results": results,
        "diagnostics": diagnostics,
    }))
}

fn write_summary(pretty_js: &str, output_path: Option<&String>) -> AtlasResult<()> {
    match output_path.map(|s| s.as_str()) {
        None | Some("stdout") | Some("") => {
            println!("{}", pretty_js);
        }
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, pretty_js).context(OpeningFileSnafu { path: p })?;
        }
    }
    Ok(())
}

/// Compares the summary with a reference summary. The differences are printed.
pub fn check_summary(pretty_js_stats: &str, summary_path: &str) -> AtlasResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats,
            "\n",
        );
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> AtlasResult<()> {
    let (config, root) = resolve_config(args)?;
    info!("config: {:?}", config);

    let sources = load_sources(&config, &root)?;
    let result_js = build_summary_js(&config, &sources)?;

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;
    write_summary(&pretty_js_stats, config.output_settings.output_path.as_ref())?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_ref() {
        check_summary(&pretty_js_stats, summary_p)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_dir() -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "tests", "data"].iter().collect()
    }

    fn args_for(config: &str) -> Args {
        Args {
            config: Some(test_dir().join(config).display().to_string()),
            reference: None,
            out: None,
            input: None,
            input_type: None,
            geography: None,
            xref: None,
            year: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    fn summary_for(args: &Args) -> AtlasResult<JSValue> {
        let (config, root) = resolve_config(args)?;
        let sources = load_sources(&config, &root)?;
        build_summary_js(&config, &sources)
    }

    #[test]
    fn default_selection_is_latest_year() {
        init();
        let js = summary_for(&args_for("summer_config.json")).unwrap();
        assert_eq!(js["config"]["year"], json!("2012"));
        assert_eq!(js["years"], json!([1980, 1988, 2008, 2012]));
        assert_eq!(
            js["results"]["countryRanking"],
            json!([
                {"country": "United States", "medals": 2},
                {"country": "China", "medals": 1}
            ])
        );
        assert_eq!(js["results"]["regionTotals"], json!({"USA": 2, "CHN": 1}));
        assert_eq!(js["results"]["noData"], json!(false));
    }

    #[test]
    fn historical_nations_count_for_successors() {
        init();
        let mut args = args_for("summer_config.json");
        args.year = Some("1988".to_string());
        let js = summary_for(&args).unwrap();
        // URS (3 medals on one row) and FRG.
        assert_eq!(js["results"]["regionTotals"], json!({"DEU": 1, "RUS": 3}));
        assert_eq!(js["results"]["maxRegionTotal"], json!(3));
        let regions = js["results"]["regions"].as_array().unwrap();
        let russia = regions
            .iter()
            .find(|r| r["id"] == json!("RUS"))
            .unwrap();
        assert_eq!(russia["medals"], json!(3));
        assert_eq!(russia["region"], json!("Russia"));
    }

    #[test]
    fn all_years_and_diagnostics() {
        init();
        let mut args = args_for("summer_config.json");
        args.year = Some("all".to_string());
        let js = summary_for(&args).unwrap();
        assert_eq!(js["config"]["year"], json!("All years"));
        let diag = &js["diagnostics"];
        assert_eq!(diag["skippedRows"], json!([{"row": 8, "year": "unknown"}]));
        assert_eq!(
            diag["unresolved"],
            json!([{"code": "XYZ", "name": "Atlantis", "rows": 1}])
        );
        // The unresolved row is ranked but has no region.
        let ranking = js["results"]["countryRanking"].as_array().unwrap();
        assert!(ranking.iter().any(|r| r["country"] == json!("Atlantis")));
        assert!(js["results"]["regionTotals"].get("XYZ").is_none());
        let gender_total: i64 = js["results"]["genderTotals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["medals"].as_i64().unwrap())
            .sum();
        assert_eq!(gender_total, 10);
    }

    #[test]
    fn empty_year_is_reported() {
        init();
        let mut args = args_for("summer_config.json");
        args.year = Some("1900".to_string());
        let js = summary_for(&args).unwrap();
        assert_eq!(js["results"]["noData"], json!(true));
        assert_eq!(js["results"]["countryRanking"], json!([]));
        assert_eq!(
            js["results"]["genderSummary"],
            json!("Year 1900: no data available in this dataset.")
        );
    }

    #[test]
    fn invalid_year_is_an_error() {
        init();
        let mut args = args_for("summer_config.json");
        args.year = Some("last".to_string());
        assert!(matches!(
            summary_for(&args),
            Err(AtlasError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn boundaries_keyed_by_numeric_id_and_name() {
        init();
        let mut args = args_for("summer_config.json");
        args.geography = Some("world_topo.json".to_string());
        args.year = Some("1988".to_string());
        let js = summary_for(&args).unwrap();
        let regions = js["results"]["regions"].as_array().unwrap();
        let by_label = |label: &str| {
            regions
                .iter()
                .find(|r| r["region"] == json!(label))
                .unwrap()
                .clone()
        };
        assert_eq!(by_label("Russia")["id"], json!("RUS"));
        assert_eq!(by_label("Russia")["medals"], json!(3));
        assert_eq!(by_label("Germany")["id"], json!("DEU"));
        assert_eq!(by_label("Germany")["medals"], json!(1));
        // Not in the cross-reference table: kept with its own id.
        assert_eq!(by_label("Antarctica")["id"], json!("010"));
        assert_eq!(by_label("Antarctica")["medals"], json!(0));

        args.year = Some("2012".to_string());
        let js = summary_for(&args).unwrap();
        let regions = js["results"]["regions"].as_array().unwrap();
        let usa = regions
            .iter()
            .find(|r| r["region"] == json!("United States of America"))
            .unwrap();
        assert_eq!(usa["id"], json!("USA"));
        assert_eq!(usa["medals"], json!(2));
        let china = regions.iter().find(|r| r["region"] == json!("China")).unwrap();
        assert_eq!(china["medals"], json!(1));
    }

    #[test]
    fn excel_results() {
        init();
        let js = summary_for(&args_for("excel_config.json")).unwrap();
        assert_eq!(js["config"]["year"], json!("2016"));
        assert_eq!(
            js["results"]["countryRanking"],
            json!([
                {"country": "Kenya", "medals": 2},
                {"country": "Jamaica", "medals": 1}
            ])
        );
        assert_eq!(js["results"]["regionTotals"], json!({"JAM": 1, "KEN": 2}));
    }

    #[test]
    fn command_line_without_config() {
        init();
        let dir = test_dir();
        let args = Args {
            config: None,
            reference: None,
            out: None,
            input: Some(dir.join("summer_results.csv").display().to_string()),
            input_type: None,
            geography: Some(dir.join("world.geojson").display().to_string()),
            xref: Some(dir.join("country_codes.csv").display().to_string()),
            year: Some("2008".to_string()),
            excel_worksheet_name: None,
            verbose: false,
        };
        let js = summary_for(&args).unwrap();
        assert_eq!(js["results"]["regionTotals"], json!({"CHN": 2}));
        assert_eq!(
            js["results"]["genderSummary"],
            json!("Year 2008: Women: 2 medals")
        );
    }

    #[test]
    fn missing_inputs() {
        init();
        let mut args = args_for("summer_config.json");
        args.config = None;
        assert!(matches!(
            resolve_config(&args),
            Err(AtlasError::MissingInput { .. })
        ));
    }

    #[test]
    fn missing_columns_abort_the_load() {
        init();
        let res = summary_for(&args_for("broken_config.json"));
        match res {
            Err(AtlasError::MissingColumn { path, .. }) => assert_eq!(path, "broken_results.csv"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn missing_file_aborts_the_load() {
        init();
        let mut args = args_for("summer_config.json");
        args.geography = Some("does_not_exist.geojson".to_string());
        assert!(matches!(
            summary_for(&args),
            Err(AtlasError::OpeningFile { .. })
        ));
    }

    #[test]
    fn unknown_provider() {
        init();
        let mut args = args_for("summer_config.json");
        args.input_type = Some("parquet".to_string());
        assert!(matches!(
            summary_for(&args),
            Err(AtlasError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn reference_comparison() {
        init();
        let js = summary_for(&args_for("summer_config.json")).unwrap();
        let pretty = serde_json::to_string_pretty(&js).unwrap();
        let ref_path = std::env::temp_dir().join(format!(
            "medalatlas_reference_{}.json",
            std::process::id()
        ));
        let ref_path_s = ref_path.display().to_string();
        fs::write(&ref_path, &pretty).unwrap();
        assert!(check_summary(&pretty, &ref_path_s).is_ok());

        let mut other = js.clone();
        other["config"]["year"] = json!("2008");
        let other_pretty = serde_json::to_string_pretty(&other).unwrap();
        assert!(check_summary(&other_pretty, &ref_path_s).is_err());
        let _ = fs::remove_file(&ref_path);
    }

    #[test]
    fn gender_lines() {
        let totals = GenderTotals {
            entries: vec![("Men".to_string(), 3.0), ("Women".to_string(), 1.5)],
        };
        assert_eq!(
            gender_summary_line(YearFilter::AllYears, &totals),
            "All years combined: Men: 3 medals · Women: 1.50 medals"
        );
        assert_eq!(
            gender_summary_line(YearFilter::AllYears, &GenderTotals::default()),
            "No data available in this dataset for the selected range."
        );
    }
}
