use clap::Parser;

/// Medal tables by region, country and gender.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the datasets and the output.
    /// Relative paths in this file are resolved against the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, medalatlas will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The table of results. Overrides the file given in the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the results table: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path) The GeoJSON file with the country boundaries.
    #[clap(short, long, value_parser)]
    pub geography: Option<String>,

    /// (file path) The CSV table mapping country codes and names to ISO alpha-3 codes.
    #[clap(short, long, value_parser)]
    pub xref: Option<String>,

    /// (a year or 'all') The selection to summarize. Defaults to the most recent year of the data.
    #[clap(short, long, value_parser)]
    pub year: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
