use crate::atlas::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_YEAR_COLUMNS: &[&str] = &["Year"];
pub const DEFAULT_CODE_COLUMNS: &[&str] = &["ISO_Code", "ISO3", "NOC", "Country_Code"];
pub const DEFAULT_NAME_COLUMNS: &[&str] = &["Country_Name", "Country", "Team"];
pub const DEFAULT_GENDER_COLUMNS: &[&str] = &["Gender", "Sex"];
pub const DEFAULT_MEDAL_COUNT_COLUMNS: &[&str] = &["Medal_Count", "Total_Medals", "Medals"];

pub const DEFAULT_XREF_KEY_COLUMNS: &[&str] = &["NOC", "Code", "Country", "Country_Name", "ISO_N3"];
pub const DEFAULT_XREF_CANONICAL_COLUMNS: &[&str] = &["ISO_Code", "ISO3", "iso"];

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardName")]
    pub dashboard_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// The initial selection: a year or "all". Defaults to the most recent year.
    #[serde(rename = "year")]
    pub year: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResultsSource {
    /// "csv" (default) or "xlsx"
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "yearColumns")]
    pub year_columns: Option<Vec<String>>,
    #[serde(rename = "codeColumns")]
    pub code_columns: Option<Vec<String>>,
    #[serde(rename = "nameColumns")]
    pub name_columns: Option<Vec<String>>,
    #[serde(rename = "genderColumns")]
    pub gender_columns: Option<Vec<String>>,
    #[serde(rename = "medalCountColumns")]
    pub medal_count_columns: Option<Vec<String>>,
}

impl ResultsSource {
    pub fn new(file_path: String) -> ResultsSource {
        ResultsSource {
            provider: None,
            file_path,
            excel_worksheet_name: None,
            year_columns: None,
            code_columns: None,
            name_columns: None,
            gender_columns: None,
            medal_count_columns: None,
        }
    }

    pub fn provider(&self) -> String {
        self.provider.clone().unwrap_or_else(|| "csv".to_string())
    }

    pub fn year_columns(&self) -> Vec<String> {
        or_default(&self.year_columns, DEFAULT_YEAR_COLUMNS)
    }

    pub fn code_columns(&self) -> Vec<String> {
        or_default(&self.code_columns, DEFAULT_CODE_COLUMNS)
    }

    pub fn name_columns(&self) -> Vec<String> {
        or_default(&self.name_columns, DEFAULT_NAME_COLUMNS)
    }

    pub fn gender_columns(&self) -> Vec<String> {
        or_default(&self.gender_columns, DEFAULT_GENDER_COLUMNS)
    }

    pub fn medal_count_columns(&self) -> Vec<String> {
        or_default(&self.medal_count_columns, DEFAULT_MEDAL_COUNT_COLUMNS)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GeographySource {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CrossReferenceSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "keyColumns")]
    pub key_columns: Option<Vec<String>>,
    #[serde(rename = "canonicalColumns")]
    pub canonical_columns: Option<Vec<String>>,
}

impl CrossReferenceSource {
    pub fn new(file_path: String) -> CrossReferenceSource {
        CrossReferenceSource {
            file_path,
            key_columns: None,
            canonical_columns: None,
        }
    }

    pub fn key_columns(&self) -> Vec<String> {
        or_default(&self.key_columns, DEFAULT_XREF_KEY_COLUMNS)
    }

    pub fn canonical_columns(&self) -> Vec<String> {
        or_default(&self.canonical_columns, DEFAULT_XREF_CANONICAL_COLUMNS)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub results: ResultsSource,
    pub geography: GeographySource,
    #[serde(rename = "crossReference")]
    pub cross_reference: CrossReferenceSource,
}

fn or_default(cols: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    match cols {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn read_config(path: &str) -> AtlasResult<AtlasConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: AtlasConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> AtlasResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
