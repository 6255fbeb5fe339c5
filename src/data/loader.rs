//! Load candidate records from CSV, JSON or a spreadsheet and validate them for a bucket count.
//! Column names follow the draw sheet convention (`clubs`, `league`, `rank`, `paired`) and the
//! neutral names (`name`, `category`, `tier`, `paired_with`) alike.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use calamine::Reader;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::catalog::{CandidateCatalog, CandidateRecord, Tier};
use crate::data::validate::{validate_catalog, ValidationReport, ValidationSeverity};

pub const DEFAULT_CATALOG_PATH: &str = "data/ucl_2018_19.csv";

const NAME_COLUMNS: &[&str] = &["name", "clubs", "club"];
const CATEGORY_COLUMNS: &[&str] = &["category", "league"];
const TIER_COLUMNS: &[&str] = &["tier", "rank", "pot"];
const PAIRED_COLUMNS: &[&str] = &["paired_with", "paired"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read catalog spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no sheets")]
    EmptyWorkbook,
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
    #[error("unsupported catalog format '{0}' (expected csv, json, xlsx, xls or ods)")]
    UnsupportedFormat(String),
    #[error("catalog failed validation: {0}")]
    Invalid(ValidationReport),
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(alias = "clubs", alias = "club")]
    name: String,
    #[serde(alias = "league")]
    category: String,
    #[serde(alias = "rank", alias = "pot")]
    tier: Tier,
    #[serde(default, alias = "paired")]
    paired_with: Option<String>,
}

impl From<RawCandidate> for CandidateRecord {
    fn from(raw: RawCandidate) -> Self {
        CandidateRecord {
            name: raw.name.trim().to_string(),
            category: raw.category.trim().to_string(),
            tier: raw.tier,
            paired_with: normalize_partner(raw.paired_with.as_deref()),
        }
    }
}

fn normalize_partner(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Read records without validating them. The format is chosen by file extension.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<CandidateRecord>, CatalogError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => parse_csv_records(File::open(path)?),
        "json" => parse_json_records(&fs::read_to_string(path)?),
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet_records(path),
        other => Err(CatalogError::UnsupportedFormat(other.to_string())),
    }
}

pub fn parse_csv_records(reader: impl Read) -> Result<Vec<CandidateRecord>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize::<RawCandidate>() {
        records.push(row?.into());
    }
    Ok(records)
}

pub fn parse_json_records(raw: &str) -> Result<Vec<CandidateRecord>, CatalogError> {
    let parsed: Vec<RawCandidate> = serde_json::from_str(raw)?;
    Ok(parsed.into_iter().map(CandidateRecord::from).collect())
}

fn read_spreadsheet_records(path: &Path) -> Result<Vec<CandidateRecord>, CatalogError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CatalogError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    let records = records_from_range(&range)?;
    debug!(sheet = %sheet_name, records = records.len(), "read spreadsheet catalog");
    Ok(records)
}

/// Records from a sheet whose first row is the header. Fully blank rows are skipped.
fn records_from_range(
    range: &calamine::Range<calamine::Data>,
) -> Result<Vec<CandidateRecord>, CatalogError> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell_str(cell).to_ascii_lowercase()).collect())
        .unwrap_or_default();

    let name_col = find_column(&header, NAME_COLUMNS).ok_or(CatalogError::MissingColumn("name"))?;
    let category_col =
        find_column(&header, CATEGORY_COLUMNS).ok_or(CatalogError::MissingColumn("category"))?;
    let tier_col = find_column(&header, TIER_COLUMNS).ok_or(CatalogError::MissingColumn("tier"))?;
    let paired_col = find_column(&header, PAIRED_COLUMNS);

    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        // Spreadsheet rows are 1-based and the header occupies row 1.
        let row_number = offset + 2;
        if row.iter().all(|c| cell_str(c).is_empty()) {
            continue;
        }
        let cell = |col: usize| row.get(col).map(cell_str).unwrap_or_default();
        let tier = parse_tier(&cell(tier_col)).ok_or_else(|| CatalogError::Row {
            row: row_number,
            message: format!("invalid tier '{}'", cell(tier_col)),
        })?;
        records.push(CandidateRecord {
            name: cell(name_col),
            category: cell(category_col),
            tier,
            paired_with: paired_col.and_then(|col| normalize_partner(Some(cell(col).as_str()))),
        });
    }
    Ok(records)
}

fn find_column(header: &[String], names: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|column| names.contains(&column.trim()))
}

fn parse_tier(raw: &str) -> Option<Tier> {
    if let Ok(tier) = raw.parse::<Tier>() {
        return Some(tier);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.fract() == 0.0 && (0.0..=f64::from(Tier::MAX)).contains(&value)).then_some(value as Tier)
}

fn cell_str(d: &calamine::Data) -> String {
    match d {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.trim().to_string(),
        calamine::Data::Float(f) => format!("{}", f),
        calamine::Data::Int(i) => format!("{}", i),
        calamine::Data::Bool(b) => format!("{}", b),
        _ => format!("{:?}", d),
    }
}

/// Build a catalog from records and reject it if any error-severity diagnostic is raised.
pub fn catalog_from_records(
    records: Vec<CandidateRecord>,
    bucket_count: usize,
) -> Result<CandidateCatalog, CatalogError> {
    let catalog = CandidateCatalog::from_records(records);
    let report = validate_catalog(&catalog, bucket_count);
    for diag in &report.diagnostics {
        if diag.severity == ValidationSeverity::Warning {
            warn!(context = %diag.context, "{}", diag.message);
        }
    }
    if report.has_errors() {
        return Err(CatalogError::Invalid(report));
    }
    Ok(catalog)
}

pub fn load_catalog(
    path: impl AsRef<Path>,
    bucket_count: usize,
) -> Result<CandidateCatalog, CatalogError> {
    let path = path.as_ref();
    let records = read_records(path)?;
    debug!(path = %path.display(), records = records.len(), "loaded catalog records");
    catalog_from_records(records, bucket_count)
}
