pub mod catalog;
pub mod loader;
pub mod validate;

pub use catalog::{CandidateCatalog, CandidateId, CandidateRecord, Tier};
pub use loader::{
    catalog_from_records, load_catalog, parse_csv_records, parse_json_records, read_records,
    CatalogError, DEFAULT_CATALOG_PATH,
};
pub use validate::{
    validate_catalog, ValidationDiagnostic, ValidationReport, ValidationSeverity,
};
