use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::data::catalog::{CandidateCatalog, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors().count();
        write!(f, "{errors} error(s)")?;
        for diag in self.errors() {
            write!(f, "; {diag}")?;
        }
        Ok(())
    }
}

/// Check the preconditions the draw engine relies on. Nothing here is rechecked during a draw.
pub fn validate_catalog(catalog: &CandidateCatalog, bucket_count: usize) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_names = HashSet::new();
    let mut tier_counts: BTreeMap<Tier, usize> = BTreeMap::new();
    let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();

    if catalog.is_empty() {
        report.push(ValidationSeverity::Error, "catalog", "no candidates");
        return report;
    }

    for (index, record) in catalog.records().iter().enumerate() {
        let context = format!("candidate[{index}]");
        if record.name.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                "missing non-empty 'name'",
            );
        } else if !seen_names.insert(record.name.as_str()) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                format!("duplicate name '{}'", record.name),
            );
        }

        if record.category.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.category"),
                "missing non-empty 'category'",
            );
        } else {
            *category_counts.entry(record.category.as_str()).or_default() += 1;
        }
        *tier_counts.entry(record.tier).or_default() += 1;

        validate_pairing(&mut report, catalog, index, &context);
    }

    for (tier, count) in &tier_counts {
        if *count != bucket_count {
            report.push(
                ValidationSeverity::Error,
                format!("tier {tier}"),
                format!("has {count} candidate(s), expected one per bucket ({bucket_count})"),
            );
        }
    }

    for (category, count) in category_counts {
        if count > bucket_count {
            report.push(
                ValidationSeverity::Warning,
                format!("category '{category}'"),
                format!(
                    "{count} members cannot fit {bucket_count} buckets; every draw will dead-end"
                ),
            );
        }
    }

    report
}

fn validate_pairing(
    report: &mut ValidationReport,
    catalog: &CandidateCatalog,
    index: usize,
    context: &str,
) {
    let record = &catalog.records()[index];
    let Some(partner_name) = record.paired_with.as_deref() else {
        return;
    };
    let context = format!("{context}.paired_with");
    if partner_name == record.name {
        report.push(ValidationSeverity::Error, context, "candidate is paired with itself");
        return;
    }
    let Some(partner_id) = catalog.id_of(partner_name) else {
        report.push(
            ValidationSeverity::Error,
            context,
            format!("unknown candidate '{partner_name}'"),
        );
        return;
    };
    let partner = catalog.get(partner_id);
    if partner.paired_with.as_deref() != Some(record.name.as_str()) {
        report.push(
            ValidationSeverity::Error,
            context,
            format!(
                "pairing with '{partner_name}' is not symmetric ('{partner_name}' pairs with {:?})",
                partner.paired_with
            ),
        );
    }
}
