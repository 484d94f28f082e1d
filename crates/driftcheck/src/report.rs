//! Report building - package a [`ComparisonResult`] for people and machines.
//!
//! A [`Report`] adds provenance (when the comparison ran and against which
//! database) to a result, and offers two renderings:
//!
//! - [`Report::render_text`]: a fixed, section-based plain text layout;
//! - [`Report::to_json`]: a [`ReportDocument`] serialized with `facet-json`,
//!   suitable for CI gating.
//!
//! Neither adds analysis: both preserve the diff engine's ordering.

use crate::diff::{ComparisonResult, Mismatch, Status, Summary};
use crate::error::Error;
use facet::Facet;
use jiff::Timestamp;
use std::fmt;

/// A comparison result plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub result: ComparisonResult,
    /// When the comparison ran.
    pub compared_at: Timestamp,
    /// Where the actual schema came from, as supplied by the caller.
    pub database_host: String,
}

impl Report {
    /// Wrap a result, stamping the current time.
    pub fn new(result: ComparisonResult, database_host: impl Into<String>) -> Self {
        Self::at(result, database_host, Timestamp::now())
    }

    /// Wrap a result with an explicit timestamp.
    pub fn at(
        result: ComparisonResult,
        database_host: impl Into<String>,
        compared_at: Timestamp,
    ) -> Self {
        Self {
            result,
            compared_at,
            database_host: database_host.into(),
        }
    }

    pub fn status(&self) -> Status {
        self.result.status
    }

    /// Process exit code for CI: `0` when clean, `1` when drift was found.
    pub fn exit_code(&self) -> i32 {
        match self.result.status {
            Status::Clean => 0,
            Status::DriftDetected => 1,
        }
    }

    /// Plain text rendering, same as `Display`.
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// The machine-readable shape of this report.
    pub fn to_document(&self) -> ReportDocument {
        let result = &self.result;
        ReportDocument {
            status: result.status.as_str().to_string(),
            compared_at: self.compared_at.to_string(),
            database_host: self.database_host.clone(),
            missing_tables: result.missing_tables.clone(),
            extra_tables: result.extra_tables.clone(),
            mismatches: result.mismatches.iter().map(MismatchDocument::from).collect(),
            summary: SummaryDocument::from(&result.summary),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        facet_json::to_string(&self.to_document()).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Serialize to indented JSON, for files meant to be read by people too.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        facet_json::to_string_pretty(&self.to_document())
            .map_err(|e| Error::Serialize(e.to_string()))
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, marker: char, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for item in items {
        writeln!(f, "  {} {}", marker, item)?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.result;
        let Summary {
            expected_tables,
            actual_tables,
            matching_tables,
            mismatches,
        } = result.summary;

        writeln!(f, "Schema drift report")?;
        writeln!(f, "  compared at: {}", self.compared_at)?;
        writeln!(f, "  database:    {}", self.database_host)?;
        writeln!(f)?;

        writeln!(f, "Summary")?;
        writeln!(f, "  expected tables: {}", expected_tables)?;
        writeln!(f, "  actual tables:   {}", actual_tables)?;
        writeln!(f, "  matching tables: {}", matching_tables)?;
        writeln!(f, "  mismatches:      {}", mismatches)?;
        writeln!(f)?;

        writeln!(f, "Missing tables")?;
        write_list(f, '-', &result.missing_tables)?;
        writeln!(f)?;

        writeln!(f, "Extra tables")?;
        write_list(f, '+', &result.extra_tables)?;
        writeln!(f)?;

        writeln!(f, "Mismatches")?;
        if result.mismatches.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for m in &result.mismatches {
            writeln!(f, "  [{}] {}.{}: {}", m.kind, m.table, m.column, m.description)?;
        }
        writeln!(f)?;

        writeln!(f, "Status: {}", result.status)
    }
}

/// Serialized report.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct ReportDocument {
    /// `Clean` or `DriftDetected`
    pub status: String,
    /// RFC 3339 timestamp
    #[facet(rename = "comparedAt")]
    pub compared_at: String,
    #[facet(rename = "databaseHost")]
    pub database_host: String,
    #[facet(rename = "missingTables")]
    pub missing_tables: Vec<String>,
    #[facet(rename = "extraTables")]
    pub extra_tables: Vec<String>,
    pub mismatches: Vec<MismatchDocument>,
    pub summary: SummaryDocument,
}

/// Serialized mismatch.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct MismatchDocument {
    pub table: String,
    pub column: String,
    pub kind: String,
    #[facet(default)]
    pub expected: Option<String>,
    #[facet(default)]
    pub actual: Option<String>,
    pub description: String,
}

impl From<&Mismatch> for MismatchDocument {
    fn from(m: &Mismatch) -> Self {
        Self {
            table: m.table.clone(),
            column: m.column.clone(),
            kind: m.kind.as_str().to_string(),
            expected: m.expected.clone(),
            actual: m.actual.clone(),
            description: m.description.clone(),
        }
    }
}

/// Serialized summary counters.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct SummaryDocument {
    #[facet(rename = "expectedTables")]
    pub expected_tables: u64,
    #[facet(rename = "actualTables")]
    pub actual_tables: u64,
    #[facet(rename = "matchingTables")]
    pub matching_tables: u64,
    pub mismatches: u64,
}

impl From<&Summary> for SummaryDocument {
    fn from(s: &Summary) -> Self {
        Self {
            expected_tables: s.expected_tables as u64,
            actual_tables: s.actual_tables as u64,
            matching_tables: s.matching_tables as u64,
            mismatches: s.mismatches as u64,
        }
    }
}
