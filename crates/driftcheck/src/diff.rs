//! Schema diffing - compare an expected schema against the actual database schema.
//!
//! [`Comparator::compare`] walks both [`SchemaModel`]s and reports every
//! structural discrepancy:
//!
//! - tables that are expected but missing, and tables nobody expected,
//! - per matching table, [`MismatchKind::MissingColumn`],
//!   [`MismatchKind::ExtraColumn`], [`MismatchKind::TypeMismatch`] and
//!   [`MismatchKind::NullabilityMismatch`] records.
//!
//! ## Ordering
//!
//! Output is fully determined by the inputs:
//!
//! - missing and matching tables follow the expected model's declaration order,
//!   extra tables follow the actual model's order;
//! - mismatches are table-major (matching tables in expected order), and
//!   within a table: all missing columns (expected order), then all extra
//!   columns (actual order), then per shared column (expected order) its type
//!   mismatch followed by its nullability mismatch.
//!
//! ## Leniency
//!
//! Facts the expected side doesn't assert are never checked: a column without
//! a type hint can't produce a type mismatch, and one without a nullability
//! assertion can't produce a nullability mismatch. If the actual side is
//! missing a fact (which an introspector should never do) that check is
//! skipped too.
//!
//! ```text
//! orders:
//!   ~ total: type numeric, expected text
//!   ~ total: NULLABLE, expected NOT NULL
//! ```

use crate::types::{TypeNormalizer, TypePolicy};
use driftcheck_schema::{ColumnDescriptor, SchemaModel, TableDescriptor};
use std::fmt;

const NULLABLE: &str = "NULLABLE";
const NOT_NULL: &str = "NOT NULL";

/// What kind of discrepancy a [`Mismatch`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MismatchKind {
    /// Column is expected but absent from the database.
    MissingColumn,
    /// Column exists in the database but is not expected.
    ExtraColumn,
    /// Column types are not compatible.
    TypeMismatch,
    /// Column nullability differs from the expected assertion.
    NullabilityMismatch,
}

impl MismatchKind {
    /// Stable name, used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::MissingColumn => "MissingColumn",
            MismatchKind::ExtraColumn => "ExtraColumn",
            MismatchKind::TypeMismatch => "TypeMismatch",
            MismatchKind::NullabilityMismatch => "NullabilityMismatch",
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column-level discrepancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Table the column belongs to.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Kind of discrepancy.
    pub kind: MismatchKind,
    /// Expected fact (type hint or nullability token), if applicable.
    pub expected: Option<String>,
    /// Actual fact (raw type or nullability token), if applicable.
    pub actual: Option<String>,
    /// Human-readable sentence derived from the fields above.
    pub description: String,
}

impl Mismatch {
    fn new(
        table: &str,
        column: &str,
        kind: MismatchKind,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        let description = describe(table, column, kind, expected.as_deref(), actual.as_deref());
        Self {
            table: table.to_string(),
            column: column.to_string(),
            kind,
            expected,
            actual,
            description,
        }
    }

    /// An expected column absent from the database.
    pub fn missing_column(table: &str, column: &str, expected: &ColumnDescriptor) -> Self {
        Self::new(
            table,
            column,
            MismatchKind::MissingColumn,
            expected.type_name.clone(),
            None,
        )
    }

    /// A database column nobody expected.
    pub fn extra_column(table: &str, column: &str, actual: &ColumnDescriptor) -> Self {
        Self::new(
            table,
            column,
            MismatchKind::ExtraColumn,
            None,
            actual.type_name.clone(),
        )
    }

    /// Incompatible column types.
    pub fn type_mismatch(table: &str, column: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            table,
            column,
            MismatchKind::TypeMismatch,
            Some(expected.to_string()),
            Some(actual.to_string()),
        )
    }

    /// Nullability differs from the expected assertion.
    pub fn nullability_mismatch(
        table: &str,
        column: &str,
        expected_nullable: bool,
        actual_nullable: bool,
    ) -> Self {
        Self::new(
            table,
            column,
            MismatchKind::NullabilityMismatch,
            Some(nullability_token(expected_nullable).to_string()),
            Some(nullability_token(actual_nullable).to_string()),
        )
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

fn nullability_token(nullable: bool) -> &'static str {
    if nullable { NULLABLE } else { NOT_NULL }
}

fn describe(
    table: &str,
    column: &str,
    kind: MismatchKind,
    expected: Option<&str>,
    actual: Option<&str>,
) -> String {
    match kind {
        MismatchKind::MissingColumn => match expected {
            Some(ty) => format!(
                "Column '{}.{}' ({}) is expected but missing from the database",
                table, column, ty
            ),
            None => format!(
                "Column '{}.{}' is expected but missing from the database",
                table, column
            ),
        },
        MismatchKind::ExtraColumn => match actual {
            Some(ty) => format!(
                "Column '{}.{}' ({}) exists in the database but is not expected",
                table, column, ty
            ),
            None => format!(
                "Column '{}.{}' exists in the database but is not expected",
                table, column
            ),
        },
        MismatchKind::TypeMismatch => format!(
            "Column '{}.{}' has type {}, expected {}",
            table,
            column,
            actual.unwrap_or("(unknown)"),
            expected.unwrap_or("(unknown)")
        ),
        MismatchKind::NullabilityMismatch => format!(
            "Column '{}.{}' is {}, expected {}",
            table,
            column,
            actual.unwrap_or("(unknown)"),
            expected.unwrap_or("(unknown)")
        ),
    }
}

/// Overall outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No differences.
    Clean,
    /// At least one missing table, extra table, or mismatch.
    DriftDetected,
}

impl Status {
    /// Stable name, used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Clean => "Clean",
            Status::DriftDetected => "DriftDetected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters describing a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Tables in the expected schema.
    pub expected_tables: usize,
    /// Tables in the actual schema.
    pub actual_tables: usize,
    /// Tables present on both sides.
    pub matching_tables: usize,
    /// Column-level mismatches.
    pub mismatches: usize,
}

/// The result of comparing two schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub status: Status,
    /// Expected tables absent from the database.
    pub missing_tables: Vec<String>,
    /// Database tables nobody expected.
    pub extra_tables: Vec<String>,
    /// Column-level mismatches in table-major order.
    pub mismatches: Vec<Mismatch>,
    pub summary: Summary,
}

impl ComparisonResult {
    /// Returns true if no drift was detected.
    pub fn is_clean(&self) -> bool {
        self.status == Status::Clean
    }

    /// Mismatches found in one table.
    pub fn mismatches_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Mismatch> + 'a {
        self.mismatches.iter().filter(move |m| m.table == table)
    }

    /// Mismatches of one kind.
    pub fn mismatches_of(&self, kind: MismatchKind) -> impl Iterator<Item = &Mismatch> {
        self.mismatches.iter().filter(move |m| m.kind == kind)
    }
}

/// Compares schema models under a type compatibility policy.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    normalizer: TypeNormalizer,
}

impl Comparator {
    /// Create a comparator around a normalizer.
    pub fn new(normalizer: TypeNormalizer) -> Self {
        Self { normalizer }
    }

    /// Create a comparator from a type policy.
    pub fn with_policy(policy: TypePolicy) -> Self {
        Self::new(TypeNormalizer::new(policy))
    }

    /// The normalizer used for type checks.
    pub fn normalizer(&self) -> &TypeNormalizer {
        &self.normalizer
    }

    /// Compare the expected schema against the actual one.
    ///
    /// Pure: neither input is modified and identical inputs always give an
    /// identical result.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let expected = JsonSchemaFile::new("schema.json").load_expected()?;
    /// let actual = PostgresIntrospector::new(&client, "public").introspect().await?;
    /// let result = Comparator::default().compare(&expected, &actual);
    ///
    /// for mismatch in &result.mismatches {
    ///     println!("{}", mismatch);
    /// }
    /// ```
    pub fn compare(&self, expected: &SchemaModel, actual: &SchemaModel) -> ComparisonResult {
        let _span = tracing::debug_span!(
            "driftcheck.compare",
            expected_tables = expected.len(),
            actual_tables = actual.len(),
        )
        .entered();

        let missing_tables: Vec<String> = expected
            .table_names()
            .filter(|name| !actual.contains(name))
            .map(str::to_string)
            .collect();

        let extra_tables: Vec<String> = actual
            .table_names()
            .filter(|name| !expected.contains(name))
            .map(str::to_string)
            .collect();

        let mut mismatches = Vec::new();
        let mut matching_tables = 0;

        // Map keys are the names; descriptor `name` fields are not consulted
        for (name, expected_table) in &expected.tables {
            let Some(actual_table) = actual.tables.get(name) else {
                continue;
            };
            matching_tables += 1;

            let before = mismatches.len();
            self.diff_table(name, expected_table, actual_table, &mut mismatches);
            tracing::debug!(
                table = %name,
                mismatches = mismatches.len() - before,
                "compared table"
            );
        }

        let status = if missing_tables.is_empty() && extra_tables.is_empty() && mismatches.is_empty()
        {
            Status::Clean
        } else {
            Status::DriftDetected
        };

        let summary = Summary {
            expected_tables: expected.len(),
            actual_tables: actual.len(),
            matching_tables,
            mismatches: mismatches.len(),
        };

        ComparisonResult {
            status,
            missing_tables,
            extra_tables,
            mismatches,
            summary,
        }
    }

    /// Diff two tables with the same name, appending to `out`.
    fn diff_table(
        &self,
        table: &str,
        expected: &TableDescriptor,
        actual: &TableDescriptor,
        out: &mut Vec<Mismatch>,
    ) {
        // Missing columns
        for (name, col) in &expected.columns {
            if !actual.columns.contains_key(name) {
                out.push(Mismatch::missing_column(table, name, col));
            }
        }

        // Extra columns
        for (name, col) in &actual.columns {
            if !expected.columns.contains_key(name) {
                out.push(Mismatch::extra_column(table, name, col));
            }
        }

        // Columns in both
        for (name, expected_col) in &expected.columns {
            if let Some(actual_col) = actual.columns.get(name) {
                self.diff_column(table, name, expected_col, actual_col, out);
            }
        }
    }

    /// Type check first, then nullability; the two are independent.
    fn diff_column(
        &self,
        table: &str,
        column: &str,
        expected: &ColumnDescriptor,
        actual: &ColumnDescriptor,
        out: &mut Vec<Mismatch>,
    ) {
        if let (Some(hint), Some(actual_type)) = (expected.type_name(), actual.type_name())
            && !self.normalizer.are_compatible(Some(hint), actual_type)
        {
            out.push(Mismatch::type_mismatch(
                table,
                column,
                hint,
                actual_type,
            ));
        }

        if let (Some(expected_nullable), Some(actual_nullable)) =
            (expected.is_nullable, actual.is_nullable)
            && expected_nullable != actual_nullable
        {
            out.push(Mismatch::nullability_mismatch(
                table,
                column,
                expected_nullable,
                actual_nullable,
            ));
        }
    }
}

/// Compare two schemas with the default type policy.
pub fn compare(expected: &SchemaModel, actual: &SchemaModel) -> ComparisonResult {
    Comparator::default().compare(expected, actual)
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No drift detected.");
        }
        writeln!(f, "Drift detected:\n")?;
        for table in &self.missing_tables {
            writeln!(f, "  - table {}", table)?;
        }
        for table in &self.extra_tables {
            writeln!(f, "  + table {}", table)?;
        }
        for mismatch in &self.mismatches {
            writeln!(f, "  ~ {}", mismatch)?;
        }
        Ok(())
    }
}
