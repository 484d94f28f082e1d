//! Schema drift detection for Postgres.
//!
//! This crate compares an *expected* relational schema (however it is
//! declared) against the *actual* schema of a live database and reports
//! every structural discrepancy: missing or extra tables, missing or extra
//! columns, incompatible column types and nullability mismatches.
//!
//! The pieces, leaf-first:
//!
//! - [`TypeNormalizer`] decides whether two type spellings are compatible,
//!   according to an injected [`TypePolicy`].
//! - [`Comparator`] is the diff engine. It is a pure function of two
//!   [`SchemaModel`]s and cannot fail.
//! - [`Report`] adds provenance and renders results as text or JSON.
//! - [`ExpectedSchemaSource`] and [`ActualSchemaSource`] are the seams for
//!   the collaborators that do I/O ([`JsonSchemaFile`],
//!   [`PostgresIntrospector`]), and [`Ignoring`] filters either side.
//!
//! # Example
//!
//! ```ignore
//! let client = driftcheck::connect(&database_url).await?;
//! let expected = JsonSchemaFile::new("schema.json");
//! let actual = PostgresIntrospector::new(&client, "public");
//!
//! let result = driftcheck::check(&expected, &actual, &Comparator::default()).await?;
//! let report = Report::new(result, "db.internal:5432");
//! print!("{}", report);
//! std::process::exit(report.exit_code());
//! ```
//!
//! Drift is a normal outcome and comes back as `Ok`; `Err` always means the
//! comparison could not run.

mod diff;
mod error;
pub mod expected;
mod filter;
pub mod introspect;
mod report;
pub mod types;

pub use diff::{Comparator, ComparisonResult, Mismatch, MismatchKind, Status, Summary, compare};
pub use error::Error;
pub use expected::{ExpectedSchemaDocument, ExpectedSchemaSource, JsonSchemaFile};
pub use filter::Ignoring;
pub use introspect::{ActualSchemaSource, PostgresIntrospector, connect};
pub use report::{MismatchDocument, Report, ReportDocument, SummaryDocument};
pub use types::{EquivalenceGroup, TypeNormalizer, TypePolicy};

// Re-export the model so callers only need one crate
pub use driftcheck_schema::{
    ColumnDescriptor, ModelError, SchemaModel, TableDescriptor, matches_pattern,
};

/// Result type for driftcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Load both schemas, then compare them.
///
/// The expected schema is loaded first; the first collaborator error is
/// returned unchanged and the comparison never starts.
pub async fn check<E, A>(
    expected: &E,
    actual: &A,
    comparator: &Comparator,
) -> Result<ComparisonResult>
where
    E: ExpectedSchemaSource,
    A: ActualSchemaSource,
{
    let expected = expected.load_expected()?;
    let actual = actual.introspect().await?;
    Ok(comparator.compare(&expected, &actual))
}
