//! Ignore lists for schema sources.
//!
//! Databases often hold bookkeeping tables (migration ledgers, extension
//! catalogs) that no expected schema mentions. [`Ignoring`] wraps any source
//! and drops tables matching its patterns before the diff engine sees them.

use crate::Result;
use crate::expected::ExpectedSchemaSource;
use crate::introspect::ActualSchemaSource;
use driftcheck_schema::SchemaModel;

/// A schema source with some tables filtered out.
///
/// Patterns are exact table names or `prefix*`.
///
/// # Example
///
/// ```ignore
/// let actual = Ignoring::new(PostgresIntrospector::new(&client, "public"), ["_sqlx*"]);
/// ```
#[derive(Debug, Clone)]
pub struct Ignoring<S> {
    inner: S,
    patterns: Vec<String>,
}

impl<S> Ignoring<S> {
    pub fn new<P: Into<String>>(inner: S, patterns: impl IntoIterator<Item = P>) -> Self {
        Self {
            inner,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    fn apply(&self, schema: SchemaModel) -> SchemaModel {
        if self.patterns.is_empty() {
            return schema;
        }
        let filtered = schema.without_tables(&self.patterns);
        tracing::debug!(
            ignored = schema.len() - filtered.len(),
            "applied table ignore list"
        );
        filtered
    }
}

impl<S: ExpectedSchemaSource> ExpectedSchemaSource for Ignoring<S> {
    fn load_expected(&self) -> Result<SchemaModel> {
        Ok(self.apply(self.inner.load_expected()?))
    }
}

impl<S: ActualSchemaSource + Sync> ActualSchemaSource for Ignoring<S> {
    async fn introspect(&self) -> Result<SchemaModel> {
        let schema = self.inner.introspect().await?;
        Ok(self.apply(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftcheck_schema::TableDescriptor;

    fn schema() -> SchemaModel {
        SchemaModel::new()
            .table(TableDescriptor::new("users"))
            .table(TableDescriptor::new("_sqlx_migrations"))
            .table(TableDescriptor::new("spatial_ref_sys"))
    }

    #[test]
    fn test_ignoring_expected() {
        let source = Ignoring::new(schema(), ["_sqlx*", "spatial_ref_sys"]);
        let loaded = source.load_expected().unwrap();
        assert_eq!(loaded.table_names().collect::<Vec<_>>(), vec!["users"]);
    }

    #[test]
    fn test_no_patterns_is_identity() {
        let source = Ignoring::new(schema(), Vec::<String>::new());
        assert_eq!(source.load_expected().unwrap(), schema());
        assert!(source.patterns().is_empty());
    }

    #[tokio::test]
    async fn test_ignoring_actual() {
        let source = Ignoring::new(schema(), ["_sqlx*"]);
        let loaded = source.introspect().await.unwrap();
        assert_eq!(
            loaded.table_names().collect::<Vec<_>>(),
            vec!["users", "spatial_ref_sys"]
        );
    }
}
