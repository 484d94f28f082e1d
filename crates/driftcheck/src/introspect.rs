//! Actual schema introspection.
//!
//! [`ActualSchemaSource`] is the seam between the diff engine and whatever
//! can report what a database really contains. [`PostgresIntrospector`]
//! reads it from `information_schema` for one schema scope (e.g. `public`).
//!
//! Only base tables are reported; views, foreign tables and partitions'
//! parents that aren't `BASE TABLE`s are skipped. Tables come back in name
//! order, columns in ordinal order.

use crate::Result;
use driftcheck_schema::{ColumnDescriptor, SchemaModel, TableDescriptor};
use std::future::Future;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};
use tracing::Instrument;

/// Something that can report the actual schema.
pub trait ActualSchemaSource {
    /// Fetch the actual schema.
    fn introspect(&self) -> impl Future<Output = Result<SchemaModel>> + Send;
}

/// An already-fetched model is its own source.
impl ActualSchemaSource for SchemaModel {
    async fn introspect(&self) -> Result<SchemaModel> {
        Ok(self.clone())
    }
}

const TABLES_SQL: &str = "\
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema::text = $1 AND table_type = 'BASE TABLE'
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT
    c.table_name::text,
    c.column_name::text,
    c.data_type::text,
    c.udt_name::text,
    c.is_nullable::text,
    c.column_default IS NOT NULL,
    c.character_maximum_length::int4,
    c.numeric_precision::int4,
    c.numeric_scale::int4
FROM information_schema.columns c
JOIN information_schema.tables t
    ON t.table_schema = c.table_schema AND t.table_name = c.table_name
WHERE c.table_schema::text = $1 AND t.table_type = 'BASE TABLE'
ORDER BY c.table_name, c.ordinal_position";

/// Reads the actual schema of one Postgres schema scope.
///
/// # Example
///
/// ```ignore
/// let client = driftcheck::connect("postgres://localhost/app").await?;
/// let actual = PostgresIntrospector::new(&client, "public").introspect().await?;
/// ```
pub struct PostgresIntrospector<'a> {
    client: &'a Client,
    schema: String,
}

impl<'a> PostgresIntrospector<'a> {
    pub fn new(client: &'a Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }

    /// The schema scope being introspected.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let rows = self
            .client
            .query(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }
}

impl ActualSchemaSource for PostgresIntrospector<'_> {
    async fn introspect(&self) -> Result<SchemaModel> {
        let mut schema = SchemaModel::new();

        // Tables first, so tables without columns are still reported
        for row in self.query(TABLES_SQL, &[&self.schema]).await? {
            let name: String = row.try_get(0)?;
            schema.insert_table(TableDescriptor::new(name))?;
        }

        for row in self.query(COLUMNS_SQL, &[&self.schema]).await? {
            let column = CatalogColumn {
                table_name: row.try_get(0)?,
                column_name: row.try_get(1)?,
                data_type: row.try_get(2)?,
                udt_name: row.try_get(3)?,
                is_nullable: row.try_get(4)?,
                has_default: row.try_get(5)?,
                character_maximum_length: row.try_get(6)?,
                numeric_precision: row.try_get(7)?,
                numeric_scale: row.try_get(8)?,
            };
            let Some(table) = schema.tables.get_mut(&column.table_name) else {
                tracing::debug!(table = %column.table_name, "column for unlisted table, skipping");
                continue;
            };
            table.insert_column(column.into_descriptor())?;
        }

        tracing::info!(
            schema = %self.schema,
            tables = schema.len(),
            "introspected database schema"
        );
        Ok(schema)
    }
}

/// One row of `information_schema.columns`, as selected by the introspector.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogColumn {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
    /// `YES` or `NO`
    pub is_nullable: String,
    pub has_default: bool,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

impl CatalogColumn {
    /// Convert to a fully-populated column descriptor.
    pub fn into_descriptor(self) -> ColumnDescriptor {
        let type_name = resolve_type_name(&self.data_type, &self.udt_name);
        ColumnDescriptor {
            name: self.column_name,
            type_name: Some(type_name),
            is_nullable: Some(self.is_nullable.eq_ignore_ascii_case("YES")),
            has_default: Some(self.has_default),
            max_length: self.character_maximum_length,
            numeric_precision: self.numeric_precision,
            numeric_scale: self.numeric_scale,
        }
    }
}

/// The type name to report for a column.
///
/// `information_schema` says `USER-DEFINED` for enums and extension types and
/// `ARRAY` for arrays; the underlying `udt_name` is more useful for both
/// (`_int4` becomes `int4[]`).
pub fn resolve_type_name(data_type: &str, udt_name: &str) -> String {
    match data_type {
        "USER-DEFINED" => udt_name.to_string(),
        "ARRAY" => match udt_name.strip_prefix('_') {
            Some(element) => format!("{}[]", element),
            None => udt_name.to_string(),
        },
        _ => data_type.to_string(),
    }
}

/// Connect to Postgres and drive the connection in the background.
pub async fn connect(database_url: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(database_url, tokio_postgres::NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "database connection error");
        }
    });

    Ok(client)
}
