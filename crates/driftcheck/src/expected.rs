//! Expected schema loading.
//!
//! The expected schema can come from anywhere; this module provides the
//! [`ExpectedSchemaSource`] seam plus one concrete source, a JSON file:
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "orders",
//!       "columns": [
//!         { "name": "id", "type": "integer", "nullable": false },
//!         { "name": "total", "type": "text" },
//!         { "name": "note" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every column fact except `name` is optional. Leaving out `type` or
//! `nullable` means the comparison won't check that fact.

use crate::Result;
use crate::error::Error;
use driftcheck_schema::{ColumnDescriptor, ModelError, SchemaModel, TableDescriptor};
use facet::Facet;
use std::path::{Path, PathBuf};

/// Something that can produce the expected schema.
pub trait ExpectedSchemaSource {
    /// Load the expected schema, or explain why it can't be loaded.
    fn load_expected(&self) -> Result<SchemaModel>;
}

/// An already-built model is its own source.
impl ExpectedSchemaSource for SchemaModel {
    fn load_expected(&self) -> Result<SchemaModel> {
        Ok(self.clone())
    }
}

/// An expected schema stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonSchemaFile {
    path: PathBuf,
}

impl JsonSchemaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExpectedSchemaSource for JsonSchemaFile {
    fn load_expected(&self) -> Result<SchemaModel> {
        let source = std::fs::read_to_string(&self.path).map_err(|source| Error::ReadExpected {
            path: self.path.clone(),
            source,
        })?;
        let schema = parse_expected_schema(&source, &self.path.display().to_string())?;
        tracing::info!(
            path = %self.path.display(),
            tables = schema.len(),
            "loaded expected schema"
        );
        Ok(schema)
    }
}

/// Parse an expected-schema JSON document.
///
/// `origin` names the document in error messages.
pub fn parse_expected_schema(source: &str, origin: &str) -> Result<SchemaModel> {
    let document: ExpectedSchemaDocument =
        facet_json::from_str(source).map_err(|e| Error::ParseExpected {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
    Ok(document.into_model()?)
}

/// JSON shape of an expected schema.
#[derive(Debug, Clone, Default, PartialEq, Facet)]
pub struct ExpectedSchemaDocument {
    #[facet(default)]
    pub tables: Vec<TableDocument>,
}

/// JSON shape of one table.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct TableDocument {
    pub name: String,
    #[facet(default)]
    pub columns: Vec<ColumnDocument>,
}

/// JSON shape of one column.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct ColumnDocument {
    pub name: String,
    #[facet(default, rename = "type")]
    pub type_name: Option<String>,
    #[facet(default)]
    pub nullable: Option<bool>,
    #[facet(default, rename = "hasDefault")]
    pub has_default: Option<bool>,
    #[facet(default, rename = "maxLength")]
    pub max_length: Option<i32>,
    #[facet(default, rename = "numericPrecision")]
    pub numeric_precision: Option<i32>,
    #[facet(default, rename = "numericScale")]
    pub numeric_scale: Option<i32>,
}

impl ExpectedSchemaDocument {
    /// Convert to a model, rejecting duplicate tables and columns.
    pub fn into_model(self) -> std::result::Result<SchemaModel, ModelError> {
        let tables = self
            .tables
            .into_iter()
            .map(|t| TableDescriptor::from_columns(t.name, t.columns.into_iter().map(Into::into)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        SchemaModel::from_tables(tables)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        facet_json::to_string(self).map_err(|e| Error::Serialize(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        facet_json::to_string_pretty(self).map_err(|e| Error::Serialize(e.to_string()))
    }
}

impl From<ColumnDocument> for ColumnDescriptor {
    fn from(c: ColumnDocument) -> Self {
        ColumnDescriptor {
            name: c.name,
            type_name: c.type_name,
            is_nullable: c.nullable,
            has_default: c.has_default,
            max_length: c.max_length,
            numeric_precision: c.numeric_precision,
            numeric_scale: c.numeric_scale,
        }
    }
}

impl From<&ColumnDescriptor> for ColumnDocument {
    fn from(c: &ColumnDescriptor) -> Self {
        ColumnDocument {
            name: c.name.clone(),
            type_name: c.type_name.clone(),
            nullable: c.is_nullable,
            has_default: c.has_default,
            max_length: c.max_length,
            numeric_precision: c.numeric_precision,
            numeric_scale: c.numeric_scale,
        }
    }
}

/// Render a model (typically an introspected one) in the expected-schema
/// shape, e.g. to bootstrap an expected schema from a live database.
impl From<&SchemaModel> for ExpectedSchemaDocument {
    fn from(schema: &SchemaModel) -> Self {
        ExpectedSchemaDocument {
            tables: schema
                .iter_tables()
                .map(|t| TableDocument {
                    name: t.name.clone(),
                    columns: t.iter_columns().map(ColumnDocument::from).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let schema = parse_expected_schema(
            r#"{"tables": [{"name": "users", "columns": [{"name": "id"}]}]}"#,
            "inline",
        )
        .unwrap();
        let users = schema.get("users").unwrap();
        let id = users.get("id").unwrap();
        assert_eq!(id.type_name, None);
        assert_eq!(id.is_nullable, None);
    }

    #[test]
    fn test_parse_full_column() {
        let schema = parse_expected_schema(
            r#"{
                "tables": [{
                    "name": "orders",
                    "columns": [
                        {
                            "name": "code",
                            "type": "varchar",
                            "nullable": false,
                            "hasDefault": true,
                            "maxLength": 32
                        },
                        {
                            "name": "total",
                            "type": "numeric",
                            "numericPrecision": 12,
                            "numericScale": 2
                        }
                    ]
                }]
            }"#,
            "inline",
        )
        .unwrap();

        let orders = schema.get("orders").unwrap();
        let code = orders.get("code").unwrap();
        assert_eq!(code.type_name(), Some("varchar"));
        assert_eq!(code.is_nullable, Some(false));
        assert_eq!(code.has_default, Some(true));
        assert_eq!(code.max_length, Some(32));

        let total = orders.get("total").unwrap();
        assert_eq!(total.numeric_precision, Some(12));
        assert_eq!(total.numeric_scale, Some(2));
        assert_eq!(total.is_nullable, None);
    }

    #[test]
    fn test_parse_preserves_order() {
        let schema = parse_expected_schema(
            r#"{"tables": [
                {"name": "zebra", "columns": [{"name": "b"}, {"name": "a"}]},
                {"name": "apple"}
            ]}"#,
            "inline",
        )
        .unwrap();
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["zebra", "apple"]);
        let zebra = schema.get("zebra").unwrap();
        let cols: Vec<&str> = zebra.iter_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["b", "a"]);
        assert!(schema.get("apple").unwrap().columns.is_empty());
    }

    #[test]
    fn test_parse_rejects_duplicate_column() {
        let err = parse_expected_schema(
            r#"{"tables": [{"name": "users", "columns": [{"name": "id"}, {"name": "id"}]}]}"#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::DuplicateColumn { ref table, ref column })
                if table == "users" && column == "id"
        ));
    }

    #[test]
    fn test_parse_rejects_duplicate_table() {
        let err = parse_expected_schema(
            r#"{"tables": [{"name": "users"}, {"name": "users"}]}"#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::DuplicateTable { .. })));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_expected_schema("{ not json", "schema.json").unwrap_err();
        match err {
            Error::ParseExpected { origin, .. } => assert_eq!(origin, "schema.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = JsonSchemaFile::new("/definitely/not/here/schema.json")
            .load_expected()
            .unwrap_err();
        assert!(matches!(err, Error::ReadExpected { .. }));
        assert!(err.to_string().contains("/definitely/not/here/schema.json"));
    }

    #[test]
    fn test_model_is_its_own_source() {
        let schema = SchemaModel::new().table(TableDescriptor::new("users"));
        assert_eq!(schema.load_expected().unwrap(), schema);
    }

    #[test]
    fn test_document_from_model_round_trips() {
        let schema = SchemaModel::new().table(
            TableDescriptor::new("orders")
                .column(ColumnDescriptor::new("id").typed("int4").not_null().with_default(true))
                .column(ColumnDescriptor::new("note").typed("text").nullable()),
        );
        let json = ExpectedSchemaDocument::from(&schema).to_json().unwrap();
        assert!(json.contains("\"type\""));
        assert!(json.contains("\"hasDefault\""));
        let parsed = parse_expected_schema(&json, "generated").unwrap();
        assert_eq!(parsed, schema);
    }
}
