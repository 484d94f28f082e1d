use super::*;

#[test]
fn test_column_builder() {
    let col = ColumnDescriptor::new("id").typed("integer").not_null();
    assert_eq!(col.name, "id");
    assert_eq!(col.type_name(), Some("integer"));
    assert_eq!(col.is_nullable, Some(false));
    assert_eq!(col.has_default, None);
}

#[test]
fn test_column_new_asserts_nothing() {
    let col = ColumnDescriptor::new("note");
    assert_eq!(col.type_name, None);
    assert_eq!(col.is_nullable, None);
    assert_eq!(col.max_length, None);
}

#[test]
fn test_column_display() {
    assert_eq!(ColumnDescriptor::new("a").to_string(), "a");
    assert_eq!(
        ColumnDescriptor::new("a").typed("text").nullable().to_string(),
        "a: text (nullable)"
    );
    assert_eq!(
        ColumnDescriptor::new("a").typed("int4").not_null().to_string(),
        "a: int4 NOT NULL"
    );
}

#[test]
fn test_table_preserves_declaration_order() {
    let table = TableDescriptor::new("orders")
        .column(ColumnDescriptor::new("total"))
        .column(ColumnDescriptor::new("id"))
        .column(ColumnDescriptor::new("created_at"));
    let names: Vec<&str> = table.iter_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["total", "id", "created_at"]);
}

#[test]
fn test_table_builder_replaces_same_name() {
    let table = TableDescriptor::new("orders")
        .column(ColumnDescriptor::new("id").typed("text"))
        .column(ColumnDescriptor::new("note"))
        .column(ColumnDescriptor::new("id").typed("integer"));
    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.get("id").unwrap().type_name(), Some("integer"));
    // replacement keeps the original slot
    assert_eq!(table.columns.get_index(0).unwrap().0, "id");
}

#[test]
fn test_table_from_columns_rejects_duplicates() {
    let err = TableDescriptor::from_columns(
        "orders",
        vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("id")],
    )
    .unwrap_err();
    assert_eq!(
        err,
        ModelError::DuplicateColumn {
            table: "orders".to_string(),
            column: "id".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "column 'orders.id' is declared more than once"
    );
}

#[test]
fn test_column_names_are_case_sensitive() {
    let table = TableDescriptor::from_columns(
        "orders",
        vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("ID")],
    )
    .unwrap();
    assert_eq!(table.columns.len(), 2);
    assert!(table.contains("ID"));
    assert!(!table.contains("Id"));
}

#[test]
fn test_schema_from_tables_rejects_duplicates() {
    let err = SchemaModel::from_tables(vec![
        TableDescriptor::new("users"),
        TableDescriptor::new("users"),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ModelError::DuplicateTable {
            table: "users".to_string()
        }
    );
}

#[test]
fn test_schema_accessors() {
    let schema = SchemaModel::new()
        .table(TableDescriptor::new("users"))
        .table(TableDescriptor::new("orders"));
    assert_eq!(schema.len(), 2);
    assert!(!schema.is_empty());
    assert!(schema.contains("orders"));
    assert!(schema.get("missing").is_none());
    assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["users", "orders"]);
    assert!(SchemaModel::new().is_empty());
}

#[test]
fn test_matches_pattern() {
    assert!(matches_pattern("users", "users"));
    assert!(!matches_pattern("users", "users_archive"));
    assert!(matches_pattern("_sqlx*", "_sqlx_migrations"));
    assert!(matches_pattern("*", "anything"));
    assert!(!matches_pattern("audit*", "orders"));
}

#[test]
fn test_without_tables() {
    let schema = SchemaModel::new()
        .table(TableDescriptor::new("users"))
        .table(TableDescriptor::new("_sqlx_migrations"))
        .table(TableDescriptor::new("orders"))
        .table(TableDescriptor::new("audit_log"));

    let filtered = schema.without_tables(&["_sqlx*", "audit_log"]);
    assert_eq!(
        filtered.table_names().collect::<Vec<_>>(),
        vec!["users", "orders"]
    );
    // the original is untouched
    assert_eq!(schema.len(), 4);

    let none: &[&str] = &[];
    assert_eq!(schema.without_tables(none), schema);
}
