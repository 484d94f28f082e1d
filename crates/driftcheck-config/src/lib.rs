//! Configuration schema for driftcheck.
//!
//! The CLI reads these types from `.config/driftcheck.styx`:
//!
//! ```styx
//! database_url "postgres://app@localhost:5432/app"
//! schema public
//! expected db/expected-schema.json
//! ignore_tables (_sqlx_migrations spatial_ref_sys "pg_stat*")
//! types {
//!     strict_json true
//!     groups ({name money, members (money numeric)})
//! }
//! ```
//!
//! Every key is optional.

use facet::Facet;

/// Schema scope used when none is configured.
pub const DEFAULT_SCHEMA: &str = "public";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Facet)]
pub struct Config {
    /// Database connection URL.
    #[facet(default)]
    pub database_url: Option<String>,

    /// Database schema to introspect (default: `public`).
    #[facet(default)]
    pub schema: Option<String>,

    /// Path to the expected schema JSON document, relative to the project root.
    #[facet(default)]
    pub expected: Option<String>,

    /// Tables left out of the comparison: exact names or `prefix*`.
    #[facet(default)]
    pub ignore_tables: Vec<String>,

    /// Type compatibility tweaks.
    #[facet(default)]
    pub types: Option<TypesConfig>,
}

impl Config {
    /// The configured schema scope, or [`DEFAULT_SCHEMA`].
    pub fn schema_or_default(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Whether `json` and `jsonb` should be treated as different types.
    pub fn strict_json(&self) -> bool {
        self.types.as_ref().is_some_and(|t| t.strict_json)
    }

    /// Extra equivalence groups.
    pub fn extra_groups(&self) -> &[GroupConfig] {
        self.types.as_ref().map(|t| t.groups.as_slice()).unwrap_or(&[])
    }
}

/// Type compatibility tweaks.
#[derive(Debug, Clone, Default, PartialEq, Facet)]
pub struct TypesConfig {
    /// Drop the default `json`/`jsonb` equivalence.
    #[facet(default)]
    pub strict_json: bool,

    /// Additional groups; a group named like a default one replaces it.
    #[facet(default)]
    pub groups: Vec<GroupConfig>,
}

/// A named set of interchangeable type spellings.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct GroupConfig {
    pub name: String,
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_styx::RenderError;

    fn parse(source: &str) -> Config {
        match facet_styx::from_str(source) {
            Ok(config) => config,
            Err(e) => panic!("Failed to parse: {}", e.render("<test>", source)),
        }
    }

    #[test]
    fn test_parse_documented_example() {
        let source = r#"
database_url "postgres://app@localhost:5432/app"
schema public
expected db/expected-schema.json
ignore_tables (_sqlx_migrations spatial_ref_sys "pg_stat*")
types {
    strict_json true
    groups ({name money, members (money numeric)})
}
"#;
        let config = parse(source);

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://app@localhost:5432/app")
        );
        assert_eq!(config.schema_or_default(), "public");
        assert_eq!(config.expected.as_deref(), Some("db/expected-schema.json"));
        assert_eq!(
            config.ignore_tables,
            vec!["_sqlx_migrations", "spatial_ref_sys", "pg_stat*"]
        );
        assert!(config.strict_json());
        assert_eq!(
            config.extra_groups(),
            &[GroupConfig {
                name: "money".to_string(),
                members: vec!["money".to_string(), "numeric".to_string()],
            }]
        );
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn test_parse_partial_types_section() {
        let config = parse("types {strict_json true}");
        assert!(config.strict_json());
        assert!(config.extra_groups().is_empty());
        assert_eq!(config.schema_or_default(), DEFAULT_SCHEMA);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schema_or_default(), "public");
        assert!(!config.strict_json());
        assert!(config.extra_groups().is_empty());
        assert!(config.ignore_tables.is_empty());
    }

    #[test]
    fn test_types_section() {
        let config = Config {
            schema: Some("billing".to_string()),
            types: Some(TypesConfig {
                strict_json: true,
                groups: vec![GroupConfig {
                    name: "money".to_string(),
                    members: vec!["money".to_string(), "numeric".to_string()],
                }],
            }),
            ..Config::default()
        };
        assert_eq!(config.schema_or_default(), "billing");
        assert!(config.strict_json());
        assert_eq!(config.extra_groups().len(), 1);
        assert_eq!(config.extra_groups()[0].name, "money");
    }
}
