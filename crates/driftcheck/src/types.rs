//! Type normalization - decide whether two type spellings mean the same thing.
//!
//! Databases report types in their own vocabulary (`character varying`,
//! `int4`, `timestamp without time zone`) while expected schemas tend to use
//! whatever the author wrote (`varchar`, `integer`, `timestamp`). A
//! [`TypeNormalizer`] bridges the two using a [`TypePolicy`]:
//!
//! - an **alias table** that rewrites verbose vendor spellings of the actual
//!   type to a short canonical form, and
//! - a list of **equivalence groups**, sets of spellings that are accepted as
//!   interchangeable.
//!
//! The policy is a plain value, so callers can swap in stricter or looser
//! rules without touching the diff engine.
//!
//! ## The `json` group
//!
//! The default policy treats `json` and `jsonb` as interchangeable even
//! though they index and compare differently in Postgres. This keeps noise
//! low for schemas that don't care; drop it with
//! [`TypePolicy::without_group`]`("json")` for a stricter check.

use indexmap::IndexMap;

/// Verbose vendor spellings and their canonical short form.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("character varying", "varchar"),
    ("character", "char"),
    ("timestamp without time zone", "timestamp"),
    ("timestamp with time zone", "timestamptz"),
    ("time without time zone", "time"),
    ("time with time zone", "timetz"),
    ("double precision", "float8"),
    ("real", "float4"),
    ("boolean", "bool"),
    ("smallint", "int2"),
    ("integer", "int4"),
    ("bigint", "int8"),
    ("decimal", "numeric"),
    ("bit varying", "varbit"),
];

/// Spellings accepted as the same kind of thing.
///
/// Expected hints are only lower-cased, never aliased, so verbose spellings
/// have to appear here too.
const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "text",
        &[
            "text",
            "varchar",
            "character varying",
            "char",
            "character",
            "bpchar",
            "citext",
            "string",
        ],
    ),
    ("int16", &["int2", "smallint", "smallserial", "serial2"]),
    ("int32", &["int4", "integer", "int", "serial", "serial4"]),
    ("int64", &["int8", "bigint", "bigserial", "serial8"]),
    ("float32", &["float4", "real"]),
    ("float64", &["float8", "double precision", "double", "float"]),
    ("numeric", &["numeric", "decimal"]),
    ("boolean", &["bool", "boolean"]),
    (
        "timestamp",
        &["timestamp", "timestamp without time zone", "datetime"],
    ),
    ("timestamptz", &["timestamptz", "timestamp with time zone"]),
    ("time", &["time", "time without time zone"]),
    ("binary", &["bytea", "blob", "binary"]),
    ("json", &["json", "jsonb"]),
];

/// A named set of type spellings that are mutually compatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceGroup {
    /// Group name, used to add or remove groups from a policy
    pub name: String,
    /// Lower-case member spellings
    pub members: Vec<String>,
}

impl EquivalenceGroup {
    /// Create a group; members are lower-cased.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, members: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether `type_name` (already lower-case) belongs to this group.
    pub fn contains(&self, type_name: &str) -> bool {
        self.members.iter().any(|m| m == type_name)
    }
}

/// Immutable compatibility rules handed to a [`TypeNormalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePolicy {
    /// Lower-case raw spelling -> canonical spelling
    pub aliases: IndexMap<String, String>,
    /// Equivalence groups, checked in order
    pub groups: Vec<EquivalenceGroup>,
}

impl Default for TypePolicy {
    /// The Postgres-flavoured default rules, including the `json` group.
    fn default() -> Self {
        let aliases = DEFAULT_ALIASES
            .iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect();
        let groups = DEFAULT_GROUPS
            .iter()
            .map(|(name, members)| EquivalenceGroup::new(*name, members.iter()))
            .collect();
        Self { aliases, groups }
    }
}

impl TypePolicy {
    /// A policy with no aliases and no groups: only exact (case-insensitive)
    /// spellings match.
    pub fn empty() -> Self {
        Self {
            aliases: IndexMap::new(),
            groups: Vec::new(),
        }
    }

    /// Add (or replace) an alias.
    pub fn with_alias(mut self, raw: &str, canonical: &str) -> Self {
        self.aliases
            .insert(raw.to_lowercase(), canonical.to_lowercase());
        self
    }

    /// Add a group. A group with the same name is replaced.
    pub fn with_group(mut self, group: EquivalenceGroup) -> Self {
        match self.groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        self
    }

    /// Remove the group with this name, if any.
    pub fn without_group(mut self, name: &str) -> Self {
        self.groups.retain(|g| g.name != name);
        self
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&EquivalenceGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Maps raw type names to canonical ones and checks compatibility.
#[derive(Debug, Clone, Default)]
pub struct TypeNormalizer {
    policy: TypePolicy,
}

impl TypeNormalizer {
    /// Create a normalizer with the given policy.
    pub fn new(policy: TypePolicy) -> Self {
        Self { policy }
    }

    /// The policy this normalizer applies.
    pub fn policy(&self) -> &TypePolicy {
        &self.policy
    }

    /// Canonical spelling of `raw`.
    ///
    /// Case-insensitive alias lookup; unknown names come back lower-cased.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        match self.policy.aliases.get(&lowered) {
            Some(canonical) => canonical.clone(),
            None => lowered,
        }
    }

    /// Whether an expected type hint accepts the actual reported type.
    ///
    /// An absent hint accepts anything. Otherwise the hint is lower-cased,
    /// the actual type is normalized, and the two match if they are equal or
    /// share an equivalence group.
    pub fn are_compatible(&self, expected_hint: Option<&str>, actual_raw: &str) -> bool {
        let Some(hint) = expected_hint else {
            return true;
        };

        let expected = hint.to_lowercase();
        let actual = self.normalize(actual_raw);
        if expected == actual {
            return true;
        }

        self.policy
            .groups
            .iter()
            .any(|g| g.contains(&expected) && g.contains(&actual))
    }
}
