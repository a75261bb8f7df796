use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::naming::NamingPolicy;

/// How raw model names become schema identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// Identifiers are the raw names (or their explicit overrides).
    #[default]
    Verbatim,
    /// Identifiers are lower snake case.
    Normalized,
}

/// Key generation strategy attached to single-column primary keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum IdGenerator {
    #[serde(rename = "assigned")]
    Assigned,
    #[default]
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "identity")]
    Identity,
    #[serde(rename = "sequence")]
    Sequence,
    #[serde(rename = "hilo")]
    HiLo,
    #[serde(rename = "seqhilo")]
    SeqHiLo,
    #[serde(rename = "increment")]
    Increment,
    #[serde(rename = "guid")]
    Guid,
    #[serde(rename = "guid.comb")]
    GuidComb,
    #[serde(rename = "uuid.hex")]
    UuidHex,
    #[serde(rename = "uuid.string")]
    UuidString,
    #[serde(rename = "foreign")]
    Foreign,
    #[serde(rename = "select")]
    Select,
}

const ID_GENERATOR_NAMES: &[(IdGenerator, &str)] = &[
    (IdGenerator::Assigned, "assigned"),
    (IdGenerator::Native, "native"),
    (IdGenerator::Identity, "identity"),
    (IdGenerator::Sequence, "sequence"),
    (IdGenerator::HiLo, "hilo"),
    (IdGenerator::SeqHiLo, "seqhilo"),
    (IdGenerator::Increment, "increment"),
    (IdGenerator::Guid, "guid"),
    (IdGenerator::GuidComb, "guid.comb"),
    (IdGenerator::UuidHex, "uuid.hex"),
    (IdGenerator::UuidString, "uuid.string"),
    (IdGenerator::Foreign, "foreign"),
    (IdGenerator::Select, "select"),
];

impl IdGenerator {
    /// Canonical generator name written into mapping documents.
    pub fn as_str(self) -> &'static str {
        ID_GENERATOR_NAMES
            .iter()
            .find(|(generator, _)| *generator == self)
            .map(|(_, name)| *name)
            .unwrap_or("native")
    }

    /// Parse a canonical generator name.
    pub fn from_name(name: &str) -> Option<Self> {
        ID_GENERATOR_NAMES
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(generator, _)| *generator)
    }

    /// Whether the database assigns key values on insert.
    pub fn is_database_generated(self) -> bool {
        matches!(self, IdGenerator::Identity | IdGenerator::Native)
    }
}

/// Target relational engine for DDL output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    SqlServer,
    PostgreSql,
    MySql,
    Sqlite,
    Oracle,
}

const DIALECT_NAMES: &[(Dialect, &str)] = &[
    (Dialect::SqlServer, "sqlserver"),
    (Dialect::PostgreSql, "postgresql"),
    (Dialect::MySql, "mysql"),
    (Dialect::Sqlite, "sqlite"),
    (Dialect::Oracle, "oracle"),
];

impl Dialect {
    pub fn as_str(self) -> &'static str {
        DIALECT_NAMES
            .iter()
            .find(|(dialect, _)| *dialect == self)
            .map(|(_, name)| *name)
            .unwrap_or("sqlserver")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        DIALECT_NAMES
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(dialect, _)| *dialect)
    }
}

/// Generation settings passed explicitly to the builder and both emitters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub naming: NamingMode,
    /// Prepended to table identifiers only.
    pub table_prefix: String,
    /// Default key generation strategy for single-column keys.
    pub id_generator: IdGenerator,
    /// Default laziness of mapped classes.
    pub lazy: bool,
    pub dialect: Dialect,
    /// Character wrapped around table and column names in the mapping document.
    pub identifier_quote: Option<char>,
    /// Assembly recorded on the mapping root.
    pub assembly: String,
    /// Namespace recorded on the mapping root.
    pub namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            naming: NamingMode::Verbatim,
            table_prefix: String::new(),
            id_generator: IdGenerator::Native,
            lazy: true,
            dialect: Dialect::SqlServer,
            identifier_quote: Some('`'),
            assembly: "Model".to_string(),
            namespace: "Model".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn naming_policy(&self) -> NamingPolicy {
        NamingPolicy::new(self.naming, self.table_prefix.clone())
    }

    /// Wrap an identifier in the configured mapping quote character.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self.identifier_quote {
            Some(quote) => format!("{quote}{identifier}{quote}"),
            None => identifier.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_names_round_trip_through_lookup() {
        for (generator, name) in ID_GENERATOR_NAMES {
            assert_eq!(generator.as_str(), *name);
            assert_eq!(IdGenerator::from_name(name), Some(*generator));
        }
        assert_eq!(IdGenerator::from_name("GUID.COMB"), Some(IdGenerator::GuidComb));
        assert_eq!(IdGenerator::from_name("sequential"), None);
    }

    #[test]
    fn dialect_names_parse_case_insensitively() {
        assert_eq!(Dialect::from_name("PostgreSQL"), Some(Dialect::PostgreSql));
        assert_eq!(Dialect::from_name("db2"), None);
        assert_eq!(Dialect::Sqlite.as_str(), "sqlite");
    }

    #[test]
    fn loads_partial_toml_with_defaults() {
        let config: GeneratorConfig = toml::from_str(
            r#"
naming = "normalized"
table_prefix = "app_"
id_generator = "guid.comb"
dialect = "postgresql"
"#,
        )
        .expect("parse config");

        assert_eq!(config.naming, NamingMode::Normalized);
        assert_eq!(config.table_prefix, "app_");
        assert_eq!(config.id_generator, IdGenerator::GuidComb);
        assert_eq!(config.dialect, Dialect::PostgreSql);
        assert!(config.lazy);
        assert_eq!(config.identifier_quote, Some('`'));
    }

    #[test]
    fn quotes_identifiers_only_when_configured() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.quote_identifier("order"), "`order`");

        config.identifier_quote = None;
        assert_eq!(config.quote_identifier("order"), "order");
    }
}
