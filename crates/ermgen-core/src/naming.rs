use heck::ToSnakeCase;

use crate::config::NamingMode;
use crate::model::{Attribute, Class};

/// What an identifier names; only tables receive the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Column,
}

/// Derives table and column identifiers from raw model names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    mode: NamingMode,
    prefix: String,
}

impl NamingPolicy {
    pub fn new(mode: NamingMode, prefix: impl Into<String>) -> Self {
        Self {
            mode,
            prefix: prefix.into(),
        }
    }

    pub fn resolve(&self, raw: &str, kind: IdentifierKind) -> String {
        let base = match self.mode {
            NamingMode::Verbatim => raw.to_string(),
            NamingMode::Normalized => normalize(raw),
        };

        match kind {
            IdentifierKind::Table if !self.prefix.is_empty() => format!("{}{base}", self.prefix),
            _ => base,
        }
    }

    /// Table identifier for a class, honoring its override under verbatim naming.
    pub fn table_name(&self, class: &Class) -> String {
        let raw = match (self.mode, &class.table) {
            (NamingMode::Verbatim, Some(table)) if !table.is_empty() => table.as_str(),
            _ => class.name.as_str(),
        };
        self.resolve(raw, IdentifierKind::Table)
    }

    /// Column identifier for an attribute, honoring its override under verbatim naming.
    pub fn column_name(&self, attribute: &Attribute) -> String {
        let raw = match (self.mode, &attribute.column) {
            (NamingMode::Verbatim, Some(column)) if !column.is_empty() => column.as_str(),
            _ => attribute.name.as_str(),
        };
        self.resolve(raw, IdentifierKind::Column)
    }
}

fn normalize(raw: &str) -> String {
    raw.to_snake_case()
}
