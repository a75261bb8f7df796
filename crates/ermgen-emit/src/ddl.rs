use std::collections::BTreeSet;

use ermgen_core::{Column, Dialect, ForeignKeyRef, GENERATOR_VERSION, Table, TableGraph};

use crate::dialect::SqlSyntax;

/// Serialize a table graph into schema definition text.
///
/// Tables are written in finalization order, so a referenced table is
/// normally defined before the tables referencing it. Foreign keys closing
/// an association cycle point at a table defined later and are written as
/// trailing `ALTER TABLE` statements instead, except on SQLite which cannot
/// add constraints to existing tables and does not check targets on create.
pub fn emit_ddl(graph: &TableGraph, dialect: Dialect) -> String {
    let mut statements = Vec::new();
    let mut deferred = Vec::new();
    let mut defined: BTreeSet<&str> = BTreeSet::new();

    for table in graph.tables() {
        defined.insert(table.name.as_str());
        statements.push(create_table(table, dialect, &defined, &mut deferred));
    }

    statements.extend(deferred);

    let mut out = format!("-- Generated by {GENERATOR_VERSION} for {}\n", dialect.as_str());
    for statement in statements {
        out.push('\n');
        out.push_str(&statement);
        out.push('\n');
    }
    out
}

fn create_table(
    table: &Table,
    dialect: Dialect,
    defined: &BTreeSet<&str>,
    deferred: &mut Vec<String>,
) -> String {
    let generated_key = generated_key_column(table);
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| column_definition(column, dialect, generated_key == Some(column.name.as_str())))
        .collect();

    if let Some(key) = &table.primary_key {
        let declared_inline = generated_key.is_some() && dialect.identity_declares_key();
        if !declared_inline {
            lines.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                dialect.quote(&format!("PK_{}", table.name)),
                quoted_list(&key.columns, dialect)
            ));
        }
    }

    for column in table.foreign_keys() {
        let Some(reference) = &column.references else {
            continue;
        };
        let constraint = foreign_key_constraint(table, column, reference, dialect);
        if defined.contains(reference.table.as_str()) || !dialect.supports_alter_foreign_key() {
            lines.push(constraint);
        } else {
            deferred.push(format!(
                "ALTER TABLE {} ADD {constraint};",
                dialect.quote(&table.name)
            ));
        }
    }

    format!(
        "CREATE TABLE {} (\n    {}\n);",
        dialect.quote(&table.name),
        lines.join(",\n    ")
    )
}

/// Single integer key column assigned by the database, if any.
fn generated_key_column(table: &Table) -> Option<&str> {
    let key = table.primary_key.as_ref()?;
    let generator = key.generator?;
    if key.is_composite() || !generator.is_database_generated() {
        return None;
    }
    let column = table.first_key_column()?;
    (column.ty.kind.is_integer() && column.references.is_none()).then_some(column.name.as_str())
}

fn column_definition(column: &Column, dialect: Dialect, generated: bool) -> String {
    let mut parts = vec![dialect.quote(&column.name), dialect.column_type(&column.ty)];

    if generated && !dialect.identity_declares_key() {
        parts.push(dialect.identity_clause().to_string());
    }
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    if generated && dialect.identity_declares_key() {
        parts.push(dialect.identity_clause().to_string());
    }
    if column.unique && !column.primary_key {
        parts.push("UNIQUE".to_string());
    }

    parts.join(" ")
}

fn foreign_key_constraint(
    table: &Table,
    column: &Column,
    reference: &ForeignKeyRef,
    dialect: Dialect,
) -> String {
    format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        dialect.quote(&format!("FK_{}_{}", table.name, column.name)),
        dialect.quote(&column.name),
        dialect.quote(&reference.table),
        dialect.quote(&reference.column)
    )
}

fn quoted_list(names: &[String], dialect: Dialect) -> String {
    names
        .iter()
        .map(|name| dialect.quote(name))
        .collect::<Vec<_>>()
        .join(", ")
}
