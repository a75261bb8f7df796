use ermgen_core::{ColumnType, Dialect, TypeKind};

/// Dialect-specific pieces of DDL syntax.
pub trait SqlSyntax {
    /// Quote an identifier, doubling any embedded closing quote.
    fn quote(&self, identifier: &str) -> String;

    /// Type keyword including length or precision-scale.
    fn column_type(&self, ty: &ColumnType) -> String;

    /// Clause making an integer key database-generated.
    fn identity_clause(&self) -> &'static str;

    /// Whether the identity clause already declares the primary key.
    fn identity_declares_key(&self) -> bool;

    /// Whether foreign keys can be added after `CREATE TABLE`.
    fn supports_alter_foreign_key(&self) -> bool;
}

impl SqlSyntax for Dialect {
    fn quote(&self, identifier: &str) -> String {
        let (open, close) = match self {
            Dialect::SqlServer => ('[', ']'),
            Dialect::MySql => ('`', '`'),
            Dialect::PostgreSql | Dialect::Sqlite | Dialect::Oracle => ('"', '"'),
        };
        let escaped = identifier.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    fn column_type(&self, ty: &ColumnType) -> String {
        let length = ty.length.unwrap_or(ermgen_core::types::DEFAULT_TEXT_LENGTH);

        match (self, ty.kind) {
            (Dialect::SqlServer, TypeKind::Boolean) => "BIT".to_string(),
            (Dialect::PostgreSql, TypeKind::Boolean) => "BOOLEAN".to_string(),
            (Dialect::MySql, TypeKind::Boolean) => "TINYINT(1)".to_string(),
            (Dialect::Sqlite, TypeKind::Boolean) => "INTEGER".to_string(),
            (Dialect::Oracle, TypeKind::Boolean) => "NUMBER(1)".to_string(),

            (Dialect::MySql, TypeKind::Int8) => "TINYINT".to_string(),
            (Dialect::Oracle, TypeKind::Int8) => "NUMBER(3)".to_string(),
            (Dialect::Oracle, TypeKind::Int16) => "NUMBER(5)".to_string(),
            (Dialect::Oracle, TypeKind::Int32) => "NUMBER(10)".to_string(),
            (Dialect::Oracle, TypeKind::Int64) => "NUMBER(19)".to_string(),
            (Dialect::Sqlite, kind) if kind.is_integer() => "INTEGER".to_string(),
            (_, TypeKind::Int8 | TypeKind::Int16) => "SMALLINT".to_string(),
            (Dialect::PostgreSql, TypeKind::Int32) => "INTEGER".to_string(),
            (_, TypeKind::Int32) => "INT".to_string(),
            (_, TypeKind::Int64) => "BIGINT".to_string(),

            (Dialect::Oracle, TypeKind::Single) => "BINARY_FLOAT".to_string(),
            (Dialect::MySql, TypeKind::Single) => "FLOAT".to_string(),
            (_, TypeKind::Single) => "REAL".to_string(),
            (Dialect::SqlServer, TypeKind::Double) => "FLOAT".to_string(),
            (Dialect::PostgreSql, TypeKind::Double) => "DOUBLE PRECISION".to_string(),
            (Dialect::MySql, TypeKind::Double) => "DOUBLE".to_string(),
            (Dialect::Sqlite, TypeKind::Double) => "REAL".to_string(),
            (Dialect::Oracle, TypeKind::Double) => "BINARY_DOUBLE".to_string(),

            (_, TypeKind::Decimal) => {
                let keyword = match self {
                    Dialect::Oracle => "NUMBER",
                    Dialect::Sqlite => "NUMERIC",
                    _ => "DECIMAL",
                };
                match (ty.precision, ty.scale) {
                    (Some(precision), Some(scale)) => format!("{keyword}({precision},{scale})"),
                    (Some(precision), None) => format!("{keyword}({precision})"),
                    _ => keyword.to_string(),
                }
            }

            (Dialect::Sqlite, TypeKind::FixedChar | TypeKind::VarChar) => "TEXT".to_string(),
            (Dialect::SqlServer | Dialect::Oracle, TypeKind::FixedChar) => format!("NCHAR({length})"),
            (_, TypeKind::FixedChar) => format!("CHAR({length})"),
            (Dialect::SqlServer, TypeKind::VarChar) => format!("NVARCHAR({length})"),
            (Dialect::Oracle, TypeKind::VarChar) => format!("NVARCHAR2({length})"),
            (_, TypeKind::VarChar) => format!("VARCHAR({length})"),

            (Dialect::SqlServer, TypeKind::Blob) => "VARBINARY(MAX)".to_string(),
            (Dialect::PostgreSql, TypeKind::Blob | TypeKind::Object) => "BYTEA".to_string(),
            (Dialect::MySql, TypeKind::Blob) => "LONGBLOB".to_string(),
            (_, TypeKind::Blob) => "BLOB".to_string(),

            (Dialect::SqlServer, TypeKind::Timestamp) => "DATETIME2".to_string(),
            (Dialect::MySql, TypeKind::Timestamp) => "DATETIME".to_string(),
            (Dialect::Sqlite, TypeKind::Timestamp) => "TEXT".to_string(),
            (_, TypeKind::Timestamp) => "TIMESTAMP".to_string(),

            (Dialect::SqlServer, TypeKind::Uuid) => "UNIQUEIDENTIFIER".to_string(),
            (Dialect::PostgreSql, TypeKind::Uuid) => "UUID".to_string(),
            (Dialect::MySql, TypeKind::Uuid) => "CHAR(36)".to_string(),
            (Dialect::Sqlite, TypeKind::Uuid) => "TEXT".to_string(),
            (Dialect::Oracle, TypeKind::Uuid) => "RAW(16)".to_string(),

            (Dialect::SqlServer, TypeKind::Object) => "SQL_VARIANT".to_string(),
            (_, TypeKind::Object) => "BLOB".to_string(),
        }
    }

    fn identity_clause(&self) -> &'static str {
        match self {
            Dialect::SqlServer => "IDENTITY(1,1)",
            Dialect::PostgreSql | Dialect::Oracle => "GENERATED BY DEFAULT AS IDENTITY",
            Dialect::MySql => "AUTO_INCREMENT",
            Dialect::Sqlite => "PRIMARY KEY AUTOINCREMENT",
        }
    }

    fn identity_declares_key(&self) -> bool {
        matches!(self, Dialect::Sqlite)
    }

    fn supports_alter_foreign_key(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }
}
