use serde::{Deserialize, Serialize};

/// Default length of variable-length text columns.
pub const DEFAULT_TEXT_LENGTH: u32 = 255;
/// Default precision and scale of fixed-point columns.
pub const DEFAULT_DECIMAL_PRECISION: u8 = 18;
pub const DEFAULT_DECIMAL_SCALE: u8 = 5;
/// Digits needed for the full unsigned 64-bit range.
pub const UNSIGNED_64_PRECISION: u8 = 20;

/// Dialect-independent storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    FixedChar,
    VarChar,
    Blob,
    Timestamp,
    Uuid,
    /// Opaque fallback for otherwise unconstrained values.
    Object,
}

impl TypeKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKind::Int8 | TypeKind::Int16 | TypeKind::Int32 | TypeKind::Int64
        )
    }
}

/// Canonical column type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType {
    pub kind: TypeKind,
    pub length: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl ColumnType {
    pub const fn of(kind: TypeKind) -> Self {
        Self {
            kind,
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub const fn text(kind: TypeKind, length: u32) -> Self {
        Self {
            kind,
            length: Some(length),
            precision: None,
            scale: None,
        }
    }

    pub const fn decimal(precision: u8, scale: u8) -> Self {
        Self {
            kind: TypeKind::Decimal,
            length: None,
            precision: Some(precision),
            scale: Some(scale),
        }
    }
}

/// Map a model scalar type name to its column type.
///
/// Names are matched case-insensitively after dropping a `System.`
/// qualifier. Unsigned integers are widened to the next signed width; the
/// unsigned 64-bit integer has none and becomes a scale-0 decimal.
pub fn map_scalar(type_name: &str) -> Option<ColumnType> {
    let trimmed = type_name.trim();
    let unqualified = match trimmed.get(..7) {
        Some(head) if head.eq_ignore_ascii_case("system.") => &trimmed[7..],
        _ => trimmed,
    };
    let name = unqualified.to_ascii_lowercase();

    let column_type = match name.as_str() {
        "bool" | "boolean" => ColumnType::of(TypeKind::Boolean),
        "sbyte" | "i8" | "int8" => ColumnType::of(TypeKind::Int8),
        "byte" | "u8" | "uint8" => ColumnType::of(TypeKind::Int16),
        "short" | "i16" | "int16" => ColumnType::of(TypeKind::Int16),
        "ushort" | "u16" | "uint16" => ColumnType::of(TypeKind::Int32),
        "int" | "i32" | "int32" => ColumnType::of(TypeKind::Int32),
        "uint" | "u32" | "uint32" => ColumnType::of(TypeKind::Int64),
        "long" | "i64" | "int64" => ColumnType::of(TypeKind::Int64),
        "ulong" | "u64" | "uint64" => ColumnType::decimal(UNSIGNED_64_PRECISION, 0),
        "float" | "f32" | "single" => ColumnType::of(TypeKind::Single),
        "double" | "f64" => ColumnType::of(TypeKind::Double),
        "decimal" => ColumnType::decimal(DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE),
        "char" => ColumnType::text(TypeKind::FixedChar, 1),
        "string" | "str" | "text" => ColumnType::text(TypeKind::VarChar, DEFAULT_TEXT_LENGTH),
        "byte[]" | "bytes" | "binary" => ColumnType::of(TypeKind::Blob),
        "datetime" => ColumnType::of(TypeKind::Timestamp),
        "guid" | "uuid" => ColumnType::of(TypeKind::Uuid),
        "object" => ColumnType::of(TypeKind::Object),
        _ => return None,
    };

    Some(column_type)
}
