//! Canonical value types and SQL type resolution.
//!
//! Every source type code is normalized into one `CanonicalType` before any
//! protocol-specific encoding happens. The codecs select their accessors by an
//! exhaustive match on this enum, so adding a variant without a codec is a
//! compile error.

use crate::error::{Error, Result};

use super::type_code::TypeCode;

/// Value domain a source SQL type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Text,
    Decimal,
    Date,
    Time,
    Timestamp,
    ByteSequence,
    ClobRef,
    BlobRef,
    /// Lossy fallback for structured vendor types (arrays): stringified only.
    Opaque,
}

/// Direction of a protocol accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    /// Verb used as accessor name prefix.
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Read => "read",
            Direction::Write => "write",
        }
    }
}

impl CanonicalType {
    /// Resolve the canonical type for a column's source type.
    ///
    /// Returns `Err(Error::UnsupportedType)` naming the column when the code has
    /// no mapping.
    pub fn resolve(column: &str, type_code: TypeCode) -> Result<Self> {
        let canonical = match type_code {
            TypeCode::Integer | TypeCode::TinyInt | TypeCode::SmallInt => CanonicalType::Integer,
            TypeCode::BigInt => CanonicalType::Long,
            TypeCode::Real => CanonicalType::Float,
            TypeCode::Float | TypeCode::Double => CanonicalType::Double,
            TypeCode::Numeric | TypeCode::Decimal => CanonicalType::Decimal,
            TypeCode::Bit | TypeCode::Boolean => CanonicalType::Boolean,
            TypeCode::Char
            | TypeCode::Varchar
            | TypeCode::LongVarchar
            | TypeCode::NChar
            | TypeCode::NVarchar
            | TypeCode::LongNVarchar => CanonicalType::Text,
            TypeCode::Date => CanonicalType::Date,
            TypeCode::Time => CanonicalType::Time,
            TypeCode::Timestamp => CanonicalType::Timestamp,
            TypeCode::Binary | TypeCode::VarBinary => CanonicalType::ByteSequence,
            TypeCode::Clob | TypeCode::NClob => CanonicalType::ClobRef,
            TypeCode::Blob | TypeCode::LongVarBinary => CanonicalType::BlobRef,
            TypeCode::Array => {
                log::warn!(
                    "Column {} has ARRAY type; mapping to an opaque string value",
                    column
                );
                CanonicalType::Opaque
            }
            TypeCode::Unsupported(code) => {
                return Err(Error::UnsupportedType {
                    column: column.to_string(),
                    type_code: code,
                })
            }
        };
        Ok(canonical)
    }

    /// Simple (unqualified) name of the type.
    pub fn simple_name(&self) -> &'static str {
        match self {
            CanonicalType::Integer => "integer",
            CanonicalType::Long => "long",
            CanonicalType::Float => "float",
            CanonicalType::Double => "double",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Text => "text",
            CanonicalType::Decimal => "decimal",
            CanonicalType::Date => "date",
            CanonicalType::Time => "time",
            CanonicalType::Timestamp => "timestamp",
            CanonicalType::ByteSequence => "byteSequence",
            CanonicalType::ClobRef => "clobRef",
            CanonicalType::BlobRef => "blobRef",
            CanonicalType::Opaque => "opaque",
        }
    }

    /// Check if values of this type are large objects loaded in a second pass.
    pub fn is_lob(&self) -> bool {
        matches!(self, CanonicalType::ClobRef | CanonicalType::BlobRef)
    }
}

/// Name of the protocol accessor for a canonical type.
///
/// The verb of the direction followed by the type's simple name with its first
/// character capitalized: `readInteger`, `writeClobRef`.
pub fn accessor_name(direction: Direction, canonical: CanonicalType) -> String {
    let name = canonical.simple_name();
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}", direction.verb(), capitalized)
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
