//! Source SQL type codes.
//!
//! Catalog layers report column types as raw integers. `TypeCode` names the
//! ones the record compiler knows about; everything else is carried as
//! `Unsupported` so the resolver can report it against a column.

use crate::protocol::constants::*;

/// Source SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Boolean,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Clob,
    NClob,
    Blob,
    Array,
    /// Any code without a mapping (STRUCT, REF, OTHER, vendor codes, ...).
    Unsupported(i32),
}

impl TypeCode {
    /// Create from a raw SQL type code.
    pub fn from_raw(code: i32) -> Self {
        match code {
            SQL_TYPE_BIT => TypeCode::Bit,
            SQL_TYPE_TINYINT => TypeCode::TinyInt,
            SQL_TYPE_SMALLINT => TypeCode::SmallInt,
            SQL_TYPE_INTEGER => TypeCode::Integer,
            SQL_TYPE_BIGINT => TypeCode::BigInt,
            SQL_TYPE_REAL => TypeCode::Real,
            SQL_TYPE_FLOAT => TypeCode::Float,
            SQL_TYPE_DOUBLE => TypeCode::Double,
            SQL_TYPE_NUMERIC => TypeCode::Numeric,
            SQL_TYPE_DECIMAL => TypeCode::Decimal,
            SQL_TYPE_BOOLEAN => TypeCode::Boolean,
            SQL_TYPE_CHAR => TypeCode::Char,
            SQL_TYPE_VARCHAR => TypeCode::Varchar,
            SQL_TYPE_LONGVARCHAR => TypeCode::LongVarchar,
            SQL_TYPE_NCHAR => TypeCode::NChar,
            SQL_TYPE_NVARCHAR => TypeCode::NVarchar,
            SQL_TYPE_LONGNVARCHAR => TypeCode::LongNVarchar,
            SQL_TYPE_DATE => TypeCode::Date,
            SQL_TYPE_TIME => TypeCode::Time,
            SQL_TYPE_TIMESTAMP => TypeCode::Timestamp,
            SQL_TYPE_BINARY => TypeCode::Binary,
            SQL_TYPE_VARBINARY => TypeCode::VarBinary,
            SQL_TYPE_LONGVARBINARY => TypeCode::LongVarBinary,
            SQL_TYPE_CLOB => TypeCode::Clob,
            SQL_TYPE_NCLOB => TypeCode::NClob,
            SQL_TYPE_BLOB => TypeCode::Blob,
            SQL_TYPE_ARRAY => TypeCode::Array,
            other => TypeCode::Unsupported(other),
        }
    }

    /// Get the raw SQL type code.
    pub fn raw(&self) -> i32 {
        match self {
            TypeCode::Bit => SQL_TYPE_BIT,
            TypeCode::TinyInt => SQL_TYPE_TINYINT,
            TypeCode::SmallInt => SQL_TYPE_SMALLINT,
            TypeCode::Integer => SQL_TYPE_INTEGER,
            TypeCode::BigInt => SQL_TYPE_BIGINT,
            TypeCode::Real => SQL_TYPE_REAL,
            TypeCode::Float => SQL_TYPE_FLOAT,
            TypeCode::Double => SQL_TYPE_DOUBLE,
            TypeCode::Numeric => SQL_TYPE_NUMERIC,
            TypeCode::Decimal => SQL_TYPE_DECIMAL,
            TypeCode::Boolean => SQL_TYPE_BOOLEAN,
            TypeCode::Char => SQL_TYPE_CHAR,
            TypeCode::Varchar => SQL_TYPE_VARCHAR,
            TypeCode::LongVarchar => SQL_TYPE_LONGVARCHAR,
            TypeCode::NChar => SQL_TYPE_NCHAR,
            TypeCode::NVarchar => SQL_TYPE_NVARCHAR,
            TypeCode::LongNVarchar => SQL_TYPE_LONGNVARCHAR,
            TypeCode::Date => SQL_TYPE_DATE,
            TypeCode::Time => SQL_TYPE_TIME,
            TypeCode::Timestamp => SQL_TYPE_TIMESTAMP,
            TypeCode::Binary => SQL_TYPE_BINARY,
            TypeCode::VarBinary => SQL_TYPE_VARBINARY,
            TypeCode::LongVarBinary => SQL_TYPE_LONGVARBINARY,
            TypeCode::Clob => SQL_TYPE_CLOB,
            TypeCode::NClob => SQL_TYPE_NCLOB,
            TypeCode::Blob => SQL_TYPE_BLOB,
            TypeCode::Array => SQL_TYPE_ARRAY,
            TypeCode::Unsupported(code) => *code,
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeCode::Bit => write!(f, "BIT"),
            TypeCode::TinyInt => write!(f, "TINYINT"),
            TypeCode::SmallInt => write!(f, "SMALLINT"),
            TypeCode::Integer => write!(f, "INTEGER"),
            TypeCode::BigInt => write!(f, "BIGINT"),
            TypeCode::Real => write!(f, "REAL"),
            TypeCode::Float => write!(f, "FLOAT"),
            TypeCode::Double => write!(f, "DOUBLE"),
            TypeCode::Numeric => write!(f, "NUMERIC"),
            TypeCode::Decimal => write!(f, "DECIMAL"),
            TypeCode::Boolean => write!(f, "BOOLEAN"),
            TypeCode::Char => write!(f, "CHAR"),
            TypeCode::Varchar => write!(f, "VARCHAR"),
            TypeCode::LongVarchar => write!(f, "LONGVARCHAR"),
            TypeCode::NChar => write!(f, "NCHAR"),
            TypeCode::NVarchar => write!(f, "NVARCHAR"),
            TypeCode::LongNVarchar => write!(f, "LONGNVARCHAR"),
            TypeCode::Date => write!(f, "DATE"),
            TypeCode::Time => write!(f, "TIME"),
            TypeCode::Timestamp => write!(f, "TIMESTAMP"),
            TypeCode::Binary => write!(f, "BINARY"),
            TypeCode::VarBinary => write!(f, "VARBINARY"),
            TypeCode::LongVarBinary => write!(f, "LONGVARBINARY"),
            TypeCode::Clob => write!(f, "CLOB"),
            TypeCode::NClob => write!(f, "NCLOB"),
            TypeCode::Blob => write!(f, "BLOB"),
            TypeCode::Array => write!(f, "ARRAY"),
            TypeCode::Unsupported(code) => write!(f, "UNSUPPORTED({})", code),
        }
    }
}
