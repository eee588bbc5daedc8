//! Field value types held by records.

use super::canonical::CanonicalType;
use super::lob::{BlobRef, ClobRef};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

/// Value of a single record field.
///
/// Every field can independently be `Null`, whatever its canonical type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// NULL value.
    Null,
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Character data (CHAR, VARCHAR, ...).
    Text(String),
    /// Exact decimal (NUMERIC, DECIMAL).
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Raw binary value (BINARY, VARBINARY).
    Bytes(Vec<u8>),
    /// CLOB value, inline or staged externally.
    Clob(ClobRef),
    /// BLOB value, inline or staged externally.
    Blob(BlobRef),
    /// Stringified value of a type without per-element typing (ARRAY).
    Opaque(String),
}

impl FieldValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Canonical type of the value, `None` for NULL.
    pub fn canonical_type(&self) -> Option<CanonicalType> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(_) => Some(CanonicalType::Integer),
            FieldValue::Long(_) => Some(CanonicalType::Long),
            FieldValue::Float(_) => Some(CanonicalType::Float),
            FieldValue::Double(_) => Some(CanonicalType::Double),
            FieldValue::Boolean(_) => Some(CanonicalType::Boolean),
            FieldValue::Text(_) => Some(CanonicalType::Text),
            FieldValue::Decimal(_) => Some(CanonicalType::Decimal),
            FieldValue::Date(_) => Some(CanonicalType::Date),
            FieldValue::Time(_) => Some(CanonicalType::Time),
            FieldValue::Timestamp(_) => Some(CanonicalType::Timestamp),
            FieldValue::Bytes(_) => Some(CanonicalType::ByteSequence),
            FieldValue::Clob(_) => Some(CanonicalType::ClobRef),
            FieldValue::Blob(_) => Some(CanonicalType::BlobRef),
            FieldValue::Opaque(_) => Some(CanonicalType::Opaque),
        }
    }

    /// Check if the value can be stored in a field of the given type.
    pub fn fits(&self, canonical: CanonicalType) -> bool {
        match self.canonical_type() {
            None => true,
            Some(t) => t == canonical,
        }
    }

    /// Short name of the value kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self.canonical_type() {
            None => "null",
            Some(t) => t.simple_name(),
        }
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Opaque(s) => Some(s),
            FieldValue::Clob(clob) => clob.as_str(),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v as i64),
            FieldValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Long(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v as f64),
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the value as a timestamp.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(bytes) => Some(bytes),
            FieldValue::Blob(blob) => blob.as_bytes(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Double(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Text(s) | FieldValue::Opaque(s) => write!(f, "{}", s),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            FieldValue::Bytes(bytes) => write!(f, "<BYTES: {} bytes>", bytes.len()),
            FieldValue::Clob(clob) => match clob {
                ClobRef::Inline(s) => write!(f, "{}", s),
                ClobRef::External(ext) => write!(f, "{}", ext),
            },
            FieldValue::Blob(blob) => match blob {
                BlobRef::Inline(data) => write!(f, "<BLOB: {} bytes>", data.len()),
                BlobRef::External(ext) => write!(f, "{}", ext),
            },
        }
    }
}
