//! Column descriptor type.
//!
//! A descriptor ties a column's name as reported (or requested) to the
//! identifier used by the record codecs and to its resolved types.

use crate::error::Result;
use crate::protocol::identifier::sanitize;

use super::canonical::CanonicalType;
use super::type_code::TypeCode;

/// One field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name exactly as requested, case preserved.
    pub original_name: String,
    /// Sanitized identifier used by all codecs.
    pub identifier: String,
    /// Canonical value type.
    pub canonical_type: CanonicalType,
    /// Source SQL type, used to bind typed NULL parameters.
    pub type_code: TypeCode,
    /// 1-based position on the read path.
    pub ordinal: usize,
}

impl ColumnDescriptor {
    /// Create a descriptor, resolving the canonical type and identifier.
    ///
    /// Returns error if the type code has no canonical type.
    pub fn new(original_name: impl Into<String>, type_code: TypeCode, ordinal: usize) -> Result<Self> {
        let original_name = original_name.into();
        let canonical_type = CanonicalType::resolve(&original_name, type_code)?;
        Ok(Self {
            identifier: sanitize(&original_name),
            original_name,
            canonical_type,
            type_code,
            ordinal,
        })
    }
}
