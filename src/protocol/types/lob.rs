//! Large object references for CLOB and BLOB columns.
//!
//! A large object reaches a record in one of two ways:
//! 1. **Inline**: the payload is small enough to be held in the record itself
//! 2. **External**: the payload was staged into a file by a LOB loader and the
//!    record only carries the file, offset and length
//!
//! The textual form of an external reference is
//! `externalLob(lf,<file>,<offset>,<length>)`.

use crate::protocol::constants::{EXTERNAL_LOB_KIND, EXTERNAL_LOB_PREFIX};

/// Location of a large object staged outside the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLob {
    /// File holding the payload.
    pub file: String,
    /// Offset of the payload within the file.
    pub offset: u64,
    /// Payload length in bytes.
    pub length: u64,
}

impl ExternalLob {
    /// Create a new external reference.
    pub fn new(file: impl Into<String>, offset: u64, length: u64) -> Self {
        Self {
            file: file.into(),
            offset,
            length,
        }
    }

    /// Parse the `externalLob(lf,file,offset,length)` form.
    ///
    /// Returns `None` if the text is not an external reference. The file name
    /// may itself contain commas; offset and length are taken from the end.
    pub fn parse(text: &str) -> Option<Self> {
        let inner = text.strip_prefix(EXTERNAL_LOB_PREFIX)?.strip_suffix(')')?;
        let inner = inner.strip_prefix(EXTERNAL_LOB_KIND)?.strip_prefix(',')?;
        let mut parts = inner.rsplitn(3, ',');
        let length = parts.next()?.parse().ok()?;
        let offset = parts.next()?.parse().ok()?;
        let file = parts.next()?;
        if file.is_empty() {
            return None;
        }
        Some(Self::new(file, offset, length))
    }
}

impl std::fmt::Display for ExternalLob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{},{},{},{})",
            EXTERNAL_LOB_PREFIX, EXTERNAL_LOB_KIND, self.file, self.offset, self.length
        )
    }
}

/// Character large object value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClobRef {
    /// Character data held in the record.
    Inline(String),
    /// Character data staged in an external file.
    External(ExternalLob),
}

impl ClobRef {
    /// Check if the payload is held in the record.
    pub fn is_inline(&self) -> bool {
        matches!(self, ClobRef::Inline(_))
    }

    /// Get the inline character data.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClobRef::Inline(s) => Some(s),
            ClobRef::External(_) => None,
        }
    }

    /// Get the external location.
    pub fn external(&self) -> Option<&ExternalLob> {
        match self {
            ClobRef::External(ext) => Some(ext),
            ClobRef::Inline(_) => None,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            ClobRef::Inline(s) => s.len() as u64,
            ClobRef::External(ext) => ext.length,
        }
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Binary large object value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRef {
    /// Binary data held in the record.
    Inline(Vec<u8>),
    /// Binary data staged in an external file.
    External(ExternalLob),
}

impl BlobRef {
    /// Check if the payload is held in the record.
    pub fn is_inline(&self) -> bool {
        matches!(self, BlobRef::Inline(_))
    }

    /// Get the inline binary data.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BlobRef::Inline(data) => Some(data),
            BlobRef::External(_) => None,
        }
    }

    /// Get the external location.
    pub fn external(&self) -> Option<&ExternalLob> {
        match self {
            BlobRef::External(ext) => Some(ext),
            BlobRef::Inline(_) => None,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            BlobRef::Inline(data) => data.len() as u64,
            BlobRef::External(ext) => ext.length,
        }
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
