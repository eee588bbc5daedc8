//! Error types for record compilation and the record codecs.

use std::io;
use std::panic::Location;
use thiserror::Error;

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for schema compilation and record marshalling.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a driver handle or the LOB staging area.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A column's SQL type code has no canonical type.
    #[error("Unsupported SQL type {type_code} for column {column}")]
    UnsupportedType { column: String, type_code: i32 },

    /// Two distinct column names sanitize to the same identifier.
    #[error("Columns '{first}' and '{second}' both map to identifier '{identifier}'")]
    IdentifierCollision {
        first: String,
        second: String,
        identifier: String,
    },

    /// A write-path column is not part of the read path.
    #[error("Write column '{column}' is not a selected column of {table}")]
    UnknownWriteColumn { column: String, table: String },

    /// A write-path column is listed twice.
    #[error("Write column '{column}' listed more than once")]
    DuplicateWriteColumn { column: String },

    /// A requested column is not reported by the schema source.
    #[error("Column '{column}' not found in {table}")]
    UnknownColumn { column: String, table: String },

    /// The schema has no columns at all.
    #[error("No columns to generate for {table}")]
    EmptySchema { table: String },

    /// A wire payload was produced by a different record format.
    #[error("Record format version mismatch: expected {expected}, got {actual}")]
    FormatVersionMismatch { expected: u32, actual: u32 },

    /// A literal text value equals the null sentinel and cannot be quoted.
    #[error("Value of column {column} equals the null sentinel '{sentinel}' and cannot be escaped")]
    NullSentinelAmbiguity { column: String, sentinel: String },

    /// A text value contains delimiters but no escape or enclosure is configured.
    #[error("Value of column {column} contains a delimiter and cannot be escaped or enclosed")]
    UnescapableValue { column: String },

    /// A free-form query lacks the `$CONDITIONS` placeholder.
    #[error("Query [{query}] must contain '$CONDITIONS' in WHERE clause")]
    MissingConditionsToken { query: String },

    /// A schema request was issued while a previous result was still open.
    #[error("Previous metadata result must be released before issuing: {request}")]
    ResultStillOpen { request: String },

    /// Error reported by the schema source or the database driver.
    #[error("Schema source error: {message}")]
    Source { message: String },

    /// Buffer too small.
    #[error("Buffer too small: need {needed} bytes, have {available} filed at {location}")]
    BufferTooSmall {
        needed: usize,
        available: usize,
        location: &'static Location<'static>,
    },

    /// Bytes left over after decoding a record.
    #[error("{remaining} trailing bytes after record")]
    TrailingBytes { remaining: usize },

    /// Malformed wire data.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// A text token could not be parsed for its column.
    #[error("Cannot parse column {column}: {message}")]
    Parse { column: String, message: String },

    /// A text record has the wrong number of fields.
    #[error("Expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// A field value does not match the column's canonical type.
    #[error("Column {column} expects {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Column not found.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// An externally staged LOB cannot be bound as a statement parameter.
    #[error("Cannot bind externally stored large object in column {column}")]
    ExternalLobWrite { column: String },

    /// Deferred LOB loading needs the cursor the record was read from.
    #[error("Record has no retained cursor; read it with read_from before loading large objects")]
    MissingCursor,
}

impl Error {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a schema source error.
    pub fn schema_source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a parse error for a column.
    pub fn parse(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            column: column.into(),
            message: message.into(),
        }
    }

    #[track_caller]
    pub(crate) fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall {
            needed,
            available,
            location: Location::caller(),
        }
    }
}
