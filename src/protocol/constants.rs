//! Record protocol constants.
//!
//! Raw SQL type codes follow the JDBC `java.sql.Types` numbering, which is what
//! catalog layers report for result set metadata.

// Record format
/// Version of the record layout. Bump whenever the emitted wire layout changes.
pub const RECORD_FORMAT_VERSION: u32 = 3;

// SQL type codes
pub const SQL_TYPE_BIT: i32 = -7;
pub const SQL_TYPE_TINYINT: i32 = -6;
pub const SQL_TYPE_SMALLINT: i32 = 5;
pub const SQL_TYPE_INTEGER: i32 = 4;
pub const SQL_TYPE_BIGINT: i32 = -5;
pub const SQL_TYPE_FLOAT: i32 = 6;
pub const SQL_TYPE_REAL: i32 = 7;
pub const SQL_TYPE_DOUBLE: i32 = 8;
pub const SQL_TYPE_NUMERIC: i32 = 2;
pub const SQL_TYPE_DECIMAL: i32 = 3;
pub const SQL_TYPE_CHAR: i32 = 1;
pub const SQL_TYPE_VARCHAR: i32 = 12;
pub const SQL_TYPE_LONGVARCHAR: i32 = -1;
pub const SQL_TYPE_DATE: i32 = 91;
pub const SQL_TYPE_TIME: i32 = 92;
pub const SQL_TYPE_TIMESTAMP: i32 = 93;
pub const SQL_TYPE_BINARY: i32 = -2;
pub const SQL_TYPE_VARBINARY: i32 = -3;
pub const SQL_TYPE_LONGVARBINARY: i32 = -4;
pub const SQL_TYPE_NULL: i32 = 0;
pub const SQL_TYPE_OTHER: i32 = 1111;
pub const SQL_TYPE_JAVA_OBJECT: i32 = 2000;
pub const SQL_TYPE_DISTINCT: i32 = 2001;
pub const SQL_TYPE_STRUCT: i32 = 2002;
pub const SQL_TYPE_ARRAY: i32 = 2003;
pub const SQL_TYPE_BLOB: i32 = 2004;
pub const SQL_TYPE_CLOB: i32 = 2005;
pub const SQL_TYPE_REF: i32 = 2006;
pub const SQL_TYPE_BOOLEAN: i32 = 16;
pub const SQL_TYPE_ROWID: i32 = -8;
pub const SQL_TYPE_NCHAR: i32 = -15;
pub const SQL_TYPE_NVARCHAR: i32 = -9;
pub const SQL_TYPE_LONGNVARCHAR: i32 = -16;
pub const SQL_TYPE_NCLOB: i32 = 2011;
pub const SQL_TYPE_SQLXML: i32 = 2009;

// Text protocol
/// Token written for a null field and read back as null.
pub const DEFAULT_NULL_SENTINEL: &str = "null";
/// Prefix of the textual form of an externally stored large object.
pub const EXTERNAL_LOB_PREFIX: &str = "externalLob(";
/// Storage kind tag inside an external large object reference.
pub const EXTERNAL_LOB_KIND: &str = "lf";

// Metadata probes
/// Placeholder free-form queries must carry in their WHERE clause.
pub const CONDITIONS_TOKEN: &str = "$CONDITIONS";
/// Predicate substituted for the placeholder so the probe returns no rows.
pub const EMPTY_CONDITION: &str = " (1 = 0) ";

// Large objects
/// Largest LOB kept inline by the staging loader (16 MiB).
pub const DEFAULT_MAX_INLINE_LOB_LEN: u64 = 16 * 1024 * 1024;

// Wire null framing
pub const WIRE_FIELD_NULL: u8 = 1;
pub const WIRE_FIELD_PRESENT: u8 = 0;
pub const WIRE_LOB_EXTERNAL: u8 = 1;
pub const WIRE_LOB_INLINE: u8 = 0;
pub const WIRE_DECIMAL_COMPACT: u8 = 0;
pub const WIRE_DECIMAL_STRING: u8 = 1;
