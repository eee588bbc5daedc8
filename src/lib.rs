//! SQL record type compiler for Rust
//!
//! Compiles the result metadata of a table or free-form query (column names and
//! SQL type codes) into a record type that moves its data across three
//! protocols:
//!
//! - the database driver: reading result rows and binding statement parameters,
//!   with large objects loaded on demand
//! - a compact binary wire format for shipping records between workers
//! - delimited text with configurable separators, enclosure, escape and null
//!   sentinel
//!
//! # Example
//!
//! ```
//! use sql_record_rs::{CompileOptions, FieldValue, MemoryCatalog, RecordCompiler, Result};
//! use sql_record_rs::protocol::constants::{SQL_TYPE_INTEGER, SQL_TYPE_TIMESTAMP, SQL_TYPE_VARCHAR};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Metadata normally comes from a live catalog
//!     let mut catalog = MemoryCatalog::new().with_table(
//!         "employees",
//!         [
//!             ("id", SQL_TYPE_INTEGER),
//!             ("name", SQL_TYPE_VARCHAR),
//!             ("created_at", SQL_TYPE_TIMESTAMP),
//!         ],
//!     );
//!
//!     let record_type = RecordCompiler::new(CompileOptions::table("employees"))
//!         .compile(&mut catalog)
//!         .await?;
//!
//!     // Text in, wire out
//!     let record = record_type.parse_default("1,Aaron,2009-05-14 00:00:00.0\n")?;
//!     assert_eq!(record.get_by_name("name"), Some(&FieldValue::Text("Aaron".into())));
//!
//!     let bytes = record_type.encode(&record)?;
//!     assert_eq!(record_type.decode(&bytes)?, record);
//!
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod protocol;
pub mod source;

// Re-export main types
pub use compiler::{CompileOptions, GeneratedRecordType, RecordCompiler};
pub use error::{Error, Result};
pub use protocol::codec::{
    DelimiterSet, LobLoader, ParameterSink, RowSource, StagingLobLoader,
};
pub use protocol::types::{
    BlobRef, CanonicalType, ClobRef, ColumnDescriptor, ExternalLob, FieldValue, Record,
    RecordSchema, TypeCode,
};
pub use source::{MemoryCatalog, ReportedColumn, SchemaSource, SchemaTarget};
