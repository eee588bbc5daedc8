//! Record type compilation.
//!
//! [`RecordCompiler`] drives the pipeline: fetch schema metadata, resolve types,
//! sanitize identifiers, reconcile the write path, then build one codec table
//! per protocol. The result is a [`GeneratedRecordType`], immutable and shareable
//! across threads.
//!
//! # Example
//!
//! ```
//! use sql_record_rs::{CompileOptions, MemoryCatalog, RecordCompiler, Result};
//! use sql_record_rs::protocol::constants::{SQL_TYPE_INTEGER, SQL_TYPE_VARCHAR};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut catalog = MemoryCatalog::new().with_table(
//!         "employees",
//!         [("id", SQL_TYPE_INTEGER), ("name", SQL_TYPE_VARCHAR)],
//!     );
//!
//!     let options = CompileOptions::table("employees").with_write_columns(["name", "id"]);
//!     let record_type = RecordCompiler::new(options).compile(&mut catalog).await?;
//!
//!     let record = record_type.parse_default("1,Aaron\n")?;
//!     assert_eq!(record_type.format_default(&record)?, "1,Aaron\n");
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use log::debug;

use crate::error::Result;
use crate::protocol::buffer::{ReadBuffer, WriteBuffer};
use crate::protocol::codec::{
    DelimiterSet, JdbcCodec, LobLoader, ParameterSink, RowSource, TextCodec, WireCodec,
};
use crate::protocol::constants::{DEFAULT_NULL_SENTINEL, RECORD_FORMAT_VERSION};
use crate::protocol::types::{Record, RecordSchema};
use crate::source::{SchemaSource, SchemaTarget};

/// Options for compiling one record type.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Table or free-form query to compile for.
    pub target: SchemaTarget,
    /// Column subset/order, `None` for every column the source reports.
    pub columns: Option<Vec<String>>,
    /// Distinct column order for the database write path.
    pub write_columns: Option<Vec<String>>,
    /// Delimiters `parse_default` reads.
    pub input_delimiters: DelimiterSet,
    /// Delimiters `format_default` writes.
    pub output_delimiters: DelimiterSet,
    /// Text written for, and read back as, a null field.
    pub null_sentinel: String,
}

impl CompileOptions {
    /// Create options for a target with default delimiters and null sentinel.
    pub fn new(target: SchemaTarget) -> Self {
        Self {
            target,
            columns: None,
            write_columns: None,
            input_delimiters: DelimiterSet::default(),
            output_delimiters: DelimiterSet::default(),
            null_sentinel: DEFAULT_NULL_SENTINEL.to_string(),
        }
    }

    /// Options for a table.
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(SchemaTarget::table(name))
    }

    /// Options for a free-form query containing `$CONDITIONS`.
    pub fn query(sql: impl Into<String>) -> Self {
        Self::new(SchemaTarget::query(sql))
    }

    /// Select and order columns.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set a write path that differs from the read path.
    pub fn with_write_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the delimiters used for parsing.
    pub fn with_input_delimiters(mut self, delimiters: DelimiterSet) -> Self {
        self.input_delimiters = delimiters;
        self
    }

    /// Set the delimiters used for formatting.
    pub fn with_output_delimiters(mut self, delimiters: DelimiterSet) -> Self {
        self.output_delimiters = delimiters;
        self
    }

    /// Set the null sentinel.
    pub fn with_null_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.null_sentinel = sentinel.into();
        self
    }
}

/// Compiles record types from schema metadata.
#[derive(Debug, Clone)]
pub struct RecordCompiler {
    options: CompileOptions,
}

impl RecordCompiler {
    /// Create a compiler for the given options.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compile options in use.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Fetch metadata from `source` and compile.
    ///
    /// Each metadata result is released before the next request is issued,
    /// including when the request failed.
    pub async fn compile<S: SchemaSource>(&self, source: &mut S) -> Result<GeneratedRecordType> {
        let target = &self.options.target;
        debug!("Compiling record type for {}", target);

        let types = source.column_types(target).await;
        source.release().await?;
        let types = types?;

        let names = match self.options.columns {
            Some(_) => Vec::new(),
            None => {
                let names = source.column_names(target).await;
                source.release().await?;
                names?
            }
        };

        self.compile_metadata(&names, &types)
    }

    /// Compile from metadata already in hand.
    pub fn compile_metadata(
        &self,
        source_names: &[String],
        source_types: &HashMap<String, i32>,
    ) -> Result<GeneratedRecordType> {
        let schema = RecordSchema::build(
            self.options.target.table_name(),
            source_names,
            source_types,
            self.options.columns.as_deref(),
            self.options.write_columns.as_deref(),
        )?;
        Ok(GeneratedRecordType::new(Arc::new(schema), &self.options))
    }
}

/// A compiled record type: the schema plus one codec table per protocol.
pub struct GeneratedRecordType {
    schema: Arc<RecordSchema>,
    jdbc: JdbcCodec,
    wire: WireCodec,
    text: TextCodec,
    input_delimiters: DelimiterSet,
    output_delimiters: DelimiterSet,
    null_sentinel: String,
}

impl GeneratedRecordType {
    fn new(schema: Arc<RecordSchema>, options: &CompileOptions) -> Self {
        Self {
            jdbc: JdbcCodec::compile(schema.clone()),
            wire: WireCodec::compile(&schema),
            text: TextCodec::compile(&schema),
            schema,
            input_delimiters: options.input_delimiters,
            output_delimiters: options.output_delimiters,
            null_sentinel: options.null_sentinel.clone(),
        }
    }

    /// Record layout version stamped on every wire payload.
    pub fn format_version(&self) -> u32 {
        RECORD_FORMAT_VERSION
    }

    /// The compiled schema.
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Driver codec table, for accessor introspection.
    pub fn jdbc(&self) -> &JdbcCodec {
        &self.jdbc
    }

    /// Default parse delimiters.
    pub fn input_delimiters(&self) -> &DelimiterSet {
        &self.input_delimiters
    }

    /// Default format delimiters.
    pub fn output_delimiters(&self) -> &DelimiterSet {
        &self.output_delimiters
    }

    /// Null sentinel of the text protocol.
    pub fn null_sentinel(&self) -> &str {
        &self.null_sentinel
    }

    /// Create a record with every field null.
    pub fn new_record(&self) -> Record {
        Record::new(self.schema.clone())
    }

    /// Read a record from the current row of a driver cursor.
    pub fn read_from(&self, cursor: Arc<dyn RowSource>) -> Result<Record> {
        self.jdbc.read_from(cursor)
    }

    /// Bind the write path as statement parameters `offset + 1 ..`.
    pub fn write_to(
        &self,
        record: &Record,
        sink: &mut dyn ParameterSink,
        offset: usize,
    ) -> Result<usize> {
        self.jdbc.write_to(record, sink, offset)
    }

    /// Load the large objects `read_from` deferred.
    pub async fn load_deferred<L: LobLoader>(&self, record: &mut Record, loader: &mut L) -> Result<()> {
        self.jdbc.load_deferred(record, loader).await
    }

    /// Encode a record in the wire format.
    pub fn encode(&self, record: &Record) -> Result<Bytes> {
        self.wire.encode(record)
    }

    /// Append a record to a wire buffer.
    pub fn encode_into(&self, record: &Record, buf: &mut WriteBuffer) -> Result<()> {
        self.wire.encode_into(record, buf)
    }

    /// Decode exactly one wire record.
    pub fn decode(&self, data: &[u8]) -> Result<Record> {
        self.wire.decode(self.schema.clone(), data)
    }

    /// Decode the next wire record from a buffer.
    pub fn decode_from(&self, buf: &mut ReadBuffer) -> Result<Record> {
        self.wire.decode_from(self.schema.clone(), buf)
    }

    /// Format a record as one delimited line.
    pub fn format(&self, record: &Record, delimiters: &DelimiterSet) -> Result<String> {
        self.text.format(record, delimiters, &self.null_sentinel)
    }

    /// Parse one delimited line.
    pub fn parse(&self, text: &str, delimiters: &DelimiterSet) -> Result<Record> {
        self.text
            .parse(self.schema.clone(), text, delimiters, &self.null_sentinel)
    }

    /// Format with the compiled output delimiters.
    pub fn format_default(&self, record: &Record) -> Result<String> {
        self.format(record, &self.output_delimiters)
    }

    /// Parse with the compiled input delimiters.
    pub fn parse_default(&self, text: &str) -> Result<Record> {
        self.parse(text, &self.input_delimiters)
    }
}

impl std::fmt::Debug for GeneratedRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedRecordType")
            .field("format_version", &RECORD_FORMAT_VERSION)
            .field("schema", &self.schema)
            .field("input_delimiters", &self.input_delimiters)
            .field("output_delimiters", &self.output_delimiters)
            .field("null_sentinel", &self.null_sentinel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::protocol::constants::*;
    use crate::source::MemoryCatalog;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_record_type_is_shareable() {
        assert_send_sync::<GeneratedRecordType>();
    }

    #[test]
    fn test_options_builder() {
        let options = CompileOptions::query("SELECT * FROM t WHERE $CONDITIONS")
            .with_columns(["a", "b"])
            .with_write_columns(vec!["b".to_string()])
            .with_output_delimiters(DelimiterSet::default().with_field_separator('\t'))
            .with_null_sentinel("\\N");
        assert_eq!(options.target.table_name(), None);
        assert_eq!(options.columns.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(options.output_delimiters.field_separator, '\t');
        assert_eq!(options.input_delimiters, DelimiterSet::default());
        assert_eq!(options.null_sentinel, "\\N");
    }

    #[tokio::test]
    async fn test_compile_releases_every_result() {
        let mut catalog = MemoryCatalog::new().with_table(
            "emp",
            [("id", SQL_TYPE_INTEGER), ("name", SQL_TYPE_VARCHAR)],
        );
        let record_type = RecordCompiler::new(CompileOptions::table("emp"))
            .compile(&mut catalog)
            .await
            .unwrap();
        assert!(!catalog.is_open());
        assert_eq!(catalog.statements().len(), 2);
        assert_eq!(record_type.schema().identifiers(), vec!["id", "name"]);
        assert_eq!(record_type.format_version(), RECORD_FORMAT_VERSION);
    }

    #[tokio::test]
    async fn test_requested_columns_skip_name_probe() {
        let mut catalog = MemoryCatalog::new().with_table(
            "emp",
            [("ID", SQL_TYPE_INTEGER), ("NAME", SQL_TYPE_VARCHAR)],
        );
        let record_type = RecordCompiler::new(CompileOptions::table("emp").with_columns(["name"]))
            .compile(&mut catalog)
            .await
            .unwrap();
        assert_eq!(catalog.statements().len(), 1);
        assert_eq!(record_type.schema().identifiers(), vec!["name"]);
    }

    #[tokio::test]
    async fn test_source_error_still_releases() {
        let mut catalog = MemoryCatalog::new();
        let err = RecordCompiler::new(CompileOptions::table("missing"))
            .compile(&mut catalog)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source { .. }));
        assert!(!catalog.is_open());
    }

    #[test]
    fn test_compile_metadata_defaults() {
        let names = vec!["v".to_string()];
        let types: HashMap<String, i32> = [("v".to_string(), SQL_TYPE_VARCHAR)].into();
        let record_type = RecordCompiler::new(
            CompileOptions::table("t").with_null_sentinel("NULL"),
        )
        .compile_metadata(&names, &types)
        .unwrap();

        let record = record_type.new_record();
        assert_eq!(record_type.format_default(&record).unwrap(), "NULL\n");
        let back = record_type.parse_default("NULL\n").unwrap();
        assert_eq!(back, record);
    }
}
