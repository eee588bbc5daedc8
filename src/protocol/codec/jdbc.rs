//! Database driver codec.
//!
//! Reads records from a driver result row ([`RowSource`]) and binds them as
//! statement parameters ([`ParameterSink`]). Every column gets a read accessor
//! and a write accessor chosen by its canonical type.
//!
//! Large objects are not read eagerly: `read_from` leaves CLOB/BLOB columns
//! null and keeps the row handle, and `load_deferred` asks a
//! [`LobLoader`](super::LobLoader) to materialize them afterwards.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::protocol::types::{
    accessor_name, BlobRef, CanonicalType, ClobRef, Direction, FieldValue, Record, RecordSchema,
    TypeCode,
};

use super::loader::LobLoader;

/// A positioned result row from a database driver.
///
/// Ordinals are 1-based. Every getter returns `Ok(None)` for SQL NULL.
pub trait RowSource: Send + Sync {
    fn get_i32(&self, ordinal: usize) -> Result<Option<i32>>;
    fn get_i64(&self, ordinal: usize) -> Result<Option<i64>>;
    fn get_f32(&self, ordinal: usize) -> Result<Option<f32>>;
    fn get_f64(&self, ordinal: usize) -> Result<Option<f64>>;
    fn get_bool(&self, ordinal: usize) -> Result<Option<bool>>;
    fn get_string(&self, ordinal: usize) -> Result<Option<String>>;
    fn get_decimal(&self, ordinal: usize) -> Result<Option<Decimal>>;
    fn get_date(&self, ordinal: usize) -> Result<Option<NaiveDate>>;
    fn get_time(&self, ordinal: usize) -> Result<Option<NaiveTime>>;
    fn get_timestamp(&self, ordinal: usize) -> Result<Option<NaiveDateTime>>;
    fn get_bytes(&self, ordinal: usize) -> Result<Option<Vec<u8>>>;

    /// Driver-specific textual rendering of a value with no direct mapping.
    fn get_object(&self, ordinal: usize) -> Result<Option<String>>;

    /// Full character payload of a CLOB column.
    fn get_clob_data(&self, ordinal: usize) -> Result<Option<String>>;

    /// Full byte payload of a BLOB column.
    fn get_blob_data(&self, ordinal: usize) -> Result<Option<Vec<u8>>>;
}

/// Statement parameter binder of a database driver.
///
/// Indexes are 1-based.
pub trait ParameterSink {
    /// Bind SQL NULL with the column's declared type.
    fn set_null(&mut self, index: usize, type_code: TypeCode) -> Result<()>;
    fn set_i32(&mut self, index: usize, value: i32) -> Result<()>;
    fn set_i64(&mut self, index: usize, value: i64) -> Result<()>;
    fn set_f32(&mut self, index: usize, value: f32) -> Result<()>;
    fn set_f64(&mut self, index: usize, value: f64) -> Result<()>;
    fn set_bool(&mut self, index: usize, value: bool) -> Result<()>;
    fn set_string(&mut self, index: usize, value: &str) -> Result<()>;
    fn set_decimal(&mut self, index: usize, value: Decimal) -> Result<()>;
    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()>;
    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()>;
    fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> Result<()>;
    fn set_bytes(&mut self, index: usize, value: &[u8]) -> Result<()>;
    fn set_clob(&mut self, index: usize, value: &str) -> Result<()>;
    fn set_blob(&mut self, index: usize, value: &[u8]) -> Result<()>;
    fn set_object(&mut self, index: usize, value: &str) -> Result<()>;
}

type ReadFn = fn(&dyn RowSource, usize) -> Result<FieldValue>;
type WriteFn = fn(&mut dyn ParameterSink, usize, &FieldValue) -> Result<()>;

struct ReadField {
    index: usize,
    ordinal: usize,
    canonical_type: CanonicalType,
    accessor: String,
    read: ReadFn,
}

struct WriteField {
    read_index: usize,
    ordinal: usize,
    identifier: String,
    type_code: TypeCode,
    canonical_type: CanonicalType,
    accessor: String,
    write: WriteFn,
}

/// Driver codec table for one record schema.
pub struct JdbcCodec {
    schema: Arc<RecordSchema>,
    reads: Vec<ReadField>,
    writes: Vec<WriteField>,
}

impl JdbcCodec {
    /// Build read accessors for the read path and write accessors for the
    /// write path.
    pub fn compile(schema: Arc<RecordSchema>) -> Self {
        let reads: Vec<ReadField> = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(index, col)| ReadField {
                index,
                ordinal: col.ordinal,
                canonical_type: col.canonical_type,
                accessor: accessor_name(Direction::Read, col.canonical_type),
                read: reader_for(col.canonical_type),
            })
            .collect();

        let writes: Vec<WriteField> = schema
            .write_columns()
            .iter()
            .filter_map(|wc| {
                let col = schema.get(wc.read_index)?;
                Some(WriteField {
                    read_index: wc.read_index,
                    ordinal: wc.ordinal,
                    identifier: col.identifier.clone(),
                    type_code: col.type_code,
                    canonical_type: col.canonical_type,
                    accessor: accessor_name(Direction::Write, col.canonical_type),
                    write: writer_for(col.canonical_type),
                })
            })
            .collect();

        debug!(
            "Compiled driver accessors for {}: read [{}], write [{}]",
            schema.label(),
            reads.iter().map(|r| r.accessor.as_str()).collect::<Vec<_>>().join(", "),
            writes.iter().map(|w| w.accessor.as_str()).collect::<Vec<_>>().join(", ")
        );

        Self {
            schema,
            reads,
            writes,
        }
    }

    /// Read accessor names in read-path order.
    pub fn read_accessors(&self) -> Vec<&str> {
        self.reads.iter().map(|r| r.accessor.as_str()).collect()
    }

    /// Write accessor names in write-path order.
    pub fn write_accessors(&self) -> Vec<&str> {
        self.writes.iter().map(|w| w.accessor.as_str()).collect()
    }

    /// Read one record from the current row of `cursor`.
    ///
    /// LOB columns stay null until [`load_deferred`](Self::load_deferred).
    pub fn read_from(&self, cursor: Arc<dyn RowSource>) -> Result<Record> {
        let mut record = Record::new(self.schema.clone());
        for (field, slot) in self.reads.iter().zip(record.values_mut().iter_mut()) {
            *slot = (field.read)(cursor.as_ref(), field.ordinal)?;
        }
        Ok(record.with_cursor(cursor))
    }

    /// Bind the write-path columns of `record` starting after `offset`.
    ///
    /// Returns the number of parameters bound.
    pub fn write_to(
        &self,
        record: &Record,
        sink: &mut dyn ParameterSink,
        offset: usize,
    ) -> Result<usize> {
        for field in &self.writes {
            let index = field.ordinal + offset;
            let value = record.get(field.read_index).ok_or_else(|| Error::FieldCount {
                expected: self.schema.len(),
                actual: record.len(),
            })?;
            if value.is_null() {
                sink.set_null(index, field.type_code)?;
                continue;
            }
            if !value.fits(field.canonical_type) {
                return Err(Error::TypeMismatch {
                    column: field.identifier.clone(),
                    expected: field.canonical_type.simple_name(),
                    actual: value.kind_name(),
                });
            }
            if matches!(
                value,
                FieldValue::Clob(ClobRef::External(_)) | FieldValue::Blob(BlobRef::External(_))
            ) {
                return Err(Error::ExternalLobWrite {
                    column: field.identifier.clone(),
                });
            }
            (field.write)(sink, index, value)?;
        }
        Ok(self.writes.len())
    }

    /// Materialize the LOB columns of a record read by [`read_from`](Self::read_from).
    pub async fn load_deferred<L: LobLoader>(&self, record: &mut Record, loader: &mut L) -> Result<()> {
        self.check_schema(record)?;
        let cursor = record.cursor().cloned().ok_or(Error::MissingCursor)?;
        for field in self.reads.iter().filter(|f| f.canonical_type.is_lob()) {
            let value = match field.canonical_type {
                CanonicalType::ClobRef => loader
                    .read_clob(field.ordinal, cursor.as_ref())
                    .await?
                    .map_or(FieldValue::Null, FieldValue::Clob),
                _ => loader
                    .read_blob(field.ordinal, cursor.as_ref())
                    .await?
                    .map_or(FieldValue::Null, FieldValue::Blob),
            };
            record.set(field.index, value)?;
        }
        Ok(())
    }

    /// Check that `record` was built for this table's schema.
    fn check_schema(&self, record: &Record) -> Result<()> {
        if record.len() != self.reads.len() {
            return Err(Error::FieldCount {
                expected: self.reads.len(),
                actual: record.len(),
            });
        }
        if record.schema().columns() != self.schema.columns() {
            return Err(Error::protocol(format!(
                "Record was not built for the {} record type",
                self.schema.label()
            )));
        }
        Ok(())
    }
}

fn reader_for(canonical: CanonicalType) -> ReadFn {
    match canonical {
        CanonicalType::Integer => read_integer,
        CanonicalType::Long => read_long,
        CanonicalType::Float => read_float,
        CanonicalType::Double => read_double,
        CanonicalType::Boolean => read_boolean,
        CanonicalType::Text => read_text,
        CanonicalType::Decimal => read_decimal,
        CanonicalType::Date => read_date,
        CanonicalType::Time => read_time,
        CanonicalType::Timestamp => read_timestamp,
        CanonicalType::ByteSequence => read_byte_sequence,
        CanonicalType::ClobRef | CanonicalType::BlobRef => read_deferred,
        CanonicalType::Opaque => read_opaque,
    }
}

fn writer_for(canonical: CanonicalType) -> WriteFn {
    match canonical {
        CanonicalType::Integer => write_integer,
        CanonicalType::Long => write_long,
        CanonicalType::Float => write_float,
        CanonicalType::Double => write_double,
        CanonicalType::Boolean => write_boolean,
        CanonicalType::Text => write_text,
        CanonicalType::Decimal => write_decimal,
        CanonicalType::Date => write_date,
        CanonicalType::Time => write_time,
        CanonicalType::Timestamp => write_timestamp,
        CanonicalType::ByteSequence => write_byte_sequence,
        CanonicalType::ClobRef => write_clob,
        CanonicalType::BlobRef => write_blob,
        CanonicalType::Opaque => write_opaque,
    }
}

fn read_integer(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_i32(ordinal)?.map_or(FieldValue::Null, FieldValue::Integer))
}

fn read_long(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_i64(ordinal)?.map_or(FieldValue::Null, FieldValue::Long))
}

fn read_float(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_f32(ordinal)?.map_or(FieldValue::Null, FieldValue::Float))
}

fn read_double(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_f64(ordinal)?.map_or(FieldValue::Null, FieldValue::Double))
}

fn read_boolean(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_bool(ordinal)?.map_or(FieldValue::Null, FieldValue::Boolean))
}

fn read_text(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_string(ordinal)?.map_or(FieldValue::Null, FieldValue::Text))
}

fn read_decimal(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_decimal(ordinal)?.map_or(FieldValue::Null, FieldValue::Decimal))
}

fn read_date(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_date(ordinal)?.map_or(FieldValue::Null, FieldValue::Date))
}

fn read_time(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_time(ordinal)?.map_or(FieldValue::Null, FieldValue::Time))
}

fn read_timestamp(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_timestamp(ordinal)?.map_or(FieldValue::Null, FieldValue::Timestamp))
}

fn read_byte_sequence(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_bytes(ordinal)?.map_or(FieldValue::Null, FieldValue::Bytes))
}

fn read_opaque(row: &dyn RowSource, ordinal: usize) -> Result<FieldValue> {
    Ok(row.get_object(ordinal)?.map_or(FieldValue::Null, FieldValue::Opaque))
}

fn read_deferred(_row: &dyn RowSource, _ordinal: usize) -> Result<FieldValue> {
    Ok(FieldValue::Null)
}

fn unexpected(value: &FieldValue, expected: &'static str) -> Error {
    Error::protocol(format!(
        "Write accessor for {} received a {} value",
        expected,
        value.kind_name()
    ))
}

fn write_integer(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Integer(v) => sink.set_i32(index, *v),
        other => Err(unexpected(other, "integer")),
    }
}

fn write_long(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Long(v) => sink.set_i64(index, *v),
        other => Err(unexpected(other, "long")),
    }
}

fn write_float(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Float(v) => sink.set_f32(index, *v),
        other => Err(unexpected(other, "float")),
    }
}

fn write_double(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Double(v) => sink.set_f64(index, *v),
        other => Err(unexpected(other, "double")),
    }
}

fn write_boolean(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Boolean(v) => sink.set_bool(index, *v),
        other => Err(unexpected(other, "boolean")),
    }
}

fn write_text(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Text(v) => sink.set_string(index, v),
        other => Err(unexpected(other, "text")),
    }
}

fn write_decimal(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Decimal(v) => sink.set_decimal(index, *v),
        other => Err(unexpected(other, "decimal")),
    }
}

fn write_date(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Date(v) => sink.set_date(index, *v),
        other => Err(unexpected(other, "date")),
    }
}

fn write_time(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Time(v) => sink.set_time(index, *v),
        other => Err(unexpected(other, "time")),
    }
}

fn write_timestamp(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Timestamp(v) => sink.set_timestamp(index, *v),
        other => Err(unexpected(other, "timestamp")),
    }
}

fn write_byte_sequence(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Bytes(v) => sink.set_bytes(index, v),
        other => Err(unexpected(other, "byteSequence")),
    }
}

fn write_clob(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Clob(ClobRef::Inline(v)) => sink.set_clob(index, v),
        other => Err(unexpected(other, "clobRef")),
    }
}

fn write_blob(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Blob(BlobRef::Inline(v)) => sink.set_blob(index, v),
        other => Err(unexpected(other, "blobRef")),
    }
}

fn write_opaque(sink: &mut dyn ParameterSink, index: usize, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Opaque(v) => sink.set_object(index, v),
        other => Err(unexpected(other, "opaque")),
    }
}
