//! Compact binary wire codec.
//!
//! Layout of one record:
//!
//! ```text
//! +----------------+--------+---------+--------+---------+-----
//! | version (u32)  | null_0 | value_0 | null_1 | value_1 | ...
//! +----------------+--------+---------+--------+---------+-----
//! ```
//!
//! Each field starts with a null flag byte (1 = null, no payload follows).
//! Payloads:
//!
//! | Canonical type | Payload |
//! |----------------|---------|
//! | Integer | i32 |
//! | Long | i64 |
//! | Float / Double | IEEE 754 bits |
//! | Boolean | one byte |
//! | Text / Opaque | u32 length + UTF-8 |
//! | Decimal | i32 scale, flag, then i64 unscaled or its decimal string |
//! | Date | i64 epoch millis at UTC midnight |
//! | Time / Timestamp | i64 epoch millis + i32 nanos-of-second |
//! | ByteSequence | u32 length + bytes |
//! | ClobRef / BlobRef | flag (1 = external), then file + offset + length, or the inline payload |

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::protocol::buffer::{ReadBuffer, WriteBuffer};
use crate::protocol::constants::{
    RECORD_FORMAT_VERSION, WIRE_DECIMAL_COMPACT, WIRE_DECIMAL_STRING, WIRE_FIELD_NULL,
    WIRE_FIELD_PRESENT, WIRE_LOB_EXTERNAL, WIRE_LOB_INLINE,
};
use crate::protocol::types::{
    BlobRef, CanonicalType, ClobRef, ExternalLob, FieldValue, Record, RecordSchema,
};

type DecodeFn = fn(&mut ReadBuffer) -> Result<FieldValue>;

struct WireField {
    identifier: String,
    canonical_type: CanonicalType,
    decode: DecodeFn,
}

/// Wire codec table for one record schema.
pub struct WireCodec {
    fields: Vec<WireField>,
}

impl WireCodec {
    /// Build the decode table for every read-path column.
    pub fn compile(schema: &RecordSchema) -> Self {
        let fields = schema
            .columns()
            .iter()
            .map(|col| WireField {
                identifier: col.identifier.clone(),
                canonical_type: col.canonical_type,
                decode: decoder_for(col.canonical_type),
            })
            .collect();
        Self { fields }
    }

    /// Encode one record into a fresh buffer.
    pub fn encode(&self, record: &Record) -> Result<Bytes> {
        let mut buf = WriteBuffer::new();
        self.encode_into(record, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Append one record to `buf`.
    pub fn encode_into(&self, record: &Record, buf: &mut WriteBuffer) -> Result<()> {
        if record.len() != self.fields.len() {
            return Err(Error::FieldCount {
                expected: self.fields.len(),
                actual: record.len(),
            });
        }

        buf.write_u32_be(RECORD_FORMAT_VERSION);
        for (field, value) in self.fields.iter().zip(record.iter()) {
            if value.is_null() {
                buf.write_u8(WIRE_FIELD_NULL);
                continue;
            }
            if !value.fits(field.canonical_type) {
                return Err(Error::TypeMismatch {
                    column: field.identifier.clone(),
                    expected: field.canonical_type.simple_name(),
                    actual: value.kind_name(),
                });
            }
            buf.write_u8(WIRE_FIELD_PRESENT);
            encode_value(value, buf)?;
        }
        Ok(())
    }

    /// Decode exactly one record from `data`.
    pub fn decode(&self, schema: Arc<RecordSchema>, data: &[u8]) -> Result<Record> {
        let mut buf = ReadBuffer::new(Bytes::copy_from_slice(data));
        let record = self.decode_from(schema, &mut buf)?;
        if buf.has_remaining(1) {
            return Err(Error::TrailingBytes {
                remaining: buf.remaining(),
            });
        }
        Ok(record)
    }

    /// Decode the next record from `buf`, leaving any following records.
    pub fn decode_from(&self, schema: Arc<RecordSchema>, buf: &mut ReadBuffer) -> Result<Record> {
        let version = buf.read_u32_be()?;
        if version != RECORD_FORMAT_VERSION {
            return Err(Error::FormatVersionMismatch {
                expected: RECORD_FORMAT_VERSION,
                actual: version,
            });
        }

        let mut record = Record::new(schema);
        for (field, slot) in self.fields.iter().zip(record.values_mut().iter_mut()) {
            match buf.read_u8()? {
                WIRE_FIELD_NULL => {}
                WIRE_FIELD_PRESENT => *slot = (field.decode)(buf)?,
                flag => {
                    return Err(Error::protocol(format!(
                        "Invalid null flag {} for column {}",
                        flag, field.identifier
                    )))
                }
            }
        }
        Ok(record)
    }
}

fn encode_value(value: &FieldValue, buf: &mut WriteBuffer) -> Result<()> {
    match value {
        FieldValue::Null => {}
        FieldValue::Integer(v) => buf.write_i32_be(*v),
        FieldValue::Long(v) => buf.write_i64_be(*v),
        FieldValue::Float(v) => buf.write_f32_be(*v),
        FieldValue::Double(v) => buf.write_f64_be(*v),
        FieldValue::Boolean(v) => buf.write_bool(*v),
        FieldValue::Text(s) | FieldValue::Opaque(s) => buf.write_str_with_length(s)?,
        FieldValue::Decimal(d) => encode_decimal(d, buf)?,
        FieldValue::Date(d) => buf.write_i64_be(date_to_millis(*d)),
        FieldValue::Time(t) => {
            let (millis, nanos) = time_to_wire(*t);
            buf.write_i64_be(millis);
            buf.write_i32_be(nanos);
        }
        FieldValue::Timestamp(ts) => {
            let (millis, nanos) = timestamp_to_wire(*ts);
            buf.write_i64_be(millis);
            buf.write_i32_be(nanos);
        }
        FieldValue::Bytes(b) => buf.write_bytes_with_length(b)?,
        FieldValue::Clob(ClobRef::Inline(s)) => {
            buf.write_u8(WIRE_LOB_INLINE);
            buf.write_str_with_length(s)?;
        }
        FieldValue::Blob(BlobRef::Inline(b)) => {
            buf.write_u8(WIRE_LOB_INLINE);
            buf.write_bytes_with_length(b)?;
        }
        FieldValue::Clob(ClobRef::External(lob)) | FieldValue::Blob(BlobRef::External(lob)) => {
            buf.write_u8(WIRE_LOB_EXTERNAL);
            encode_external(lob, buf)?;
        }
    }
    Ok(())
}

fn decoder_for(canonical: CanonicalType) -> DecodeFn {
    match canonical {
        CanonicalType::Integer => decode_integer,
        CanonicalType::Long => decode_long,
        CanonicalType::Float => decode_float,
        CanonicalType::Double => decode_double,
        CanonicalType::Boolean => decode_boolean,
        CanonicalType::Text => decode_text,
        CanonicalType::Decimal => decode_decimal,
        CanonicalType::Date => decode_date,
        CanonicalType::Time => decode_time,
        CanonicalType::Timestamp => decode_timestamp,
        CanonicalType::ByteSequence => decode_byte_sequence,
        CanonicalType::ClobRef => decode_clob,
        CanonicalType::BlobRef => decode_blob,
        CanonicalType::Opaque => decode_opaque,
    }
}

fn decode_integer(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Integer(buf.read_i32_be()?))
}

fn decode_long(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Long(buf.read_i64_be()?))
}

fn decode_float(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Float(buf.read_f32_be()?))
}

fn decode_double(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Double(buf.read_f64_be()?))
}

fn decode_boolean(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Boolean(buf.read_bool()?))
}

fn decode_text(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Text(buf.read_str_with_length()?))
}

fn decode_opaque(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Opaque(buf.read_str_with_length()?))
}

fn decode_byte_sequence(buf: &mut ReadBuffer) -> Result<FieldValue> {
    Ok(FieldValue::Bytes(buf.read_bytes_with_length()?.to_vec()))
}

fn encode_decimal(d: &Decimal, buf: &mut WriteBuffer) -> Result<()> {
    buf.write_i32_be(d.scale() as i32);
    let unscaled = d.mantissa();
    match i64::try_from(unscaled) {
        Ok(compact) => {
            buf.write_u8(WIRE_DECIMAL_COMPACT);
            buf.write_i64_be(compact);
        }
        Err(_) => {
            buf.write_u8(WIRE_DECIMAL_STRING);
            buf.write_str_with_length(&unscaled.to_string())?;
        }
    }
    Ok(())
}

fn decode_decimal(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let scale = buf.read_i32_be()?;
    let unscaled: i128 = match buf.read_u8()? {
        WIRE_DECIMAL_COMPACT => buf.read_i64_be()? as i128,
        WIRE_DECIMAL_STRING => {
            let digits = buf.read_str_with_length()?;
            digits
                .parse()
                .map_err(|e| Error::protocol(format!("Invalid unscaled decimal '{}': {}", digits, e)))?
        }
        flag => return Err(Error::protocol(format!("Invalid decimal flag {}", flag))),
    };
    let scale = u32::try_from(scale)
        .map_err(|_| Error::protocol(format!("Negative decimal scale {}", scale)))?;
    Decimal::try_from_i128_with_scale(unscaled, scale)
        .map(FieldValue::Decimal)
        .map_err(|e| Error::protocol(format!("Decimal out of range: {}", e)))
}

fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn decode_date(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let millis = buf.read_i64_be()?;
    DateTime::from_timestamp_millis(millis)
        .map(|dt| FieldValue::Date(dt.date_naive()))
        .ok_or_else(|| Error::protocol(format!("DATE millis out of range: {}", millis)))
}

/// Millis are whole seconds plus the sub-second millis; nanos carry the full
/// fraction (including chrono's leap-second overflow).
fn time_to_wire(time: NaiveTime) -> (i64, i32) {
    let nanos = time.nanosecond();
    let millis =
        time.num_seconds_from_midnight() as i64 * 1000 + (nanos % 1_000_000_000 / 1_000_000) as i64;
    (millis, nanos as i32)
}

fn decode_time(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let millis = buf.read_i64_be()?;
    let nanos = read_nanos(buf)?;
    u32::try_from(millis.div_euclid(1000))
        .ok()
        .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .map(FieldValue::Time)
        .ok_or_else(|| Error::protocol(format!("Invalid TIME: millis={}, nanos={}", millis, nanos)))
}

fn timestamp_to_wire(ts: NaiveDateTime) -> (i64, i32) {
    let nanos = ts.nanosecond();
    let millis = ts.and_utc().timestamp() * 1000 + (nanos % 1_000_000_000 / 1_000_000) as i64;
    (millis, nanos as i32)
}

fn decode_timestamp(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let millis = buf.read_i64_be()?;
    let nanos = read_nanos(buf)?;
    DateTime::from_timestamp(millis.div_euclid(1000), nanos)
        .map(|dt| FieldValue::Timestamp(dt.naive_utc()))
        .ok_or_else(|| {
            Error::protocol(format!(
                "Invalid TIMESTAMP: millis={}, nanos={}",
                millis, nanos
            ))
        })
}

fn read_nanos(buf: &mut ReadBuffer) -> Result<u32> {
    let nanos = buf.read_i32_be()?;
    u32::try_from(nanos).map_err(|_| Error::protocol(format!("Negative nanos {}", nanos)))
}

fn encode_external(lob: &ExternalLob, buf: &mut WriteBuffer) -> Result<()> {
    let (offset, length) = match (i64::try_from(lob.offset), i64::try_from(lob.length)) {
        (Ok(offset), Ok(length)) => (offset, length),
        _ => {
            return Err(Error::protocol(format!(
                "External LOB range exceeds the wire format: offset={}, length={}",
                lob.offset, lob.length
            )))
        }
    };
    buf.write_str_with_length(&lob.file)?;
    buf.write_i64_be(offset);
    buf.write_i64_be(length);
    Ok(())
}

fn decode_external(buf: &mut ReadBuffer) -> Result<ExternalLob> {
    let file = buf.read_str_with_length()?;
    let offset = buf.read_i64_be()?;
    let length = buf.read_i64_be()?;
    match (u64::try_from(offset), u64::try_from(length)) {
        (Ok(offset), Ok(length)) => Ok(ExternalLob::new(file, offset, length)),
        _ => Err(Error::protocol(format!(
            "Invalid external LOB range: offset={}, length={}",
            offset, length
        ))),
    }
}

fn decode_clob(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let clob = match buf.read_u8()? {
        WIRE_LOB_INLINE => ClobRef::Inline(buf.read_str_with_length()?),
        WIRE_LOB_EXTERNAL => ClobRef::External(decode_external(buf)?),
        flag => return Err(Error::protocol(format!("Invalid CLOB flag {}", flag))),
    };
    Ok(FieldValue::Clob(clob))
}

fn decode_blob(buf: &mut ReadBuffer) -> Result<FieldValue> {
    let blob = match buf.read_u8()? {
        WIRE_LOB_INLINE => BlobRef::Inline(buf.read_bytes_with_length()?.to_vec()),
        WIRE_LOB_EXTERNAL => BlobRef::External(decode_external(buf)?),
        flag => return Err(Error::protocol(format!("Invalid BLOB flag {}", flag))),
    };
    Ok(FieldValue::Blob(blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::*;
    use std::collections::HashMap;

    fn schema(cols: &[(&str, i32)]) -> Arc<RecordSchema> {
        let names: Vec<String> = cols.iter().map(|(n, _)| n.to_string()).collect();
        let types: HashMap<String, i32> =
            cols.iter().map(|(n, t)| (n.to_string(), *t)).collect();
        Arc::new(RecordSchema::build(Some("t"), &names, &types, None, None).unwrap())
    }

    #[test]
    fn test_layout() {
        let s = schema(&[("id", SQL_TYPE_INTEGER), ("name", SQL_TYPE_VARCHAR)]);
        let codec = WireCodec::compile(&s);
        let record =
            Record::from_values(s, vec![FieldValue::Integer(7), FieldValue::Null]).unwrap();
        let bytes = codec.encode(&record).unwrap();
        assert_eq!(&bytes[..], &[0, 0, 0, 3, 0, 0, 0, 0, 7, 1]);
    }

    #[test]
    fn test_round_trip_every_type() {
        let s = schema(&[
            ("i", SQL_TYPE_INTEGER),
            ("l", SQL_TYPE_BIGINT),
            ("f", SQL_TYPE_REAL),
            ("d", SQL_TYPE_FLOAT),
            ("b", SQL_TYPE_BOOLEAN),
            ("t", SQL_TYPE_NVARCHAR),
            ("small", SQL_TYPE_DECIMAL),
            ("big", SQL_TYPE_NUMERIC),
            ("dt", SQL_TYPE_DATE),
            ("tm", SQL_TYPE_TIME),
            ("ts", SQL_TYPE_TIMESTAMP),
            ("old", SQL_TYPE_TIMESTAMP),
            ("bin", SQL_TYPE_BINARY),
            ("c", SQL_TYPE_CLOB),
            ("bl", SQL_TYPE_BLOB),
            ("ext", SQL_TYPE_NCLOB),
            ("arr", SQL_TYPE_ARRAY),
        ]);
        let codec = WireCodec::compile(&s);
        let date = NaiveDate::from_ymd_opt(2009, 5, 14).unwrap();
        let record = Record::from_values(
            s.clone(),
            vec![
                FieldValue::Integer(i32::MIN),
                FieldValue::Long(-1),
                FieldValue::Float(3.25),
                FieldValue::Double(f64::MAX),
                FieldValue::Boolean(false),
                FieldValue::Text("héllo".into()),
                FieldValue::Decimal(Decimal::new(-314, 2)),
                FieldValue::Decimal(Decimal::from_i128_with_scale(i64::MAX as i128 * 1000, 4)),
                FieldValue::Date(date),
                FieldValue::Time(NaiveTime::from_hms_nano_opt(13, 14, 15, 123_456_789).unwrap()),
                FieldValue::Timestamp(date.and_hms_nano_opt(1, 2, 3, 999_999_999).unwrap()),
                FieldValue::Timestamp(
                    NaiveDate::from_ymd_opt(1901, 12, 13)
                        .unwrap()
                        .and_hms_milli_opt(20, 45, 52, 1)
                        .unwrap(),
                ),
                FieldValue::Bytes(vec![]),
                FieldValue::Clob(ClobRef::Inline("clob".into())),
                FieldValue::Blob(BlobRef::Inline(vec![9; 40])),
                FieldValue::Clob(ClobRef::External(ExternalLob::new("/tmp/large_obj_0.clob", 0, 1 << 30))),
                FieldValue::Opaque("{1,2,3}".into()),
            ],
        )
        .unwrap();

        let bytes = codec.encode(&record).unwrap();
        let back = codec.decode(s, &bytes).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_version_mismatch() {
        let s = schema(&[("id", SQL_TYPE_INTEGER)]);
        let codec = WireCodec::compile(&s);
        let err = codec.decode(s, &[0, 0, 0, 2, 1]).unwrap_err();
        assert!(matches!(
            err,
            Error::FormatVersionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let s = schema(&[("id", SQL_TYPE_INTEGER)]);
        let codec = WireCodec::compile(&s);
        let err = codec.decode(s.clone(), &[0, 0, 0, 3, 0, 0, 1]).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { needed: 4, available: 2, .. }));
        match err {
            Error::BufferTooSmall { location, .. } => assert_eq!(location.file(), file!()),
            other => panic!("Expected BufferTooSmall error, got {:?}", other),
        }

        let err = codec.decode(s, &[0, 0, 0, 3, 1, 0xaa]).unwrap_err();
        assert!(matches!(err, Error::TrailingBytes { remaining: 1 }));
    }

    #[test]
    fn test_external_lob_range_limits() {
        let s = schema(&[("doc", SQL_TYPE_CLOB)]);
        let codec = WireCodec::compile(&s);

        let widest = ExternalLob::new("large_obj_0.clob", i64::MAX as u64, i64::MAX as u64);
        let record = Record::from_values(
            s.clone(),
            vec![FieldValue::Clob(ClobRef::External(widest))],
        )
        .unwrap();
        let bytes = codec.encode(&record).unwrap();
        assert_eq!(codec.decode(s.clone(), &bytes).unwrap(), record);

        let too_wide = ExternalLob::new("large_obj_1.clob", 0, i64::MAX as u64 + 1);
        let record =
            Record::from_values(s, vec![FieldValue::Clob(ClobRef::External(too_wide))]).unwrap();
        assert!(matches!(codec.encode(&record), Err(Error::Protocol { .. })));
    }

    #[test]
    fn test_several_records_per_buffer() {
        let s = schema(&[("id", SQL_TYPE_BIGINT)]);
        let codec = WireCodec::compile(&s);
        let mut buf = WriteBuffer::new();
        for i in 0..3 {
            let record = Record::from_values(s.clone(), vec![FieldValue::Long(i)]).unwrap();
            codec.encode_into(&record, &mut buf).unwrap();
        }

        let mut read = ReadBuffer::new(buf.freeze());
        for i in 0..3 {
            let record = codec.decode_from(s.clone(), &mut read).unwrap();
            assert_eq!(record.get(0), Some(&FieldValue::Long(i)));
        }
        assert_eq!(read.remaining(), 0);
    }

    #[test]
    fn test_encode_rejects_wrong_value_type() {
        let s = schema(&[("id", SQL_TYPE_INTEGER)]);
        let codec = WireCodec::compile(&s);
        let mut record = Record::new(s);
        record.values_mut()[0] = FieldValue::Text("1".into());
        assert!(matches!(
            codec.encode(&record),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
