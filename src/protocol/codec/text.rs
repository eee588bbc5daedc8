//! Delimited text codec.
//!
//! Formats a record as one line of delimited text and parses it back. Every
//! non-text column goes through a fixed textual grammar (see
//! [`crate::protocol::decode`]); byte columns are base64.
//!
//! Output escaping:
//! - With an escape character, the escape character itself is doubled.
//! - Without an enclosure character, separators and terminators are escaped.
//! - With an enclosure character, the enclosure is escaped and the field is
//!   enclosed when required or when it contains a separator or terminator.
//!
//! A null field is written as the bare null sentinel. A value whose text
//! happens to equal the sentinel is enclosed (or escaped) so the parser reads
//! it back as a literal.

use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::protocol::decode::{
    format_boolean, format_date, format_time, format_timestamp, parse_boolean, parse_date,
    parse_time, parse_timestamp,
};
use crate::protocol::types::{
    BlobRef, CanonicalType, ClobRef, ExternalLob, FieldValue, Record, RecordSchema,
};

use super::delimiters::DelimiterSet;
use super::parser::tokenize;

type ParseFn = fn(&str) -> std::result::Result<FieldValue, String>;

struct TextField {
    identifier: String,
    canonical_type: CanonicalType,
    parse: ParseFn,
}

/// Text codec table for one record schema.
pub struct TextCodec {
    fields: Vec<TextField>,
}

impl TextCodec {
    /// Build the parse table for every read-path column.
    pub fn compile(schema: &RecordSchema) -> Self {
        let fields = schema
            .columns()
            .iter()
            .map(|col| TextField {
                identifier: col.identifier.clone(),
                canonical_type: col.canonical_type,
                parse: parser_for(col.canonical_type),
            })
            .collect();
        Self { fields }
    }

    /// Format a record, including the line terminator.
    pub fn format(
        &self,
        record: &Record,
        delimiters: &DelimiterSet,
        null_sentinel: &str,
    ) -> Result<String> {
        if record.len() != self.fields.len() {
            return Err(Error::FieldCount {
                expected: self.fields.len(),
                actual: record.len(),
            });
        }

        let mut out = String::new();
        for (i, (field, value)) in self.fields.iter().zip(record.iter()).enumerate() {
            if i > 0 {
                out.push(delimiters.field_separator);
            }
            if value.is_null() {
                out.push_str(null_sentinel);
                continue;
            }
            if !value.fits(field.canonical_type) {
                return Err(Error::TypeMismatch {
                    column: field.identifier.clone(),
                    expected: field.canonical_type.simple_name(),
                    actual: value.kind_name(),
                });
            }
            let text = render(value);
            let (escaped, enclosed) = escape_and_enclose(&text, delimiters, &field.identifier)?;
            if !enclosed && escaped == null_sentinel {
                out.push_str(&quote_sentinel(
                    escaped,
                    delimiters,
                    &field.identifier,
                    null_sentinel,
                )?);
            } else {
                out.push_str(&escaped);
            }
        }
        out.push(delimiters.line_terminator);
        Ok(out)
    }

    /// Parse one line of delimited text into a record.
    pub fn parse(
        &self,
        schema: Arc<RecordSchema>,
        text: &str,
        delimiters: &DelimiterSet,
        null_sentinel: &str,
    ) -> Result<Record> {
        let tokens = tokenize(text, delimiters)?;
        if tokens.len() != self.fields.len() {
            return Err(Error::FieldCount {
                expected: self.fields.len(),
                actual: tokens.len(),
            });
        }

        let mut record = Record::new(schema);
        for ((field, token), slot) in self
            .fields
            .iter()
            .zip(&tokens)
            .zip(record.values_mut().iter_mut())
        {
            if token.is_null(null_sentinel) {
                continue;
            }
            *slot = (field.parse)(&token.value)
                .map_err(|message| Error::parse(field.identifier.as_str(), message))?;
        }
        Ok(record)
    }
}

/// Canonical text of a non-null value.
fn render(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Integer(v) => v.to_string(),
        FieldValue::Long(v) => v.to_string(),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Double(v) => v.to_string(),
        FieldValue::Boolean(v) => format_boolean(*v).to_string(),
        FieldValue::Text(s) | FieldValue::Opaque(s) => s.clone(),
        FieldValue::Decimal(d) => d.to_string(),
        FieldValue::Date(d) => format_date(*d),
        FieldValue::Time(t) => format_time(*t),
        FieldValue::Timestamp(ts) => format_timestamp(*ts),
        FieldValue::Bytes(b) => STANDARD.encode(b),
        FieldValue::Clob(ClobRef::Inline(s)) => s.clone(),
        FieldValue::Blob(BlobRef::Inline(b)) => STANDARD.encode(b),
        FieldValue::Clob(ClobRef::External(lob)) | FieldValue::Blob(BlobRef::External(lob)) => {
            lob.to_string()
        }
    }
}

fn parser_for(canonical: CanonicalType) -> ParseFn {
    match canonical {
        CanonicalType::Integer => parse_integer,
        CanonicalType::Long => parse_long,
        CanonicalType::Float => parse_float,
        CanonicalType::Double => parse_double,
        CanonicalType::Boolean => parse_bool,
        CanonicalType::Text => parse_text,
        CanonicalType::Decimal => parse_decimal,
        CanonicalType::Date => parse_date_value,
        CanonicalType::Time => parse_time_value,
        CanonicalType::Timestamp => parse_timestamp_value,
        CanonicalType::ByteSequence => parse_byte_sequence,
        CanonicalType::ClobRef => parse_clob,
        CanonicalType::BlobRef => parse_blob,
        CanonicalType::Opaque => parse_opaque,
    }
}

fn parse_bool(s: &str) -> std::result::Result<FieldValue, String> {
    Ok(FieldValue::Boolean(parse_boolean(s)))
}

fn parse_text(s: &str) -> std::result::Result<FieldValue, String> {
    Ok(FieldValue::Text(s.to_string()))
}

fn parse_opaque(s: &str) -> std::result::Result<FieldValue, String> {
    Ok(FieldValue::Opaque(s.to_string()))
}

fn parse_date_value(s: &str) -> std::result::Result<FieldValue, String> {
    parse_date(s).map(FieldValue::Date).map_err(|e| e.to_string())
}

fn parse_time_value(s: &str) -> std::result::Result<FieldValue, String> {
    parse_time(s).map(FieldValue::Time).map_err(|e| e.to_string())
}

fn parse_timestamp_value(s: &str) -> std::result::Result<FieldValue, String> {
    parse_timestamp(s)
        .map(FieldValue::Timestamp)
        .map_err(|e| e.to_string())
}

fn parse_byte_sequence(s: &str) -> std::result::Result<FieldValue, String> {
    decode_base64(s).map(FieldValue::Bytes)
}

fn parse_clob(s: &str) -> std::result::Result<FieldValue, String> {
    let clob = match ExternalLob::parse(s) {
        Some(lob) => ClobRef::External(lob),
        None => ClobRef::Inline(s.to_string()),
    };
    Ok(FieldValue::Clob(clob))
}

fn parse_blob(s: &str) -> std::result::Result<FieldValue, String> {
    let blob = match ExternalLob::parse(s) {
        Some(lob) => BlobRef::External(lob),
        None => BlobRef::Inline(decode_base64(s)?),
    };
    Ok(FieldValue::Blob(blob))
}

fn parse_integer(s: &str) -> std::result::Result<FieldValue, String> {
    s.parse().map(FieldValue::Integer).map_err(|e| format!("'{}': {}", s, e))
}

fn parse_long(s: &str) -> std::result::Result<FieldValue, String> {
    s.parse().map(FieldValue::Long).map_err(|e| format!("'{}': {}", s, e))
}

fn parse_float(s: &str) -> std::result::Result<FieldValue, String> {
    s.parse().map(FieldValue::Float).map_err(|e| format!("'{}': {}", s, e))
}

fn parse_double(s: &str) -> std::result::Result<FieldValue, String> {
    s.parse().map(FieldValue::Double).map_err(|e| format!("'{}': {}", s, e))
}

fn parse_decimal(s: &str) -> std::result::Result<FieldValue, String> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map(FieldValue::Decimal)
        .map_err(|e| format!("'{}': {}", s, e))
}

fn decode_base64(s: &str) -> std::result::Result<Vec<u8>, String> {
    STANDARD
        .decode(s)
        .map_err(|e| format!("invalid base64: {}", e))
}

/// Apply escaping and enclosure. Returns the text and whether it was enclosed.
fn escape_and_enclose(
    text: &str,
    delimiters: &DelimiterSet,
    column: &str,
) -> Result<(String, bool)> {
    let escape = delimiters.escaped_by;
    let enclose = delimiters.enclosed_by;

    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if Some(c) == escape {
            out.push(c);
            out.push(c);
        } else if Some(c) == enclose {
            if let Some(e) = escape {
                out.push(e);
            }
            out.push(c);
        } else if enclose.is_none() && delimiters.is_delimiter(c) {
            let e = escape.ok_or_else(|| Error::UnescapableValue {
                column: column.to_string(),
            })?;
            out.push(e);
            out.push(c);
        } else {
            out.push(c);
        }
    }

    let Some(q) = enclose else {
        return Ok((out, false));
    };

    let has_delimiter = text.chars().any(|c| delimiters.is_delimiter(c));
    let leading_quote = text.starts_with(q);
    if escape.is_none() && leading_quote {
        // An unescaped leading enclosure would open an enclosed field, and an
        // enclosed one could not carry it.
        return Err(Error::UnescapableValue {
            column: column.to_string(),
        });
    }
    if escape.is_none() && text.contains(q) && (has_delimiter || delimiters.enclose_required) {
        return Err(Error::UnescapableValue {
            column: column.to_string(),
        });
    }
    // When the escape is the enclosure (`""`), a field holding it must be
    // enclosed so a leading doubled quote is not read as an empty field.
    let doubled = escape == Some(q) && text.contains(q);

    if delimiters.enclose_required || has_delimiter || doubled {
        let mut enclosed = String::with_capacity(out.len() + 2);
        enclosed.push(q);
        enclosed.push_str(&out);
        enclosed.push(q);
        Ok((enclosed, true))
    } else {
        Ok((out, false))
    }
}

/// Make a literal that equals the null sentinel distinguishable from null.
fn quote_sentinel(
    escaped: String,
    delimiters: &DelimiterSet,
    column: &str,
    sentinel: &str,
) -> Result<String> {
    if let Some(q) = delimiters.enclosed_by {
        return Ok(format!("{}{}{}", q, escaped, q));
    }
    match delimiters.escaped_by {
        Some(e) if !escaped.is_empty() => Ok(format!("{}{}", e, escaped)),
        _ => Err(Error::NullSentinelAmbiguity {
            column: column.to_string(),
            sentinel: sentinel.to_string(),
        }),
    }
}
