//! Driver doubles shared by the integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sql_record_rs::{FieldValue, ParameterSink, Result, RowSource, TypeCode};

/// One result row held in memory. Ordinals are 1-based.
pub struct MemoryRow {
    values: Vec<FieldValue>,
    clobs: Vec<Option<String>>,
    blobs: Vec<Option<Vec<u8>>>,
}

impl MemoryRow {
    pub fn new(values: Vec<FieldValue>) -> Self {
        let len = values.len();
        Self {
            values,
            clobs: vec![None; len],
            blobs: vec![None; len],
        }
    }

    pub fn with_clob(mut self, ordinal: usize, data: &str) -> Self {
        self.clobs[ordinal - 1] = Some(data.to_string());
        self
    }

    pub fn with_blob(mut self, ordinal: usize, data: Vec<u8>) -> Self {
        self.blobs[ordinal - 1] = Some(data);
        self
    }

    fn at(&self, ordinal: usize) -> &FieldValue {
        &self.values[ordinal - 1]
    }
}

impl RowSource for MemoryRow {
    fn get_i32(&self, ordinal: usize) -> Result<Option<i32>> {
        Ok(match self.at(ordinal) {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        })
    }

    fn get_i64(&self, ordinal: usize) -> Result<Option<i64>> {
        Ok(self.at(ordinal).to_i64())
    }

    fn get_f32(&self, ordinal: usize) -> Result<Option<f32>> {
        Ok(match self.at(ordinal) {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        })
    }

    fn get_f64(&self, ordinal: usize) -> Result<Option<f64>> {
        Ok(self.at(ordinal).to_f64())
    }

    fn get_bool(&self, ordinal: usize) -> Result<Option<bool>> {
        Ok(match self.at(ordinal) {
            FieldValue::Boolean(v) => Some(*v),
            _ => None,
        })
    }

    fn get_string(&self, ordinal: usize) -> Result<Option<String>> {
        Ok(self.at(ordinal).as_str().map(str::to_string))
    }

    fn get_decimal(&self, ordinal: usize) -> Result<Option<Decimal>> {
        Ok(match self.at(ordinal) {
            FieldValue::Decimal(v) => Some(*v),
            _ => None,
        })
    }

    fn get_date(&self, ordinal: usize) -> Result<Option<NaiveDate>> {
        Ok(match self.at(ordinal) {
            FieldValue::Date(v) => Some(*v),
            _ => None,
        })
    }

    fn get_time(&self, ordinal: usize) -> Result<Option<NaiveTime>> {
        Ok(match self.at(ordinal) {
            FieldValue::Time(v) => Some(*v),
            _ => None,
        })
    }

    fn get_timestamp(&self, ordinal: usize) -> Result<Option<NaiveDateTime>> {
        Ok(self.at(ordinal).as_timestamp())
    }

    fn get_bytes(&self, ordinal: usize) -> Result<Option<Vec<u8>>> {
        Ok(self.at(ordinal).as_bytes().map(<[u8]>::to_vec))
    }

    fn get_object(&self, ordinal: usize) -> Result<Option<String>> {
        Ok(self.at(ordinal).as_str().map(str::to_string))
    }

    fn get_clob_data(&self, ordinal: usize) -> Result<Option<String>> {
        Ok(self.clobs[ordinal - 1].clone())
    }

    fn get_blob_data(&self, ordinal: usize) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs[ordinal - 1].clone())
    }
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Null(TypeCode),
    Value(FieldValue),
}

/// Parameter sink that records `(index, value)` pairs in bind order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub binds: Vec<(usize, Bound)>,
}

impl RecordingSink {
    fn push(&mut self, index: usize, value: FieldValue) -> Result<()> {
        self.binds.push((index, Bound::Value(value)));
        Ok(())
    }
}

impl ParameterSink for RecordingSink {
    fn set_null(&mut self, index: usize, type_code: TypeCode) -> Result<()> {
        self.binds.push((index, Bound::Null(type_code)));
        Ok(())
    }

    fn set_i32(&mut self, index: usize, value: i32) -> Result<()> {
        self.push(index, FieldValue::Integer(value))
    }

    fn set_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.push(index, FieldValue::Long(value))
    }

    fn set_f32(&mut self, index: usize, value: f32) -> Result<()> {
        self.push(index, FieldValue::Float(value))
    }

    fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.push(index, FieldValue::Double(value))
    }

    fn set_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.push(index, FieldValue::Boolean(value))
    }

    fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.push(index, FieldValue::Text(value.to_string()))
    }

    fn set_decimal(&mut self, index: usize, value: Decimal) -> Result<()> {
        self.push(index, FieldValue::Decimal(value))
    }

    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()> {
        self.push(index, FieldValue::Date(value))
    }

    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()> {
        self.push(index, FieldValue::Time(value))
    }

    fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> Result<()> {
        self.push(index, FieldValue::Timestamp(value))
    }

    fn set_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.push(index, FieldValue::Bytes(value.to_vec()))
    }

    fn set_clob(&mut self, index: usize, value: &str) -> Result<()> {
        self.push(index, FieldValue::Text(value.to_string()))
    }

    fn set_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.push(index, FieldValue::Bytes(value.to_vec()))
    }

    fn set_object(&mut self, index: usize, value: &str) -> Result<()> {
        self.push(index, FieldValue::Opaque(value.to_string()))
    }
}
