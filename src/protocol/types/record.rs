//! Record instances of a compiled record type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::protocol::codec::RowSource;

use super::column::ColumnDescriptor;
use super::schema::RecordSchema;
use super::value::FieldValue;

/// One record: a value per read-path column.
#[derive(Clone)]
pub struct Record {
    /// Field values in read-path order.
    values: Vec<FieldValue>,
    /// Shared schema (reference counted).
    schema: Arc<RecordSchema>,
    /// Cursor the record was read from, kept for deferred LOB loading.
    cursor: Option<Arc<dyn RowSource>>,
}

impl Record {
    /// Create a record with every field NULL.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self {
            values: vec![FieldValue::Null; schema.len()],
            schema,
            cursor: None,
        }
    }

    /// Create a record from values in read-path order.
    ///
    /// Returns error if the count or any value's type does not match the schema.
    pub fn from_values(schema: Arc<RecordSchema>, values: Vec<FieldValue>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::FieldCount {
                expected: schema.len(),
                actual: values.len(),
            });
        }
        for (col, value) in schema.columns().iter().zip(&values) {
            check_fits(col, value)?;
        }
        Ok(Self {
            values,
            schema,
            cursor: None,
        })
    }

    pub(crate) fn with_cursor(mut self, cursor: Arc<dyn RowSource>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Cursor retained by `read_from`.
    pub fn cursor(&self) -> Option<&Arc<dyn RowSource>> {
        self.cursor.as_ref()
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// Get value by identifier or column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&FieldValue> {
        self.schema
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Set value by column index (0-based).
    pub fn set(&mut self, index: usize, value: FieldValue) -> Result<()> {
        let count = self.values.len();
        let col = self
            .schema
            .get(index)
            .ok_or(Error::ColumnNotFound {
                name: format!("#{} of {}", index, count),
            })?;
        check_fits(col, &value)?;
        self.values[index] = value;
        Ok(())
    }

    /// Set value by identifier or column name (case-insensitive).
    pub fn set_by_name(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let index = self
            .schema
            .find_by_name(name)
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })?;
        self.set(index, value)
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Get the schema.
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.iter()
    }

    /// Map of identifier to current value, ordered by identifier.
    pub fn field_map(&self) -> BTreeMap<String, FieldValue> {
        self.schema
            .columns()
            .iter()
            .zip(&self.values)
            .map(|(col, value)| (col.identifier.clone(), value.clone()))
            .collect()
    }

    pub(crate) fn values_mut(&mut self) -> &mut [FieldValue] {
        &mut self.values
    }
}

fn check_fits(col: &ColumnDescriptor, value: &FieldValue) -> Result<()> {
    if value.fits(col.canonical_type) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            column: col.identifier.clone(),
            expected: col.canonical_type.simple_name(),
            actual: value.kind_name(),
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.schema.columns() == other.schema.columns()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (col, value) in self.schema.columns().iter().zip(&self.values) {
            map.entry(&col.identifier, value);
        }
        map.finish()
    }
}

impl IntoIterator for Record {
    type Item = FieldValue;
    type IntoIter = std::vec::IntoIter<FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a FieldValue;
    type IntoIter = std::slice::Iter<'a, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::*;
    use std::collections::HashMap;

    fn make_test_schema() -> Arc<RecordSchema> {
        let names: Vec<String> = vec!["name".into(), "value".into(), "created".into()];
        let types: HashMap<String, i32> = [
            ("name".to_string(), SQL_TYPE_VARCHAR),
            ("value".to_string(), SQL_TYPE_INTEGER),
            ("created".to_string(), SQL_TYPE_DATE),
        ]
        .into_iter()
        .collect();
        Arc::new(RecordSchema::build(Some("t"), &names, &types, None, None).unwrap())
    }

    #[test]
    fn test_record_access() {
        let mut record = Record::new(make_test_schema());
        assert_eq!(record.len(), 3);
        assert!(record.iter().all(FieldValue::is_null));

        record.set(0, FieldValue::Text("test".into())).unwrap();
        record.set_by_name("VALUE", FieldValue::Integer(42)).unwrap();

        assert_eq!(record.get(0), Some(&FieldValue::Text("test".into())));
        assert_eq!(record.get_by_name("value"), Some(&FieldValue::Integer(42)));
        assert_eq!(record.get_by_name("VALUE"), record.get_by_name("value"));
    }

    #[test]
    fn test_record_type_mismatch() {
        let mut record = Record::new(make_test_schema());
        let err = record.set(1, FieldValue::Text("42".into())).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { expected: "integer", actual: "text", .. }
        ));
        assert!(record.set(1, FieldValue::Null).is_ok());
        assert!(record.set(7, FieldValue::Null).is_err());
    }

    #[test]
    fn test_from_values_count() {
        let err = Record::from_values(make_test_schema(), vec![FieldValue::Null]).unwrap_err();
        assert!(matches!(err, Error::FieldCount { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Record::new(make_test_schema());
        original.set(0, FieldValue::Text("a".into())).unwrap();
        let mut copy = original.clone();
        copy.set(0, FieldValue::Text("b".into())).unwrap();

        assert_eq!(original.get(0), Some(&FieldValue::Text("a".into())));
        assert_eq!(copy.get(0), Some(&FieldValue::Text("b".into())));
    }

    #[test]
    fn test_field_map_is_name_ordered() {
        let mut record = Record::new(make_test_schema());
        record.set(1, FieldValue::Integer(7)).unwrap();
        let map = record.field_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["created", "name", "value"]);
        assert_eq!(map["value"], FieldValue::Integer(7));
        assert_eq!(map["name"], FieldValue::Null);
    }
}
