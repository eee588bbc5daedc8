//! Record schema: ordered read path plus an optional reordered write path.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::protocol::identifier::sanitize;

use super::column::ColumnDescriptor;
use super::type_code::TypeCode;

/// A column bound by the database write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteColumn {
    /// Index of the column in the read path.
    pub read_index: usize,
    /// 1-based parameter position on the write path.
    pub ordinal: usize,
}

/// Ordered column descriptors of one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Source table, `None` for a free-form query.
    table: Option<String>,
    /// Read path, in ordinal order.
    columns: Vec<ColumnDescriptor>,
    /// Write path, in parameter order.
    write_columns: Vec<WriteColumn>,
    /// Whether the write path was declared separately from the read path.
    distinct_write_path: bool,
}

impl RecordSchema {
    /// Build a schema from catalog metadata.
    ///
    /// # Arguments
    /// * `table` - Table name, or `None` for a free-form query
    /// * `source_names` - Column names in the order the source reports them
    /// * `source_types` - Raw SQL type code per source column name
    /// * `requested` - Caller-declared column subset/order, matched case-insensitively
    /// * `write_columns` - Distinct column order for the database write path
    ///
    /// # Errors
    /// `UnknownColumn`, `UnsupportedType`, `IdentifierCollision`,
    /// `UnknownWriteColumn`, `DuplicateWriteColumn` or `EmptySchema`, each naming
    /// the offending column or table.
    pub fn build(
        table: Option<&str>,
        source_names: &[String],
        source_types: &HashMap<String, i32>,
        requested: Option<&[String]>,
        write_columns: Option<&[String]>,
    ) -> Result<Self> {
        let label = table.unwrap_or("query").to_string();
        let names = requested.unwrap_or(source_names);
        if names.is_empty() {
            return Err(Error::EmptySchema { table: label });
        }

        let mut columns = Vec::with_capacity(names.len());
        let mut seen: HashMap<String, String> = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let raw = lookup_type(name, source_names, source_types).ok_or_else(|| {
                Error::UnknownColumn {
                    column: name.clone(),
                    table: label.clone(),
                }
            })?;
            let column = ColumnDescriptor::new(name.as_str(), TypeCode::from_raw(raw), i + 1)?;

            if let Some(first) = seen.get(&column.identifier) {
                return Err(Error::IdentifierCollision {
                    first: first.clone(),
                    second: name.clone(),
                    identifier: column.identifier,
                });
            }
            seen.insert(column.identifier.clone(), name.clone());
            columns.push(column);
        }

        let (write_columns, distinct_write_path) = match write_columns {
            Some(write_names) => (resolve_write_path(&columns, write_names, &label)?, true),
            None => (
                (0..columns.len())
                    .map(|i| WriteColumn {
                        read_index: i,
                        ordinal: i + 1,
                    })
                    .collect(),
                false,
            ),
        };

        log::debug!("selected columns for {}:", label);
        for col in &columns {
            log::debug!(
                "  {} ({} -> {})",
                col.identifier,
                col.type_code,
                col.canonical_type
            );
        }
        if distinct_write_path {
            log::debug!("db write column order:");
            for w in &write_columns {
                log::debug!("  {}", columns[w.read_index].identifier);
            }
        }

        Ok(Self {
            table: table.map(str::to_string),
            columns,
            write_columns,
            distinct_write_path,
        })
    }

    /// Source table name, `None` for a free-form query.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Table name or `"query"`, for messages.
    pub fn label(&self) -> &str {
        self.table.as_deref().unwrap_or("query")
    }

    /// Read-path columns in ordinal order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Write-path columns in parameter order.
    pub fn write_columns(&self) -> &[WriteColumn] {
        &self.write_columns
    }

    /// Check if the write path was declared separately.
    pub fn has_distinct_write_path(&self) -> bool {
        self.distinct_write_path
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by read-path index (0-based).
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Get the identifiers in read-path order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.identifier.as_str()).collect()
    }

    /// Find column index by identifier, falling back to a case-insensitive
    /// match on identifier or original name.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        if let Some(idx) = self.columns.iter().position(|c| c.identifier == name) {
            return Some(idx);
        }
        let name_upper = name.to_uppercase();
        self.columns.iter().position(|c| {
            c.identifier.to_uppercase() == name_upper || c.original_name.to_uppercase() == name_upper
        })
    }
}

/// Look up the raw type of a column, exact name first, then case-insensitively
/// against the source's own spelling. Among several case-insensitive matches the
/// one the source reports first wins.
fn lookup_type(
    name: &str,
    source_names: &[String],
    source_types: &HashMap<String, i32>,
) -> Option<i32> {
    if let Some(raw) = source_types.get(name) {
        return Some(*raw);
    }
    let name_upper = name.to_uppercase();
    let mut candidates: Vec<&String> = source_types
        .keys()
        .filter(|key| key.to_uppercase() == name_upper)
        .collect();
    candidates.sort_by_key(|key| {
        (
            source_names.iter().position(|n| n == *key).unwrap_or(usize::MAX),
            (*key).clone(),
        )
    });
    candidates.first().and_then(|key| source_types.get(*key)).copied()
}

fn resolve_write_path(
    columns: &[ColumnDescriptor],
    write_names: &[String],
    label: &str,
) -> Result<Vec<WriteColumn>> {
    let mut used = HashSet::with_capacity(write_names.len());
    let mut write_columns = Vec::with_capacity(write_names.len());
    for (i, name) in write_names.iter().enumerate() {
        let identifier = sanitize(name);
        let read_index = match columns.iter().position(|c| c.identifier == identifier) {
            Some(idx) => idx,
            None => {
                let upper = identifier.to_uppercase();
                let mut matches = columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.identifier.to_uppercase() == upper);
                match (matches.next(), matches.next()) {
                    (Some((idx, _)), None) => idx,
                    _ => {
                        return Err(Error::UnknownWriteColumn {
                            column: name.clone(),
                            table: label.to_string(),
                        })
                    }
                }
            }
        };
        if !used.insert(read_index) {
            return Err(Error::DuplicateWriteColumn {
                column: name.clone(),
            });
        }
        write_columns.push(WriteColumn {
            read_index,
            ordinal: i + 1,
        });
    }
    Ok(write_columns)
}
