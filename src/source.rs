//! Schema metadata sources.
//!
//! A [`SchemaSource`] answers two metadata requests for a table or a free-form
//! query: the column names in result order, and the raw SQL type code per
//! column. Each answer is a live result on the source; callers must `release()`
//! it before issuing the next request. Methods take `&mut self`, so at most one
//! request can be in flight per source handle.

use std::collections::HashMap;
use std::future::Future;

use log::info;

use crate::error::{Error, Result};
use crate::protocol::constants::{CONDITIONS_TOKEN, EMPTY_CONDITION};

/// What to compile a record type for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaTarget {
    /// A table, by name.
    Table(String),
    /// A free-form query containing the `$CONDITIONS` placeholder.
    Query(String),
}

impl SchemaTarget {
    /// Target a table.
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table(name.into())
    }

    /// Target a free-form query.
    pub fn query(sql: impl Into<String>) -> Self {
        Self::Query(sql.into())
    }

    /// Table name, `None` for a query.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Self::Table(name) => Some(name),
            Self::Query(_) => None,
        }
    }
}

impl std::fmt::Display for SchemaTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table(name) => write!(f, "table {}", name),
            Self::Query(sql) => write!(f, "query [{}]", sql),
        }
    }
}

/// Build the zero-row statement used to read result metadata.
///
/// Tables become `SELECT t.* FROM <table> AS t WHERE 1=0`, with the table name
/// passed through `escape_table`. Queries have `$CONDITIONS` replaced by an
/// always-false predicate.
///
/// # Errors
/// `MissingConditionsToken` if a query lacks the placeholder.
///
/// # Example
///
/// ```
/// use sql_record_rs::source::{probe_query, SchemaTarget};
///
/// let sql = probe_query(&SchemaTarget::table("employees"), |t| format!("\"{}\"", t)).unwrap();
/// assert_eq!(sql, "SELECT t.* FROM \"employees\" AS t WHERE 1=0");
///
/// let sql = probe_query(
///     &SchemaTarget::query("SELECT id FROM e WHERE $CONDITIONS"),
///     |t| t.to_string(),
/// ).unwrap();
/// assert_eq!(sql, "SELECT id FROM e WHERE  (1 = 0) ");
/// ```
pub fn probe_query(target: &SchemaTarget, escape_table: impl Fn(&str) -> String) -> Result<String> {
    let statement = match target {
        SchemaTarget::Table(name) => {
            format!("SELECT t.* FROM {} AS t WHERE 1=0", escape_table(name))
        }
        SchemaTarget::Query(sql) => {
            if !sql.contains(CONDITIONS_TOKEN) {
                return Err(Error::MissingConditionsToken { query: sql.clone() });
            }
            sql.replace(CONDITIONS_TOKEN, EMPTY_CONDITION)
        }
    };
    info!("Executing SQL statement: {}", statement);
    Ok(statement)
}

/// Name a result column the way catalogs report it: its name, else its label,
/// else `_RESULT_<ordinal>`.
pub fn reported_column_name(name: Option<&str>, label: Option<&str>, ordinal: usize) -> String {
    match (name, label) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(label)) => label.to_string(),
        _ => format!("_RESULT_{}", ordinal),
    }
}

/// Catalog layer that reports result metadata for tables and queries.
pub trait SchemaSource {
    /// Column names in result order.
    fn column_names(
        &mut self,
        target: &SchemaTarget,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Raw SQL type code per column name.
    fn column_types(
        &mut self,
        target: &SchemaTarget,
    ) -> impl Future<Output = Result<HashMap<String, i32>>> + Send;

    /// Quote a column name for this database.
    fn escape_column_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Quote a table name for this database.
    fn escape_table_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Release the result of the last request.
    fn release(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Column as a catalog reports it, before name fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedColumn {
    pub name: Option<String>,
    pub label: Option<String>,
    pub type_code: i32,
}

impl ReportedColumn {
    /// A column with a name.
    pub fn new(name: impl Into<String>, type_code: i32) -> Self {
        Self {
            name: Some(name.into()),
            label: None,
            type_code,
        }
    }

    /// A computed column that only carries a label.
    pub fn labelled(label: impl Into<String>, type_code: i32) -> Self {
        Self {
            name: None,
            label: Some(label.into()),
            type_code,
        }
    }

    /// A computed column with neither name nor label.
    pub fn anonymous(type_code: i32) -> Self {
        Self {
            name: None,
            label: None,
            type_code,
        }
    }
}

/// In-memory [`SchemaSource`] for offline compilation and tests.
///
/// Unlike a live catalog it also checks the release discipline at runtime: a
/// second request before `release()` fails with `ResultStillOpen`.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, Vec<ReportedColumn>>,
    queries: HashMap<String, Vec<ReportedColumn>>,
    open: Option<String>,
    statements: Vec<String>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with `(name, type_code)` columns.
    pub fn with_table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(n, t)| ReportedColumn::new(n, t))
            .collect();
        self.tables.insert(name.into(), columns);
        self
    }

    /// Register the result columns of a free-form query.
    pub fn with_query(mut self, sql: impl Into<String>, columns: Vec<ReportedColumn>) -> Self {
        self.queries.insert(sql.into(), columns);
        self
    }

    /// Probe statements issued so far.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Whether a result is waiting to be released.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn execute(&mut self, target: &SchemaTarget) -> Result<Vec<ReportedColumn>> {
        let statement = probe_query(target, |t| self.escape_table_name(t))?;
        if self.open.is_some() {
            return Err(Error::ResultStillOpen { request: statement });
        }

        let columns = match target {
            SchemaTarget::Table(name) => self.tables.get(name),
            SchemaTarget::Query(sql) => self.queries.get(sql),
        }
        .cloned()
        .ok_or_else(|| Error::schema_source(format!("No metadata for {}", target)))?;

        self.statements.push(statement.clone());
        self.open = Some(statement);
        Ok(columns)
    }
}

impl SchemaSource for MemoryCatalog {
    async fn column_names(&mut self, target: &SchemaTarget) -> Result<Vec<String>> {
        let columns = self.execute(target)?;
        Ok(columns
            .iter()
            .enumerate()
            .map(|(i, c)| reported_column_name(c.name.as_deref(), c.label.as_deref(), i + 1))
            .collect())
    }

    async fn column_types(&mut self, target: &SchemaTarget) -> Result<HashMap<String, i32>> {
        let columns = self.execute(target)?;
        Ok(columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                (
                    reported_column_name(c.name.as_deref(), c.label.as_deref(), i + 1),
                    c.type_code,
                )
            })
            .collect())
    }

    async fn release(&mut self) -> Result<()> {
        self.open = None;
        Ok(())
    }
}
