//! Turning result sets into rows, records, and pages

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::mapper::coerce::FieldValue;
use crate::{Mapper, Record, Result, Value};

/// Tabular result returned by an executor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Single scalar of the first row, if any
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    pub fn into_rows(self) -> impl Iterator<Item = Row> {
        let columns: Arc<[String]> = self.columns.into();
        self.rows.into_iter().map(move |values| Row {
            columns: Arc::clone(&columns),
            values,
        })
    }
}

/// One result row: column names and their values, in select order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    fn coerce<T: FieldValue + Default>(&self, column: &str) -> Option<T> {
        let value = self.get(column)?;
        if value.is_null() {
            return None;
        }
        let mut out = T::default();
        out.assign(value).then_some(out)
    }

    pub fn get_string(&self, column: &str) -> Option<String> {
        self.coerce(column)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.coerce(column)
    }

    pub fn get_u64(&self, column: &str) -> Option<u64> {
        self.coerce(column)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.coerce(column)
    }

    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.coerce(column)
    }

    pub fn get_datetime(&self, column: &str) -> Option<NaiveDateTime> {
        self.coerce(column)
    }

    /// The row as a JSON object keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Deserialize the row through its JSON form
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Types a result row can be materialized into
pub trait FromRow: Sized {
    fn from_row(row: Row, mapper: &Mapper) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: Row, _mapper: &Mapper) -> Result<Self> {
        Ok(row)
    }
}

/// Columns match exposed names first, then Rust field names; the rest are ignored
impl<R: Record> FromRow for R {
    fn from_row(row: Row, mapper: &Mapper) -> Result<Self> {
        let mut record = R::default();
        mapper.fill_named(&mut record, &row.columns, &row.values)?;
        Ok(record)
    }
}

/// Materialize every row of a result set
pub fn materialize_all<T: FromRow>(result: ResultSet, mapper: &Mapper) -> Result<Vec<T>> {
    result
        .into_rows()
        .map(|row| T::from_row(row, mapper))
        .collect()
}

/// One page of records plus the total row count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
