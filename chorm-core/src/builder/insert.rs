//! INSERT statement builder

use super::common::{placeholders, QueryBuilder, Statement};
use crate::{Error, Mapper, Record, Result, Value};

/// Multi-row INSERT with one placeholder group per row
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table_name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl InsertStatement {
    pub fn new<C, S>(table: &str, columns: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table_name: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append one row of values, in column order
    ///
    /// # Examples
    /// ```
    /// use chorm_core::{params, InsertStatement, QueryBuilder};
    ///
    /// let statement = InsertStatement::new("users", ["name", "age"])
    ///     .row(params!["John", 30])
    ///     .row(params!["Jane", 25]);
    /// assert_eq!(
    ///     statement.to_sql().unwrap(),
    ///     "INSERT INTO `users` (`name`, `age`) VALUES (?, ?), (?, ?)"
    /// );
    /// ```
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// INSERT for a batch of records, columns in descriptor order
    pub fn for_records<R: Record>(mapper: &Mapper, records: &[R]) -> Result<Self> {
        let descriptor = mapper.describe::<R>()?;
        let mut statement = Self::new(&descriptor.name, descriptor.column_names());
        for record in records {
            statement.rows.push(mapper.values_of(record)?);
        }
        Ok(statement)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl QueryBuilder for InsertStatement {
    fn render(&self) -> Result<Statement> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(Error::validation("INSERT requires columns and values"));
        }

        let width = self.columns.len();
        if let Some(row) = self.rows.iter().find(|row| row.len() != width) {
            return Err(Error::validation(format!(
                "INSERT row has {} value(s) for {} column(s)",
                row.len(),
                width
            )));
        }

        let columns: Vec<String> = self.columns.iter().map(|c| format!("`{}`", c)).collect();
        let group = format!("({})", placeholders(width));
        let groups = vec![group; self.rows.len()];

        let sql = format!(
            "INSERT INTO `{}` ({}) VALUES {}",
            self.table_name,
            columns.join(", "),
            groups.join(", ")
        );
        let params = self.rows.iter().flatten().cloned().collect();

        Ok(Statement { sql, params })
    }
}
