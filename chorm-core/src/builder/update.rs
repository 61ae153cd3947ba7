//! UPDATE statement builder

use std::collections::{BTreeMap, HashMap};

use super::common::{render_conjunction, IntoCondition, Predicate, QueryBuilder, Statement};
use crate::{Error, Result, Value};

/// UPDATE statement; SET arguments precede WHERE arguments
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table_name: String,
    set_clauses: Vec<(String, Value)>,
    predicates: Vec<Predicate>,
}

impl UpdateStatement {
    /// Create an UPDATE statement; an empty SET list is rejected
    ///
    /// # Examples
    /// ```
    /// use chorm_core::{UpdateStatement, QueryBuilder};
    ///
    /// let statement = UpdateStatement::new("users", vec![("name", "Jane")])
    ///     .unwrap()
    ///     .where_(("id", 7));
    /// assert_eq!(statement.to_sql().unwrap(), "UPDATE users SET name = ? WHERE id = ?");
    /// ```
    pub fn new<D>(table: &str, data: D) -> Result<Self>
    where
        D: IntoUpdateData,
    {
        let set_clauses = data.into_update_data();
        if set_clauses.is_empty() {
            return Err(Error::validation("no data to update"));
        }

        Ok(Self {
            table_name: table.to_string(),
            set_clauses,
            predicates: Vec::new(),
        })
    }

    /// Add a WHERE condition
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.predicates.push(Predicate::compare(condition));
        self
    }

    pub(crate) fn with_predicates(mut self, predicates: Vec<Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }
}

impl QueryBuilder for UpdateStatement {
    fn render(&self) -> Result<Statement> {
        let mut sql = format!("UPDATE {} SET ", self.table_name);
        let mut params = Vec::with_capacity(self.set_clauses.len());

        let set_parts: Vec<String> = self
            .set_clauses
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect();
        sql.push_str(&set_parts.join(", "));
        params.extend(self.set_clauses.iter().map(|(_, value)| value.clone()));

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            render_conjunction(&self.predicates, &mut sql, &mut params)?;
        }

        Ok(Statement { sql, params })
    }
}

/// Trait for types that can be converted to UPDATE data
///
/// Hash maps are emitted sorted by column so the statement text is stable.
pub trait IntoUpdateData {
    fn into_update_data(self) -> Vec<(String, Value)>;
}

impl IntoUpdateData for Vec<(String, Value)> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self
    }
}

impl<V> IntoUpdateData for Vec<(&str, V)>
where
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.to_string(), value.into()))
            .collect()
    }
}

impl<V, const N: usize> IntoUpdateData for [(&str, V); N]
where
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.to_string(), value.into()))
            .collect()
    }
}

impl<K, V> IntoUpdateData for BTreeMap<K, V>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect()
    }
}

impl<K, V> IntoUpdateData for HashMap<K, V>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        let mut data: Vec<(String, Value)> = self
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        data.sort_by(|a, b| a.0.cmp(&b.0));
        data
    }
}
