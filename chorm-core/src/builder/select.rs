//! SELECT statement builder

use super::aggregate::Aggregate;
use super::common::{
    render_conjunction, Fragment, IntoColumns, IntoCondition, JoinClause, JoinType,
    OrderByClause, Predicate, QueryBuilder, SortDirection, Statement,
};
use super::delete::DeleteStatement;
use super::update::{IntoUpdateData, UpdateStatement};
use super::window::Window;
use crate::{Error, Operator, Result, Value};

/// Per-render replacements that leave the builder itself untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub projections: Option<Vec<String>>,
    pub order_by: Option<Vec<OrderByClause>>,
    /// `Some(None)` clears the limit
    pub limit: Option<Option<u64>>,
    pub offset: Option<Option<u64>>,
}

/// Stateful SELECT builder with predicates, joins, grouping, ordering and paging
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) table: Option<String>,
    pub(crate) projections: Vec<String>,
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<Predicate>,
    pub(crate) order_by: Vec<OrderByClause>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) distinct: bool,
}

impl Query {
    /// Create a query with the default `*` projection and no table
    pub fn new() -> Self {
        Self {
            projections: vec!["*".to_string()],
            ..Self::default()
        }
    }

    /// Set the target table
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn projections(&self) -> &[String] {
        &self.projections
    }

    pub fn order_by_clauses(&self) -> &[OrderByClause] {
        &self.order_by
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Replace the projection list; an empty list keeps the current one
    ///
    /// # Examples
    /// ```
    /// use chorm_core::{table, QueryBuilder};
    ///
    /// let query = table("events").select(("id", "name"));
    /// assert_eq!(query.to_sql().unwrap(), "SELECT id, name FROM events");
    /// ```
    pub fn select<C>(mut self, columns: C) -> Self
    where
        C: IntoColumns,
    {
        let columns = columns.into_columns();
        if !columns.is_empty() {
            self.projections = columns;
        }
        self
    }

    /// Append one projection
    pub fn add_select(mut self, expression: &str) -> Self {
        self.projections.push(expression.to_string());
        self
    }

    /// Mark the query as DISTINCT
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a WHERE comparison
    ///
    /// # Examples
    /// ```
    /// use chorm_core::{table, op, QueryBuilder};
    ///
    /// let query = table("users").where_(("age", op::GT, 18)).where_(("status", "active"));
    /// assert_eq!(
    ///     query.to_sql().unwrap(),
    ///     "SELECT * FROM users WHERE age > ? AND status = ?"
    /// );
    /// ```
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.predicates.push(Predicate::compare(condition));
        self
    }

    /// Add a raw WHERE condition with `?` markers and their arguments
    pub fn where_raw<I>(mut self, condition: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.predicates.push(Predicate::Raw(Fragment::new(
            condition,
            args.into_iter().map(Into::into).collect(),
        )));
        self
    }

    /// `field IN (?, ...)`; an empty list adds nothing
    pub fn where_in<I>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.where_list(field, Operator::IN, values)
    }

    /// `field NOT IN (?, ...)`; an empty list adds nothing
    pub fn where_not_in<I>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.where_list(field, Operator::NOT_IN, values)
    }

    fn where_list<I>(mut self, field: &str, operator: Operator, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        self.predicates.push(Predicate::Compare {
            column: field.to_string(),
            operator,
            value: Value::Array(values),
        });
        self
    }

    /// `field BETWEEN ? AND ?`
    pub fn where_between<S, E>(mut self, field: &str, start: S, end: E) -> Self
    where
        S: Into<Value>,
        E: Into<Value>,
    {
        self.predicates.push(Predicate::Raw(Fragment::new(
            format!("{} BETWEEN ? AND ?", field),
            vec![start.into(), end.into()],
        )));
        self
    }

    /// `field LIKE ?`
    pub fn where_like(self, field: &str, pattern: &str) -> Self {
        self.where_((field, Operator::LIKE, pattern))
    }

    pub fn where_null(mut self, field: &str) -> Self {
        self.predicates
            .push(Predicate::Raw(Fragment::text(format!("{} IS NULL", field))));
        self
    }

    pub fn where_not_null(mut self, field: &str) -> Self {
        self.predicates
            .push(Predicate::Raw(Fragment::text(format!("{} IS NOT NULL", field))));
        self
    }

    fn push_join<I>(mut self, join_type: JoinType, table: &str, on: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.joins.push(JoinClause {
            join_type,
            table: table.to_string(),
            on: Fragment::new(on, args.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Add an INNER JOIN; `on` may carry `?` markers bound to `args`
    ///
    /// # Examples
    /// ```
    /// use chorm_core::{table, params, QueryBuilder};
    ///
    /// let query = table("orders")
    ///     .where_(("orders.total", ">", 100))
    ///     .join("users", "users.id = orders.user_id AND users.region = ?", params!["eu"]);
    ///
    /// assert_eq!(
    ///     query.to_sql().unwrap(),
    ///     "SELECT * FROM orders INNER JOIN users ON users.id = orders.user_id AND users.region = ? WHERE orders.total > ?"
    /// );
    /// assert_eq!(query.parameters().unwrap(), params!["eu", 100]);
    /// ```
    pub fn join<I>(self, table: &str, on: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_join(JoinType::Inner, table, on, args)
    }

    pub fn left_join<I>(self, table: &str, on: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_join(JoinType::Left, table, on, args)
    }

    pub fn right_join<I>(self, table: &str, on: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_join(JoinType::Right, table, on, args)
    }

    pub fn full_join<I>(self, table: &str, on: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_join(JoinType::Full, table, on, args)
    }

    /// Append GROUP BY columns
    pub fn group_by<C>(mut self, columns: C) -> Self
    where
        C: IntoColumns,
    {
        self.group_by.extend(columns.into_columns());
        self
    }

    /// Add a HAVING comparison
    pub fn having<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.having.push(Predicate::compare(condition));
        self
    }

    /// Add a raw HAVING condition with `?` markers and their arguments
    pub fn having_raw<I>(mut self, condition: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.having.push(Predicate::Raw(Fragment::new(
            condition,
            args.into_iter().map(Into::into).collect(),
        )));
        self
    }

    /// Add an ORDER BY entry; `None` leaves the direction to the engine
    pub fn order_by<D>(mut self, field: &str, direction: D) -> Self
    where
        D: Into<Option<SortDirection>>,
    {
        self.order_by.push(OrderByClause {
            column: field.to_string(),
            direction: direction.into(),
        });
        self
    }

    pub fn order_by_asc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Asc)
    }

    pub fn order_by_desc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Desc)
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Start an aggregate projection over this query
    pub fn aggregate(self) -> Aggregate {
        Aggregate::new(self)
    }

    /// Start a window-function projection over this query
    pub fn window(self) -> Window {
        Window::new(self)
    }

    /// UPDATE statement for the table and predicates of this query
    pub fn update_statement<D>(&self, values: D) -> Result<UpdateStatement>
    where
        D: IntoUpdateData,
    {
        Ok(
            UpdateStatement::new(self.require_table()?, values.into_update_data())?
                .with_predicates(self.predicates.clone()),
        )
    }

    /// DELETE statement for the table and predicates of this query
    pub fn delete_statement(&self) -> Result<DeleteStatement> {
        Ok(DeleteStatement::new(self.require_table()?).with_predicates(self.predicates.clone()))
    }

    pub(crate) fn require_table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| Error::validation("no table selected"))
    }

    /// Render with per-call replacements; joins, then WHERE, then HAVING supply arguments
    pub(crate) fn render_with(&self, overrides: &Overrides) -> Result<Statement> {
        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        let projections = overrides.projections.as_ref().unwrap_or(&self.projections);
        if projections.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&projections.join(", "));
        }

        if let Some(table) = &self.table {
            sql.push_str(" FROM ");
            sql.push_str(table);
        }

        for join in &self.joins {
            sql.push(' ');
            join.render(&mut sql, &mut params)?;
        }

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            render_conjunction(&self.predicates, &mut sql, &mut params)?;
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            render_conjunction(&self.having, &mut sql, &mut params)?;
        }

        let order_by = overrides.order_by.as_ref().unwrap_or(&self.order_by);
        if !order_by.is_empty() {
            let parts: Vec<String> = order_by.iter().map(ToString::to_string).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = overrides.limit.unwrap_or(self.limit) {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = overrides.offset.unwrap_or(self.offset) {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(Statement { sql, params })
    }

    pub(crate) fn count_overrides() -> Overrides {
        Overrides {
            projections: Some(vec!["COUNT(*)".to_string()]),
            order_by: Some(Vec::new()),
            limit: Some(None),
            offset: Some(None),
        }
    }

    pub(crate) fn exists_overrides() -> Overrides {
        Overrides {
            projections: Some(vec!["1".to_string()]),
            limit: Some(Some(1)),
            ..Overrides::default()
        }
    }

    /// Inverted ordering, or `fallback DESC` when nothing is ordered
    pub(crate) fn last_overrides(&self, fallback: &str) -> Overrides {
        let order_by = if self.order_by.is_empty() {
            vec![OrderByClause {
                column: fallback.to_string(),
                direction: Some(SortDirection::Desc),
            }]
        } else {
            self.order_by.iter().map(OrderByClause::inverted).collect()
        };

        Overrides {
            order_by: Some(order_by),
            limit: Some(Some(1)),
            ..Overrides::default()
        }
    }

    pub(crate) fn first_overrides() -> Overrides {
        Overrides {
            limit: Some(Some(1)),
            ..Overrides::default()
        }
    }
}

impl QueryBuilder for Query {
    fn render(&self) -> Result<Statement> {
        self.render_with(&Overrides::default())
    }
}
