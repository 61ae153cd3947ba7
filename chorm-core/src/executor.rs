//! Statement execution: the transport trait, the client handle, and terminal operations

use std::future::Future;
use std::sync::Arc;

use crate::builder::{Aggregate, InsertStatement, IntoUpdateData, Query, QueryBuilder, Statement};
use crate::materialize::{materialize_all, FromRow, Page, ResultSet};
use crate::mapper::coerce::FieldValue;
use crate::{Config, Error, Mapper, Record, Result, Value};

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<u64>,
}

/// Transport that runs SQL text with positional arguments
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows (DDL, INSERT, ALTER ... UPDATE)
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<ExecResult>> + Send;

    /// Execute a statement and collect its rows
    fn query(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<ResultSet>> + Send;
}

/// Executor plus the shared mapper and configuration
#[derive(Debug)]
pub struct Client<E> {
    executor: E,
    mapper: Arc<Mapper>,
    config: Config,
}

impl<E: Executor> Client<E> {
    pub fn new(executor: E, config: Config) -> Self {
        let mapper = Arc::new(Mapper::with_policy(config.coercion_policy()));
        Self::with_mapper(executor, config, mapper)
    }

    /// Share a mapper (and its schema cache) between clients
    pub fn with_mapper(executor: E, config: Config, mapper: Arc<Mapper>) -> Self {
        Self {
            executor,
            mapper,
            config,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh query with no table
    pub fn query(&self) -> Query {
        Query::new()
    }

    /// A query over the table of `R`
    pub fn query_for<R: Record>(&self) -> Result<Query> {
        let descriptor = self.mapper.describe::<R>()?;
        Ok(Query::new().table(&descriptor.name))
    }

    /// Run `CREATE TABLE IF NOT EXISTS` for `R`
    pub async fn create_table<R: Record>(&self) -> Result<ExecResult> {
        let sql = self.mapper.create_table_sql::<R>()?;
        self.run_execute(&Statement {
            sql,
            params: Vec::new(),
        })
        .await
    }

    /// Insert one record
    pub async fn insert<R: Record>(&self, record: &R) -> Result<ExecResult> {
        let statement = InsertStatement::for_records(&self.mapper, std::slice::from_ref(record))?;
        self.run_execute(&statement.render()?).await
    }

    /// Insert many records in a single statement; an empty slice does nothing
    pub async fn insert_batch<R: Record>(&self, records: &[R]) -> Result<ExecResult> {
        if records.is_empty() {
            return Ok(ExecResult::default());
        }
        let statement = InsertStatement::for_records(&self.mapper, records)?;
        self.run_execute(&statement.render()?).await
    }

    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult> {
        self.run_execute(&Statement {
            sql: sql.to_string(),
            params,
        })
        .await
    }

    pub async fn fetch_all<T: FromRow>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<T>> {
        let statement = Statement {
            sql: sql.to_string(),
            params,
        };
        let result = self.run_query(&statement).await?;
        materialize_all(result, &self.mapper)
    }

    pub async fn fetch_one<T: FromRow>(&self, sql: &str, params: Vec<Value>) -> Result<T> {
        let statement = Statement {
            sql: sql.to_string(),
            params,
        };
        self.first_row(&statement).await?
            .ok_or_else(|| Error::row_not_found(&statement.sql))
    }

    fn log(&self, statement: &Statement) {
        if self.config.debug {
            tracing::info!(sql = %statement.sql, args = statement.params.len(), "executing statement");
        } else {
            tracing::debug!(sql = %statement.sql, args = statement.params.len(), "executing statement");
        }
    }

    pub(crate) async fn run_execute(&self, statement: &Statement) -> Result<ExecResult> {
        self.log(statement);
        self.executor
            .execute(&statement.sql, &statement.params)
            .await
            .map_err(|e| Error::execution(&statement.sql, statement.params.len(), e))
    }

    pub(crate) async fn run_query(&self, statement: &Statement) -> Result<ResultSet> {
        self.log(statement);
        self.executor
            .query(&statement.sql, &statement.params)
            .await
            .map_err(|e| Error::execution(&statement.sql, statement.params.len(), e))
    }

    async fn first_row<T: FromRow>(&self, statement: &Statement) -> Result<Option<T>> {
        let result = self.run_query(statement).await?;
        match result.into_rows().next() {
            Some(row) => Ok(Some(T::from_row(row, &self.mapper)?)),
            None => Ok(None),
        }
    }
}

impl Query {
    /// First row, with `LIMIT 1` applied for this call only
    pub async fn fetch_one<T, E>(&self, client: &Client<E>) -> Result<T>
    where
        T: FromRow,
        E: Executor,
    {
        let statement = self.render_with(&Query::first_overrides())?;
        client
            .first_row(&statement)
            .await?
            .ok_or_else(|| Error::row_not_found(&statement.sql))
    }

    /// Like `fetch_one`, but an empty result is `None`
    pub async fn fetch_optional<T, E>(&self, client: &Client<E>) -> Result<Option<T>>
    where
        T: FromRow,
        E: Executor,
    {
        let statement = self.render_with(&Query::first_overrides())?;
        client.first_row(&statement).await
    }

    pub async fn fetch_all<T, E>(&self, client: &Client<E>) -> Result<Vec<T>>
    where
        T: FromRow,
        E: Executor,
    {
        let result = client.run_query(&self.render()?).await?;
        materialize_all(result, client.mapper())
    }

    /// `first` is `fetch_one` under the name callers pair with `last`
    pub async fn first<T, E>(&self, client: &Client<E>) -> Result<T>
    where
        T: FromRow,
        E: Executor,
    {
        self.fetch_one(client).await
    }

    /// Last row under the inverted ordering, or by primary key descending
    pub async fn last<R, E>(&self, client: &Client<E>) -> Result<R>
    where
        R: Record,
        E: Executor,
    {
        let descriptor = client.mapper().describe::<R>()?;
        let fallback = descriptor
            .primary_key()
            .map(|field| field.name.as_str())
            .unwrap_or("id");

        let statement = self.render_with(&self.last_overrides(fallback))?;
        client
            .first_row(&statement)
            .await?
            .ok_or_else(|| Error::row_not_found(&statement.sql))
    }

    /// Number of matching rows; limit and offset are ignored
    pub async fn count<E: Executor>(&self, client: &Client<E>) -> Result<u64> {
        let statement = self.render_with(&Query::count_overrides())?;
        let result = client.run_query(&statement).await?;

        let Some(cell) = result.scalar() else {
            return Ok(0);
        };
        let mut total = 0u64;
        if total.assign(cell) {
            Ok(total)
        } else {
            Err(Error::validation(format!(
                "COUNT(*) returned a non-numeric value: {:?}",
                cell
            )))
        }
    }

    /// Whether exactly one row comes back from `SELECT 1 ... LIMIT 1`
    pub async fn exists<E: Executor>(&self, client: &Client<E>) -> Result<bool> {
        let statement = self.render_with(&Query::exists_overrides())?;
        let result = client.run_query(&statement).await?;
        Ok(result.len() == 1)
    }

    /// One page of results; leaves the page's limit and offset on the query
    ///
    /// Pages are numbered from 1.
    pub async fn paginate<T, E>(
        &mut self,
        client: &Client<E>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<T>>
    where
        T: FromRow,
        E: Executor,
    {
        if page == 0 || per_page == 0 {
            return Err(Error::validation(format!(
                "page ({}) and per_page ({}) must be at least 1",
                page, per_page
            )));
        }

        let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
            Error::validation(format!(
                "page {} with per_page {} overflows the row offset",
                page, per_page
            ))
        })?;

        let total = self.count(client).await?;

        self.limit = Some(per_page);
        self.offset = Some(offset);
        let records = self.fetch_all(client).await?;

        Ok(Page {
            total,
            page,
            per_page,
            records,
        })
    }

    /// `UPDATE table SET ... WHERE <this query's predicates>`
    pub async fn update<D, E>(&self, client: &Client<E>, values: D) -> Result<ExecResult>
    where
        D: IntoUpdateData,
        E: Executor,
    {
        let statement = self.update_statement(values)?.render()?;
        client.run_execute(&statement).await
    }

    /// `DELETE FROM table WHERE <this query's predicates>`
    pub async fn delete<E: Executor>(&self, client: &Client<E>) -> Result<ExecResult> {
        let statement = self.delete_statement()?.render()?;
        client.run_execute(&statement).await
    }
}

impl Aggregate {
    /// First row of the aggregate query; `T` is a `Row` or a record keyed by alias
    pub async fn fetch_one<T, E>(self, client: &Client<E>) -> Result<T>
    where
        T: FromRow,
        E: Executor,
    {
        self.into_query()?.fetch_one(client).await
    }

    pub async fn fetch_all<T, E>(self, client: &Client<E>) -> Result<Vec<T>>
    where
        T: FromRow,
        E: Executor,
    {
        self.into_query()?.fetch_all(client).await
    }
}

/// Executor over ClickHouse's MySQL-compatible interface
#[cfg(feature = "mysql")]
pub mod mysql {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};
    use sqlx::{Column, MySql, Row as _, TypeInfo};

    /// sqlx MySQL pool wrapper
    #[derive(Debug, Clone)]
    pub struct MySqlExecutor {
        inner: MySqlPool,
    }

    impl MySqlExecutor {
        /// Open a pool sized from the configuration
        pub async fn connect(config: &Config) -> Result<Self> {
            config.validate()?;
            let pool = MySqlPoolOptions::new()
                .max_connections(config.max_open_conns)
                .max_lifetime(config.conn_max_lifetime())
                .connect(&config.mysql_url())
                .await?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing MySqlPool
        pub fn from_pool(pool: MySqlPool) -> Self {
            Self { inner: pool }
        }

        pub fn pool(&self) -> &MySqlPool {
            &self.inner
        }
    }

    impl Executor for MySqlExecutor {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(ExecResult {
                rows_affected: result.rows_affected(),
                last_insert_id: Some(result.last_insert_id()),
            })
        }

        async fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
            let query = bind_values(sqlx::query(sql), params);
            let rows = query.fetch_all(&self.inner).await?;

            let columns = rows
                .first()
                .map(|row| {
                    row.columns()
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect()
                })
                .unwrap_or_default();
            let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

            Ok(ResultSet::new(columns, rows))
        }
    }

    /// Bind Values to a sqlx query
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
        params: &[Value],
    ) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::I8(v) => query.bind(*v),
                Value::I16(v) => query.bind(*v),
                Value::I32(v) => query.bind(*v),
                Value::I64(v) => query.bind(*v),
                Value::U8(v) => query.bind(*v),
                Value::U16(v) => query.bind(*v),
                Value::U32(v) => query.bind(*v),
                Value::U64(v) => query.bind(*v),
                Value::F32(v) => query.bind(*v),
                Value::F64(v) => query.bind(*v),
                Value::String(s) => query.bind(s.clone()),
                Value::DateTime(dt) => query.bind(*dt),
                // Arrays travel as their JSON text
                Value::Array(_) => query.bind(param.to_json().to_string()),
            };
        }
        query
    }

    fn decode_row(row: &MySqlRow) -> Result<Vec<Value>> {
        row.columns()
            .iter()
            .enumerate()
            .map(|(index, column)| decode_cell(row, index, column.type_info().name()))
            .collect()
    }

    /// How a column is read, chosen from its reported type name
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Decoder {
        Null,
        Bool,
        I8,
        I16,
        I32,
        I64,
        U8,
        U16,
        U32,
        U64,
        F32,
        F64,
        DateTime,
        Date,
        /// DECIMAL, enums, and anything else sent as text
        Text,
    }

    impl Decoder {
        fn for_type(type_name: &str) -> Self {
            match type_name.to_uppercase().as_str() {
                "NULL" => Decoder::Null,
                "BOOLEAN" => Decoder::Bool,
                "TINYINT" => Decoder::I8,
                "SMALLINT" => Decoder::I16,
                "INT" | "MEDIUMINT" => Decoder::I32,
                "BIGINT" => Decoder::I64,
                "TINYINT UNSIGNED" => Decoder::U8,
                "SMALLINT UNSIGNED" => Decoder::U16,
                "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => Decoder::U32,
                "BIGINT UNSIGNED" => Decoder::U64,
                "FLOAT" => Decoder::F32,
                "DOUBLE" => Decoder::F64,
                "DATETIME" | "TIMESTAMP" => Decoder::DateTime,
                "DATE" => Decoder::Date,
                _ => Decoder::Text,
            }
        }
    }

    fn decode_cell(row: &MySqlRow, index: usize, type_name: &str) -> Result<Value> {
        let value = match Decoder::for_type(type_name) {
            Decoder::Null => None,
            Decoder::Bool => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
            Decoder::I8 => row.try_get::<Option<i8>, _>(index)?.map(Value::I8),
            Decoder::I16 => row.try_get::<Option<i16>, _>(index)?.map(Value::I16),
            Decoder::I32 => row.try_get::<Option<i32>, _>(index)?.map(Value::I32),
            Decoder::I64 => row.try_get::<Option<i64>, _>(index)?.map(Value::I64),
            Decoder::U8 => row.try_get::<Option<u8>, _>(index)?.map(Value::U8),
            Decoder::U16 => row.try_get::<Option<u16>, _>(index)?.map(Value::U16),
            Decoder::U32 => row.try_get::<Option<u32>, _>(index)?.map(Value::U32),
            Decoder::U64 => row.try_get::<Option<u64>, _>(index)?.map(Value::U64),
            Decoder::F32 => row.try_get::<Option<f32>, _>(index)?.map(Value::F32),
            Decoder::F64 => row.try_get::<Option<f64>, _>(index)?.map(Value::F64),
            Decoder::DateTime => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(Value::DateTime),
            Decoder::Date => row
                .try_get::<Option<NaiveDate>, _>(index)?
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(Value::DateTime),
            // the typed String/bytes decoders reject DECIMAL and DATE-like type ids
            Decoder::Text => match row.try_get_unchecked::<Option<String>, _>(index) {
                Ok(text) => text.map(Value::String),
                Err(_) => row
                    .try_get_unchecked::<Option<Vec<u8>>, _>(index)?
                    .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            },
        };
        Ok(value.unwrap_or(Value::Null))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::Row;
    use crate::testing::MockExecutor;
    use crate::{op, params, record, table};
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct User {
        id: u64,
        name: String,
        email: String,
        age: u8,
    }

    record! {
        #[table = "users"]
        impl Record for User {
            id: [primary_key],
            name,
            email: [column("email_address")],
            age,
        }
    }

    #[derive(Debug, Default)]
    struct Visit {
        page: String,
    }

    record! {
        impl Record for Visit {
            page,
        }
    }

    fn user_rows(n: u64) -> ResultSet {
        ResultSet::new(
            vec![
                "id".to_string(),
                "name".to_string(),
                "email_address".to_string(),
                "age".to_string(),
            ],
            (1..=n)
                .map(|i| {
                    vec![
                        Value::U64(i),
                        Value::String(format!("user{}", i)),
                        Value::String(format!("user{}@example.com", i)),
                        Value::I32(20 + i as i32),
                    ]
                })
                .collect(),
        )
    }

    fn count_rows(n: u64) -> ResultSet {
        ResultSet::new(vec!["COUNT(*)".to_string()], vec![vec![Value::U64(n)]])
    }

    fn client(executor: MockExecutor) -> Client<MockExecutor> {
        Client::new(executor, Config::default())
    }

    #[tokio::test]
    async fn test_select_fetch_all() {
        let client = client(MockExecutor::new().with_rows(user_rows(2)));
        let query = table("users")
            .select(("id", "name", "email_address", "age"))
            .where_(("age", op::GT, 18));

        let users: Vec<User> = query.fetch_all(&client).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "user1");
        assert_eq!(users[1].email, "user2@example.com");
        assert_eq!(users[1].age, 22);

        let calls = client.executor().calls();
        assert_eq!(
            calls[0].sql,
            "SELECT id, name, email_address, age FROM users WHERE age > ?"
        );
        assert_eq!(calls[0].params, params![18]);
    }

    #[tokio::test]
    async fn test_select_fetch_one() {
        let client = client(MockExecutor::new().with_rows(user_rows(1)));
        let query = table("users").where_(("id", 1));

        let user: User = query.fetch_one(&client).await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT * FROM users WHERE id = ? LIMIT 1"
        );
        assert_eq!(query.limit_value(), None);
    }

    #[tokio::test]
    async fn test_fetch_one_without_rows() {
        let client = client(MockExecutor::new().with_rows(user_rows(0)));
        let err = table("users")
            .where_(("id", 99))
            .fetch_one::<User, _>(&client)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_select_fetch_optional() {
        let client = client(
            MockExecutor::new()
                .with_rows(user_rows(1))
                .with_rows(user_rows(0)),
        );
        let query = table("users").where_(("id", 1));

        let found: Option<User> = query.fetch_optional(&client).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));

        let missing: Option<User> = query.fetch_optional(&client).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_count_ignores_paging_and_keeps_projections() {
        let client = client(MockExecutor::new().with_rows(count_rows(42)));
        let query = table("users")
            .select(("id", "name"))
            .where_(("age", op::GTE, 21))
            .order_by_asc("name")
            .limit(5)
            .offset(10);

        assert_eq!(query.count(&client).await.unwrap(), 42);
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT COUNT(*) FROM users WHERE age >= ?"
        );
        assert_eq!(query.projections(), &["id".to_string(), "name".to_string()]);
        assert_eq!(query.limit_value(), Some(5));
    }

    #[tokio::test]
    async fn test_count_failure_keeps_projections() {
        let client = client(MockExecutor::new().with_failure("connection reset"));
        let query = table("users").select("name");

        let err = query.count(&client).await.unwrap_err();
        match &err {
            Error::Execution { source, arg_count, .. } => {
                assert!(matches!(source.as_ref(), Error::Database(_)));
                assert_eq!(*arg_count, 0);
            }
            other => panic!("expected an execution error, got {:?}", other),
        }
        assert!(err.to_string().contains("SELECT COUNT(*) FROM users"));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(query.projections(), &["name".to_string()]);
    }

    #[tokio::test]
    async fn test_count_parses_text_scalar() {
        let client = client(MockExecutor::new().with_rows(ResultSet::new(
            vec!["COUNT(*)".to_string()],
            vec![vec![Value::from("17")]],
        )));
        assert_eq!(table("users").count(&client).await.unwrap(), 17);
    }

    #[tokio::test]
    async fn test_exists() {
        let client = client(
            MockExecutor::new()
                .with_rows(ResultSet::new(vec!["1".to_string()], vec![vec![Value::U8(1)]]))
                .with_rows(ResultSet::default()),
        );
        let query = table("users").where_(("email_address", "a@b.c"));

        assert!(query.exists(&client).await.unwrap());
        assert!(!query.exists(&client).await.unwrap());
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT 1 FROM users WHERE email_address = ? LIMIT 1"
        );
    }

    #[tokio::test]
    async fn test_last_uses_primary_key() {
        let client = client(MockExecutor::new().with_rows(user_rows(1)));
        let query = table("users");

        let user: User = query.last(&client).await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT * FROM users ORDER BY id DESC LIMIT 1"
        );
    }

    #[tokio::test]
    async fn test_last_inverts_ordering() {
        let client = client(
            MockExecutor::new()
                .with_rows(user_rows(1))
                .with_rows(ResultSet::new(
                    vec!["page".to_string()],
                    vec![vec![Value::from("/")]],
                )),
        );

        let query = table("users").order_by_asc("age").order_by("name", None);
        let _: User = query.last(&client).await.unwrap();
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT * FROM users ORDER BY age DESC, name DESC LIMIT 1"
        );
        assert_eq!(query.to_sql().unwrap(), "SELECT * FROM users ORDER BY age ASC, name");

        // no primary key marked: falls back to id
        let visit: Visit = table("visit").last(&client).await.unwrap();
        assert_eq!(visit.page, "/");
        assert_eq!(
            client.executor().calls()[1].sql,
            "SELECT * FROM visit ORDER BY id DESC LIMIT 1"
        );
    }

    #[tokio::test]
    async fn test_paginate() {
        let client = client(
            MockExecutor::new()
                .with_rows(count_rows(25))
                .with_rows(user_rows(5)),
        );
        let mut query = table("users").order_by_asc("id");

        let page: Page<User> = query.paginate(&client, 2, 10).await.unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.records.len(), 5);

        let calls = client.executor().calls();
        assert_eq!(calls[0].sql, "SELECT COUNT(*) FROM users");
        assert_eq!(
            calls[1].sql,
            "SELECT * FROM users ORDER BY id ASC LIMIT 10 OFFSET 10"
        );
        assert_eq!(query.offset_value(), Some(10));
    }

    #[tokio::test]
    async fn test_paginate_rejects_page_zero() {
        let client = client(MockExecutor::new());
        let mut query = table("users");

        let result: Result<Page<User>> = query.paginate(&client, 0, 10).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(client.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_paginate_rejects_offset_overflow() {
        let client = client(MockExecutor::new().with_rows(count_rows(1)));
        let mut query = table("users");

        let result: Result<Page<User>> = query.paginate(&client, u64::MAX, 2).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(client.executor().calls().is_empty());
        assert_eq!(query.offset_value(), None);
    }

    #[tokio::test]
    async fn test_update_execute() {
        let client = client(MockExecutor::new().with_affected(3));
        let query = table("users").where_(("age", op::LT, 18));

        let result = assert_ok!(
            query
                .update(&client, vec![("name", Value::from("minor")), ("age", Value::from(0))])
                .await
        );
        assert_eq!(result.rows_affected, 3);

        let calls = client.executor().calls();
        assert_eq!(calls[0].sql, "UPDATE users SET name = ?, age = ? WHERE age < ?");
        assert_eq!(calls[0].params, params!["minor", 0, 18]);
    }

    #[tokio::test]
    async fn test_update_requires_values() {
        let client = client(MockExecutor::new());
        let result = table("users")
            .update(&client, Vec::<(String, Value)>::new())
            .await;
        assert_err!(result);
        assert!(client.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_execute() {
        let client = client(MockExecutor::new().with_affected(1));
        table("users")
            .where_(("id", 7))
            .delete(&client)
            .await
            .unwrap();

        let calls = client.executor().calls();
        assert_eq!(calls[0].sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(calls[0].params, params![7]);
    }

    #[tokio::test]
    async fn test_create_table_and_insert() {
        let client = client(MockExecutor::new());
        client.create_table::<User>().await.unwrap();

        let user = User {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            age: 30,
        };
        client.insert(&user).await.unwrap();
        client
            .insert_batch(&[user.clone(), User::default()])
            .await
            .unwrap();
        client.insert_batch::<User>(&[]).await.unwrap();

        let calls = client.executor().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0].sql,
            "CREATE TABLE IF NOT EXISTS `users` (`id` UInt64 PRIMARY KEY, `name` String, \
             `email_address` String, `age` UInt32) ENGINE = MergeTree"
        );
        assert_eq!(
            calls[1].sql,
            "INSERT INTO `users` (`id`, `name`, `email_address`, `age`) VALUES (?, ?, ?, ?)"
        );
        assert_eq!(
            calls[1].params,
            params![1u64, "Ann", "ann@example.com", 30u8]
        );
        assert_eq!(calls[2].params.len(), 8);
    }

    #[tokio::test]
    async fn test_query_for_record() {
        let client = client(MockExecutor::new());
        let query = client.query_for::<User>().unwrap().where_(("id", 1));
        assert_eq!(query.to_sql().unwrap(), "SELECT * FROM users WHERE id = ?");
        assert_eq!(client.query().to_sql().unwrap(), "SELECT *");
    }

    #[tokio::test]
    async fn test_aggregate_fetch_one_as_row() {
        let client = client(MockExecutor::new().with_rows(ResultSet::new(
            vec!["count".to_string(), "avg_age".to_string()],
            vec![vec![Value::U64(10), Value::F64(31.5)]],
        )));

        let row: Row = table("users")
            .where_(("active", true))
            .aggregate()
            .count("*")
            .avg("age")
            .fetch_one(&client)
            .await
            .unwrap();

        assert_eq!(row.get_u64("count"), Some(10));
        assert_eq!(row.get_f64("avg_age"), Some(31.5));
        assert_eq!(
            client.executor().calls()[0].sql,
            "SELECT COUNT(*) AS count, AVG(age) AS avg_age FROM users WHERE active = ? LIMIT 1"
        );
    }

    #[tokio::test]
    async fn test_aggregate_without_expressions_fails() {
        let client = client(MockExecutor::new());
        let result: Result<Vec<Row>> = table("users").aggregate().fetch_all(&client).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(client.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_raw_passthroughs() {
        let client = client(
            MockExecutor::new()
                .with_rows(user_rows(2))
                .with_rows(user_rows(1))
                .with_affected(0),
        );

        let users: Vec<User> = client
            .fetch_all("SELECT * FROM users WHERE age > ?", params![1])
            .await
            .unwrap();
        assert_eq!(users.len(), 2);

        let row: Row = client
            .fetch_one("SELECT * FROM users LIMIT 1", params![])
            .await
            .unwrap();
        assert_eq!(row.get_string("name"), Some("user1".to_string()));

        client.execute("OPTIMIZE TABLE users FINAL", params![]).await.unwrap();
        assert_eq!(client.executor().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_strict_coercion_from_config() {
        let config = Config {
            strict_coercion: true,
            ..Config::default()
        };
        let executor = MockExecutor::new().with_rows(ResultSet::new(
            vec!["age".to_string()],
            vec![vec![Value::from("old")]],
        ));
        let client = Client::new(executor, config);

        let result: Result<Vec<User>> = table("users").fetch_all(&client).await;
        assert!(matches!(result, Err(Error::Coercion { .. })));
    }
}
