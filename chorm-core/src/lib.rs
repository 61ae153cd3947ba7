//! chorm core - query building and record mapping for ClickHouse
//!
//! Statements are assembled with fluent builders whose placeholders always line
//! up with their arguments. Record types describe their table through the
//! [`record!`] macro, and result sets are materialized back into them.
//!
//! ```
//! use chorm_core::{op, table, QueryBuilder};
//!
//! let query = table("events")
//!     .select(("user_id", "kind"))
//!     .where_(("kind", op::IN, vec!["click", "view"]))
//!     .where_raw("ts > now() - INTERVAL ? DAY", [7])
//!     .limit(100);
//!
//! assert_eq!(
//!     query.to_sql().unwrap(),
//!     "SELECT user_id, kind FROM events WHERE kind IN (?, ?) AND ts > now() - INTERVAL ? DAY LIMIT 100"
//! );
//! assert_eq!(query.parameters().unwrap().len(), 3);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod materialize;
pub mod operator;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use builder::{
    count_placeholders, Aggregate, AggregateExpr, DeleteStatement, Fragment, InsertStatement,
    IntoColumns, IntoCondition, IntoUpdateData, JoinClause, JoinType, OrderByClause, Predicate,
    Query, QueryBuilder, SortDirection, Statement, UpdateStatement, Window, WindowExpr,
};
pub use config::Config;
pub use error::{Error, Result};
pub use executor::{Client, ExecResult, Executor};
pub use mapper::coerce::FieldValue;
pub use mapper::record::{FieldMeta, Record};
pub use mapper::types::{column_type, Engine, Kind};
pub use mapper::{CoercionPolicy, FieldDescriptor, Mapper, TableDescriptor};
pub use materialize::{materialize_all, FromRow, Page, ResultSet, Row};
pub use operator::{op, IntoOperator, Operator};
pub use value::Value;

#[cfg(feature = "mysql")]
pub use executor::mysql::MySqlExecutor;

/// Start a query over the given table
pub fn table(name: &str) -> Query {
    Query::new().table(name)
}
