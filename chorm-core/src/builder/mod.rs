//! Statement builders

pub mod aggregate;
pub mod common;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
pub mod window;

// Re-export types from submodules
pub use aggregate::{Aggregate, AggregateExpr};
pub use common::{
    count_placeholders, Fragment, IntoColumns, IntoCondition, JoinClause, JoinType,
    OrderByClause, Predicate, QueryBuilder, SortDirection, Statement,
};
pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::Query;
pub use update::{IntoUpdateData, UpdateStatement};
pub use window::{Window, WindowExpr};
