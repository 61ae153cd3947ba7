//! Window-function projections

use super::select::Query;

/// A window function with its OVER clause and alias
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowExpr {
    pub function: Option<String>,
    pub over: Option<String>,
    pub alias: Option<String>,
}

impl WindowExpr {
    /// Rendered expression, or `None` while no function is chosen
    pub fn build(&self) -> Option<String> {
        let mut expr = self.function.clone()?;

        if let Some(over) = &self.over {
            expr.push(' ');
            expr.push_str(over);
        }

        if let Some(alias) = &self.alias {
            expr.push_str(" AS ");
            expr.push_str(alias);
        }

        Some(expr)
    }
}

/// Builds one window-function projection for a query
///
/// Each function selector replaces the previous one.
///
/// # Examples
/// ```
/// use chorm_core::table;
///
/// let query = table("orders")
///     .select(("user_id", "total"))
///     .window()
///     .row_number()
///     .over("user_id", "created DESC")
///     .alias("row_num")
///     .add_to_query();
///
/// assert_eq!(
///     query.projections().last().map(String::as_str),
///     Some("ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY created DESC) AS row_num")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Window {
    query: Query,
    expr: WindowExpr,
}

impl Window {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            expr: WindowExpr::default(),
        }
    }

    fn function(mut self, function: String) -> Self {
        self.expr.function = Some(function);
        self
    }

    pub fn row_number(self) -> Self {
        self.function("ROW_NUMBER()".to_string())
    }

    pub fn rank(self) -> Self {
        self.function("RANK()".to_string())
    }

    pub fn dense_rank(self) -> Self {
        self.function("DENSE_RANK()".to_string())
    }

    pub fn lag(self, field: &str, offset: i64) -> Self {
        self.function(format!("LAG({}, {})", field, offset))
    }

    pub fn lead(self, field: &str, offset: i64) -> Self {
        self.function(format!("LEAD({}, {})", field, offset))
    }

    pub fn first_value(self, field: &str) -> Self {
        self.function(format!("FIRST_VALUE({})", field))
    }

    pub fn last_value(self, field: &str) -> Self {
        self.function(format!("LAST_VALUE({})", field))
    }

    pub fn nth_value(self, field: &str, n: u64) -> Self {
        self.function(format!("NTH_VALUE({}, {})", field, n))
    }

    pub fn ntile(self, buckets: u64) -> Self {
        self.function(format!("NTILE({})", buckets))
    }

    pub fn percent_rank(self) -> Self {
        self.function("PERCENT_RANK()".to_string())
    }

    pub fn cume_dist(self) -> Self {
        self.function("CUME_DIST()".to_string())
    }

    /// Set the OVER clause; empty parts are left out, and both empty drops OVER
    pub fn over(mut self, partition_by: &str, order_by: &str) -> Self {
        let mut parts = Vec::new();
        if !partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", partition_by));
        }
        if !order_by.is_empty() {
            parts.push(format!("ORDER BY {}", order_by));
        }

        self.expr.over = if parts.is_empty() {
            None
        } else {
            Some(format!("OVER ({})", parts.join(" ")))
        };
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.expr.alias = Some(alias.to_string());
        self
    }

    pub fn expr(&self) -> &WindowExpr {
        &self.expr
    }

    pub fn build(&self) -> Option<String> {
        self.expr.build()
    }

    /// Append the expression to the query's projections; no-op without a function
    pub fn add_to_query(self) -> Query {
        let mut query = self.query;
        if let Some(expr) = self.expr.build() {
            query.projections.push(expr);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, QueryBuilder};

    #[test]
    fn test_ranking_functions() {
        let window = table("t").window();
        assert_eq!(window.clone().row_number().build().unwrap(), "ROW_NUMBER()");
        assert_eq!(window.clone().rank().build().unwrap(), "RANK()");
        assert_eq!(window.clone().dense_rank().build().unwrap(), "DENSE_RANK()");
        assert_eq!(window.clone().percent_rank().build().unwrap(), "PERCENT_RANK()");
        assert_eq!(window.clone().cume_dist().build().unwrap(), "CUME_DIST()");
        assert_eq!(window.ntile(4).build().unwrap(), "NTILE(4)");
    }

    #[test]
    fn test_value_functions() {
        let window = table("t").window();
        assert_eq!(window.clone().lag("price", 1).build().unwrap(), "LAG(price, 1)");
        assert_eq!(window.clone().lead("price", 2).build().unwrap(), "LEAD(price, 2)");
        assert_eq!(
            window.clone().first_value("price").build().unwrap(),
            "FIRST_VALUE(price)"
        );
        assert_eq!(
            window.clone().last_value("price").build().unwrap(),
            "LAST_VALUE(price)"
        );
        assert_eq!(
            window.nth_value("price", 3).build().unwrap(),
            "NTH_VALUE(price, 3)"
        );
    }

    #[test]
    fn test_function_selectors_overwrite() {
        let window = table("t").window().rank().lag("x", 1).row_number();
        assert_eq!(window.build().unwrap(), "ROW_NUMBER()");
    }

    #[test]
    fn test_over_clause_variants() {
        let both = table("t").window().rank().over("user_id", "ts DESC");
        assert_eq!(
            both.build().unwrap(),
            "RANK() OVER (PARTITION BY user_id ORDER BY ts DESC)"
        );

        let partition = table("t").window().rank().over("user_id", "");
        assert_eq!(partition.build().unwrap(), "RANK() OVER (PARTITION BY user_id)");

        let order = table("t").window().rank().over("", "ts");
        assert_eq!(order.build().unwrap(), "RANK() OVER (ORDER BY ts)");

        let neither = table("t").window().rank().over("", "").alias("r");
        assert_eq!(neither.build().unwrap(), "RANK() AS r");
    }

    #[test]
    fn test_build_without_function() {
        let window = table("t").window().over("a", "b").alias("x");
        assert_eq!(window.build(), None);

        let query = window.add_to_query();
        assert_eq!(query.to_sql().unwrap(), "SELECT * FROM t");
    }

    #[test]
    fn test_add_to_query_appends_projection() {
        let query = table("orders")
            .select("user_id")
            .window()
            .dense_rank()
            .over("region", "total DESC")
            .alias("pos")
            .add_to_query();
        assert_eq!(
            query.to_sql().unwrap(),
            "SELECT user_id, DENSE_RANK() OVER (PARTITION BY region ORDER BY total DESC) AS pos FROM orders"
        );
    }
}
