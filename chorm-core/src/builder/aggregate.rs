//! Aggregate projections with deterministic aliases

use std::fmt;

use super::select::Query;
use crate::{Error, Result};

/// One `FUNCTION(operands) AS alias` projection
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub function: String,
    pub operands: String,
    pub alias: String,
}

impl AggregateExpr {
    fn new(function: impl Into<String>, operands: impl Into<String>, alias: String) -> Self {
        Self {
            function: function.into(),
            operands: operands.into(),
            alias,
        }
    }
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) AS {}", self.function, self.operands, self.alias)
    }
}

/// Collects aggregate expressions for a query
///
/// # Examples
/// ```
/// use chorm_core::{table, QueryBuilder};
///
/// let query = table("scores")
///     .group_by("player")
///     .aggregate()
///     .count("*")
///     .quantile(0.95, "score")
///     .into_query()
///     .unwrap();
///
/// assert_eq!(
///     query.to_sql().unwrap(),
///     "SELECT COUNT(*) AS count, quantile(0.950000)(score) AS quantile_0.950000_score FROM scores GROUP BY player"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Aggregate {
    query: Query,
    expressions: Vec<AggregateExpr>,
}

impl Aggregate {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            expressions: Vec::new(),
        }
    }

    pub fn expressions(&self) -> &[AggregateExpr] {
        &self.expressions
    }

    fn push(mut self, expr: AggregateExpr) -> Self {
        self.expressions.push(expr);
        self
    }

    fn unary(self, function: &str, prefix: &str, field: &str) -> Self {
        self.push(AggregateExpr::new(
            function,
            field,
            format!("{}_{}", prefix, field),
        ))
    }

    fn binary(self, function: &str, prefix: &str, a: &str, b: &str) -> Self {
        self.push(AggregateExpr::new(
            function,
            format!("{}, {}", a, b),
            format!("{}_{}_{}", prefix, a, b),
        ))
    }

    pub fn sum(self, field: &str) -> Self {
        self.unary("SUM", "sum", field)
    }

    pub fn avg(self, field: &str) -> Self {
        self.unary("AVG", "avg", field)
    }

    pub fn min(self, field: &str) -> Self {
        self.unary("MIN", "min", field)
    }

    pub fn max(self, field: &str) -> Self {
        self.unary("MAX", "max", field)
    }

    /// `COUNT(*) AS count` for `"*"` or an empty field, else `COUNT(f) AS count_f`
    pub fn count(self, field: &str) -> Self {
        if field.is_empty() || field == "*" {
            self.push(AggregateExpr::new("COUNT", "*", "count".to_string()))
        } else {
            self.unary("COUNT", "count", field)
        }
    }

    pub fn count_distinct(self, field: &str) -> Self {
        self.push(AggregateExpr::new(
            "COUNT",
            format!("DISTINCT {}", field),
            format!("count_distinct_{}", field),
        ))
    }

    pub fn uniq(self, field: &str) -> Self {
        self.unary("uniq", "uniq", field)
    }

    pub fn uniq_exact(self, field: &str) -> Self {
        self.unary("uniqExact", "uniq_exact", field)
    }

    /// Level is written with six fractional digits in both expression and alias
    pub fn quantile(self, level: f64, field: &str) -> Self {
        let level = format!("{:.6}", level);
        self.push(AggregateExpr::new(
            format!("quantile({})", level),
            field,
            format!("quantile_{}_{}", level, field),
        ))
    }

    pub fn median(self, field: &str) -> Self {
        self.unary("median", "median", field)
    }

    pub fn stddev(self, field: &str) -> Self {
        self.unary("stddev", "stddev", field)
    }

    pub fn variance(self, field: &str) -> Self {
        self.unary("varSamp", "variance", field)
    }

    pub fn any(self, field: &str) -> Self {
        self.unary("any", "any", field)
    }

    pub fn arg_min(self, arg: &str, value: &str) -> Self {
        self.binary("argMin", "argmin", arg, value)
    }

    pub fn arg_max(self, arg: &str, value: &str) -> Self {
        self.binary("argMax", "argmax", arg, value)
    }

    pub fn group_array(self, field: &str) -> Self {
        self.unary("groupArray", "group_array", field)
    }

    pub fn group_uniq_array(self, field: &str) -> Self {
        self.unary("groupUniqArray", "group_uniq_array", field)
    }

    pub fn top_k(self, k: u32, field: &str) -> Self {
        self.push(AggregateExpr::new(
            format!("topK({})", k),
            field,
            format!("topk_{}_{}", k, field),
        ))
    }

    pub fn top_k_weighted(self, k: u32, field: &str, weight: &str) -> Self {
        self.push(AggregateExpr::new(
            format!("topKWeighted({})", k),
            format!("{}, {}", field, weight),
            format!("topk_weighted_{}_{}_{}", k, field, weight),
        ))
    }

    pub fn histogram(self, bins: u32, field: &str) -> Self {
        self.push(AggregateExpr::new(
            format!("histogram({})", bins),
            field,
            format!("histogram_{}_{}", bins, field),
        ))
    }

    pub fn corr(self, x: &str, y: &str) -> Self {
        self.binary("corr", "corr", x, y)
    }

    pub fn covar_pop(self, x: &str, y: &str) -> Self {
        self.binary("covarPop", "covar_pop", x, y)
    }

    pub fn covar_samp(self, x: &str, y: &str) -> Self {
        self.binary("covarSamp", "covar_samp", x, y)
    }

    pub fn skew_pop(self, field: &str) -> Self {
        self.unary("skewPop", "skew_pop", field)
    }

    pub fn kurt_pop(self, field: &str) -> Self {
        self.unary("kurtPop", "kurt_pop", field)
    }

    pub fn entropy(self, field: &str) -> Self {
        self.unary("entropy", "entropy", field)
    }

    pub fn geometric_mean(self, field: &str) -> Self {
        self.unary("geometricMean", "geometric_mean", field)
    }

    pub fn harmonic_mean(self, field: &str) -> Self {
        self.unary("harmonicMean", "harmonic_mean", field)
    }

    /// The query with its projections replaced by the aggregate expressions
    pub fn into_query(self) -> Result<Query> {
        if self.expressions.is_empty() {
            return Err(Error::validation("no aggregations specified"));
        }

        let mut query = self.query;
        query.projections = self.expressions.iter().map(ToString::to_string).collect();
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{table, QueryBuilder};

    fn projections(aggregate: Aggregate) -> Vec<String> {
        aggregate.into_query().unwrap().projections().to_vec()
    }

    #[test]
    fn test_basic_aggregates() {
        let exprs = projections(
            table("t")
                .aggregate()
                .sum("amount")
                .avg("amount")
                .min("ts")
                .max("ts")
                .count("id")
                .count("")
                .count_distinct("user_id"),
        );
        assert_eq!(
            exprs,
            vec![
                "SUM(amount) AS sum_amount",
                "AVG(amount) AS avg_amount",
                "MIN(ts) AS min_ts",
                "MAX(ts) AS max_ts",
                "COUNT(id) AS count_id",
                "COUNT(*) AS count",
                "COUNT(DISTINCT user_id) AS count_distinct_user_id",
            ]
        );
    }

    #[test]
    fn test_clickhouse_aggregates() {
        let exprs = projections(
            table("t")
                .aggregate()
                .uniq("u")
                .uniq_exact("u")
                .quantile(0.5, "latency")
                .median("latency")
                .stddev("x")
                .variance("x")
                .any("name"),
        );
        assert_eq!(
            exprs,
            vec![
                "uniq(u) AS uniq_u",
                "uniqExact(u) AS uniq_exact_u",
                "quantile(0.500000)(latency) AS quantile_0.500000_latency",
                "median(latency) AS median_latency",
                "stddev(x) AS stddev_x",
                "varSamp(x) AS variance_x",
                "any(name) AS any_name",
            ]
        );
    }

    #[test]
    fn test_multi_operand_aggregates() {
        let exprs = projections(
            table("t")
                .aggregate()
                .arg_min("user", "ts")
                .arg_max("user", "ts")
                .group_array("tag")
                .group_uniq_array("tag")
                .top_k(5, "url")
                .top_k_weighted(3, "url", "hits")
                .histogram(10, "latency"),
        );
        assert_eq!(
            exprs,
            vec![
                "argMin(user, ts) AS argmin_user_ts",
                "argMax(user, ts) AS argmax_user_ts",
                "groupArray(tag) AS group_array_tag",
                "groupUniqArray(tag) AS group_uniq_array_tag",
                "topK(5)(url) AS topk_5_url",
                "topKWeighted(3)(url, hits) AS topk_weighted_3_url_hits",
                "histogram(10)(latency) AS histogram_10_latency",
            ]
        );
    }

    #[test]
    fn test_statistical_aggregates() {
        let exprs = projections(
            table("t")
                .aggregate()
                .corr("x", "y")
                .covar_pop("x", "y")
                .covar_samp("x", "y")
                .skew_pop("x")
                .kurt_pop("x")
                .entropy("x")
                .geometric_mean("x")
                .harmonic_mean("x"),
        );
        assert_eq!(
            exprs,
            vec![
                "corr(x, y) AS corr_x_y",
                "covarPop(x, y) AS covar_pop_x_y",
                "covarSamp(x, y) AS covar_samp_x_y",
                "skewPop(x) AS skew_pop_x",
                "kurtPop(x) AS kurt_pop_x",
                "entropy(x) AS entropy_x",
                "geometricMean(x) AS geometric_mean_x",
                "harmonicMean(x) AS harmonic_mean_x",
            ]
        );
    }

    #[test]
    fn test_quantile_alias_uses_six_digits() {
        let aggregate = table("t").aggregate().quantile(0.95, "score");
        assert_eq!(aggregate.expressions()[0].alias, "quantile_0.950000_score");
    }

    #[test]
    fn test_aggregate_keeps_query_clauses() {
        let query = table("events")
            .where_(("kind", "click"))
            .group_by("page")
            .aggregate()
            .count("*")
            .into_query()
            .unwrap();
        let statement = query.render().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT COUNT(*) AS count FROM events WHERE kind = ? GROUP BY page"
        );
        assert_eq!(statement.params.len(), 1);
    }

    #[test]
    fn test_empty_aggregate_fails() {
        let err = table("t").aggregate().into_query().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
