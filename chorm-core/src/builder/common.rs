//! Common types and traits shared across all statement builders

use std::fmt;
use std::str::FromStr;

use crate::{Error, IntoOperator, Operator, Result, Value};

/// A rendered statement: SQL text plus the arguments for its `?` markers
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Core trait for all statement builders
pub trait QueryBuilder {
    /// Render SQL text and positional arguments in one pass
    fn render(&self) -> Result<Statement>;

    /// Generate the SQL query string
    fn to_sql(&self) -> Result<String> {
        Ok(self.render()?.sql)
    }

    /// Get the parameters for the query, in placeholder order
    fn parameters(&self) -> Result<Vec<Value>> {
        Ok(self.render()?.params)
    }
}

/// Count `?` markers outside of quoted literals and identifiers
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    let mut chars = sql.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(_) if c == '\\' => {
                // escaped character inside a literal
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }

    count
}

/// A piece of SQL text that owns the arguments for its own placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub args: Vec<Value>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            args,
        }
    }

    /// Fragment without arguments
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    fn render(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<()> {
        let markers = count_placeholders(&self.text);
        if markers != self.args.len() {
            return Err(Error::validation(format!(
                "'{}' has {} placeholder(s) but {} argument(s)",
                self.text,
                markers,
                self.args.len()
            )));
        }

        sql.push_str(&self.text);
        params.extend(self.args.iter().cloned());
        Ok(())
    }
}

/// Trait for conditions that can be used in WHERE and HAVING clauses
pub trait IntoCondition {
    fn into_condition(self) -> (String, Operator, Value);
}

// Implementation for shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), Operator::EQ, self.1.into())
    }
}

// Implementation for explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), self.1.into_operator(), self.2.into())
    }
}

/// A boolean filter joined to its siblings with AND
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column operator ?`
    Compare {
        column: String,
        operator: Operator,
        value: Value,
    },
    /// Free-form condition with `?` markers
    Raw(Fragment),
}

impl Predicate {
    pub fn compare<C: IntoCondition>(condition: C) -> Self {
        let (column, operator, value) = condition.into_condition();
        Predicate::Compare {
            column,
            operator,
            value,
        }
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<()> {
        match self {
            Predicate::Compare {
                column,
                operator,
                value,
            } => {
                operator.validate()?;

                sql.push_str(column);
                sql.push(' ');
                sql.push_str(operator.as_str());

                match value {
                    Value::Array(items) if operator.takes_list() => {
                        if items.is_empty() {
                            return Err(Error::validation(format!(
                                "{} {} requires at least one value",
                                column, operator
                            )));
                        }
                        sql.push_str(" (");
                        sql.push_str(&placeholders(items.len()));
                        sql.push(')');
                        params.extend(items.iter().cloned());
                    }
                    _ => {
                        sql.push_str(" ?");
                        params.push(value.clone());
                    }
                }
                Ok(())
            }
            Predicate::Raw(fragment) => fragment.render(sql, params),
        }
    }
}

/// Render a list of predicates joined with AND
pub(crate) fn render_conjunction(
    predicates: &[Predicate],
    sql: &mut String,
    params: &mut Vec<Value>,
) -> Result<()> {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        predicate.render(sql, params)?;
    }
    Ok(())
}

/// `?, ?, ?` for `n` markers
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// JOIN types
#[derive(Debug, Clone, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
            JoinType::Full => write!(f, "FULL OUTER"),
        }
    }
}

/// A complete JOIN clause; the ON condition carries its own arguments
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub on: Fragment,
}

impl JoinClause {
    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<()> {
        sql.push_str(&format!("{} JOIN {} ON ", self.join_type, self.table));
        self.on.render(sql, params)
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn inverted(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(Error::validation(format!(
                "Unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// An ORDER BY entry; a missing direction leaves the engine default
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: Option<SortDirection>,
}

impl OrderByClause {
    /// The same column sorted the opposite way; no direction becomes DESC
    pub fn inverted(&self) -> Self {
        Self {
            column: self.column.clone(),
            direction: Some(
                self.direction
                    .map(SortDirection::inverted)
                    .unwrap_or(SortDirection::Desc),
            ),
        }
    }
}

impl fmt::Display for OrderByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "{} {}", self.column, direction),
            None => write!(f, "{}", self.column),
        }
    }
}

/// Column lists accepted by `select` and `group_by`
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: AsRef<str>> IntoColumns for Vec<S> {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoColumns for [S; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

macro_rules! tuple_columns {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(
            impl IntoColumns for ($(tuple_columns!(@column $name),)+) {
                fn into_columns(self) -> Vec<String> {
                    let ($($name,)+) = self;
                    vec![$($name.to_string()),+]
                }
            }
        )+
    };
    (@column $name:ident) => { &str };
}

tuple_columns! {
    (a, b),
    (a, b, c),
    (a, b, c, d),
    (a, b, c, d, e),
    (a, b, c, d, e, f),
}
