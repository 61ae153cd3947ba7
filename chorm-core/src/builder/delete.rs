//! DELETE statement builder

use super::common::{render_conjunction, IntoCondition, Predicate, QueryBuilder, Statement};
use crate::Result;

/// DELETE statement; without predicates it removes every row
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table_name: String,
    predicates: Vec<Predicate>,
}

impl DeleteStatement {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            predicates: Vec::new(),
        }
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

impl QueryBuilder for DeleteStatement {
    fn render(&self) -> Result<Statement> {
        let mut sql = format!("DELETE FROM {}", self.table_name);
        let mut params = Vec::new();

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            render_conjunction(&self.predicates, &mut sql, &mut params)?;
        }

        Ok(Statement { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{op, params};

    #[test]
    fn test_delete_builder() {
        let statement = DeleteStatement::new("users").where_(("age", op::LT, 18));
        assert_eq!(statement.to_sql().unwrap(), "DELETE FROM users WHERE age < ?");
        assert_eq!(statement.parameters().unwrap(), params![18]);
    }

    #[test]
    fn test_delete_multiple_conditions() {
        let statement = DeleteStatement::new("users")
            .where_(("age", op::LT, 18))
            .where_(("status", "inactive"));
        assert_eq!(
            statement.to_sql().unwrap(),
            "DELETE FROM users WHERE age < ? AND status = ?"
        );
    }

    #[test]
    fn test_delete_everything() {
        let statement = DeleteStatement::new("sessions");
        assert_eq!(statement.to_sql().unwrap(), "DELETE FROM sessions");
    }
}
