//! SQL comparison operators and conversions

use std::borrow::Cow;
use std::fmt::{self, Display};

use crate::{Error, Result};

/// Type-safe SQL operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    symbol: Cow<'static, str>,
    known: bool,
}

impl Operator {
    pub const GT: Self = Operator::custom(">");
    pub const LT: Self = Operator::custom("<");
    pub const EQ: Self = Operator::custom("=");
    pub const NEQ: Self = Operator::custom("!=");
    pub const GTE: Self = Operator::custom(">=");
    pub const LTE: Self = Operator::custom("<=");
    pub const LIKE: Self = Operator::custom("LIKE");
    pub const NOT_LIKE: Self = Operator::custom("NOT LIKE");
    pub const ILIKE: Self = Operator::custom("ILIKE");
    pub const IN: Self = Operator::custom("IN");
    pub const NOT_IN: Self = Operator::custom("NOT IN");
    pub const GLOBAL_IN: Self = Operator::custom("GLOBAL IN");

    /// Create a custom operator for engine-specific operations
    ///
    /// # Examples
    /// ```
    /// use chorm_core::Operator;
    ///
    /// let not_ilike = Operator::custom("NOT ILIKE");
    /// assert_eq!(not_ilike.as_str(), "NOT ILIKE");
    /// ```
    pub const fn custom(op: &'static str) -> Self {
        Operator {
            symbol: Cow::Borrowed(op),
            known: true,
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &str {
        &self.symbol
    }

    /// Whether the right-hand side is a parenthesized list
    pub fn takes_list(&self) -> bool {
        matches!(self.as_str(), "IN" | "NOT IN" | "GLOBAL IN")
    }

    /// Reject operators that were given as unrecognized strings
    pub fn validate(&self) -> Result<()> {
        if self.known {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Unknown operator '{}'. Use Operator constants or Operator::custom for engine-specific operators",
                self.symbol
            )))
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

/// Strings map onto the known operators; anything else fails validation at render time
impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        match self.trim().to_uppercase().as_str() {
            ">" => Operator::GT,
            "<" => Operator::LT,
            "=" | "==" => Operator::EQ,
            "!=" | "<>" => Operator::NEQ,
            ">=" => Operator::GTE,
            "<=" => Operator::LTE,
            "LIKE" => Operator::LIKE,
            "NOT LIKE" => Operator::NOT_LIKE,
            "ILIKE" => Operator::ILIKE,
            "IN" => Operator::IN,
            "NOT IN" => Operator::NOT_IN,
            "GLOBAL IN" => Operator::GLOBAL_IN,
            _ => Operator {
                symbol: Cow::Owned(self.to_string()),
                known: false,
            },
        }
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const ILIKE: Operator = Operator::ILIKE;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
    pub const GLOBAL_IN: Operator = Operator::GLOBAL_IN;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), ">");
        assert_eq!(Operator::EQ.as_str(), "=");
        assert_eq!(Operator::NOT_IN.as_str(), "NOT IN");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(">".into_operator(), Operator::GT);
        assert_eq!("like".into_operator(), Operator::LIKE);
        assert_eq!("not in".into_operator(), Operator::NOT_IN);
        assert_eq!("<>".into_operator(), Operator::NEQ);
    }

    #[test]
    fn test_unknown_operator_fails_validation() {
        let op = "INVALID".into_operator();
        let err = op.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown operator 'INVALID'"));
        assert!(Operator::custom("@@").validate().is_ok());
    }

    #[test]
    fn test_list_operators() {
        assert!(Operator::IN.takes_list());
        assert!(Operator::GLOBAL_IN.takes_list());
        assert!(!Operator::EQ.takes_list());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GTE), ">=");
    }
}
