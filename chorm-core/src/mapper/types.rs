//! Column types, table engines, and the scalar kinds fields are classified into

use std::borrow::Cow;
use std::fmt::{self, Display};

/// ClickHouse column type names
pub mod column_type {
    pub const UINT8: &str = "UInt8";
    pub const UINT16: &str = "UInt16";
    pub const UINT32: &str = "UInt32";
    pub const UINT64: &str = "UInt64";
    pub const INT8: &str = "Int8";
    pub const INT16: &str = "Int16";
    pub const INT32: &str = "Int32";
    pub const INT64: &str = "Int64";
    pub const FLOAT32: &str = "Float32";
    pub const FLOAT64: &str = "Float64";
    pub const STRING: &str = "String";
    pub const FIXED_STRING: &str = "FixedString";
    pub const DATE: &str = "Date";
    pub const DATE_TIME: &str = "DateTime";
    pub const DATE_TIME64: &str = "DateTime64";
    pub const BOOLEAN: &str = "Boolean";
    pub const UUID: &str = "UUID";
    pub const IPV4: &str = "IPv4";
    pub const IPV6: &str = "IPv6";
    pub const DECIMAL: &str = "Decimal";
    pub const LOW_CARDINALITY: &str = "LowCardinality";
}

/// Table engine named in the `ENGINE =` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine(Cow<'static, str>);

impl Engine {
    pub const MERGE_TREE: Self = Engine::custom("MergeTree");
    pub const REPLACING_MERGE_TREE: Self = Engine::custom("ReplacingMergeTree");
    pub const SUMMING_MERGE_TREE: Self = Engine::custom("SummingMergeTree");
    pub const AGGREGATING_MERGE_TREE: Self = Engine::custom("AggregatingMergeTree");
    pub const COLLAPSING_MERGE_TREE: Self = Engine::custom("CollapsingMergeTree");
    pub const VERSIONED_COLLAPSING_MERGE_TREE: Self =
        Engine::custom("VersionedCollapsingMergeTree");
    pub const GRAPHITE_MERGE_TREE: Self = Engine::custom("GraphiteMergeTree");
    pub const LOG: Self = Engine::custom("Log");
    pub const TINY_LOG: Self = Engine::custom("TinyLog");
    pub const STRIPE_LOG: Self = Engine::custom("StripeLog");
    pub const MEMORY: Self = Engine::custom("Memory");
    pub const DISTRIBUTED: Self = Engine::custom("Distributed");

    /// Engine not covered by the constants, e.g. `"ReplicatedMergeTree('/path', '{replica}')"`
    pub const fn custom(name: &'static str) -> Self {
        Engine(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::MERGE_TREE
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Engine {
    fn from(name: String) -> Self {
        Engine(Cow::Owned(name))
    }
}

impl From<&'static str> for Engine {
    fn from(name: &'static str) -> Self {
        Engine::custom(name)
    }
}

/// Scalar kind of a record field, as seen by schema inference and coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    IntSize,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UIntSize,
    Float32,
    Float64,
    String,
    DateTime,
    Uuid,
    Array(Box<Kind>),
    Nullable(Box<Kind>),
    Other,
}

impl Kind {
    /// Inferred column type; nullability is tracked on the field, not here
    pub fn column_type(&self) -> String {
        use column_type::*;

        match self {
            Kind::Bool => BOOLEAN.to_string(),
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::IntSize => INT32.to_string(),
            Kind::Int64 => INT64.to_string(),
            Kind::UInt8 | Kind::UInt16 | Kind::UInt32 | Kind::UIntSize => UINT32.to_string(),
            Kind::UInt64 => UINT64.to_string(),
            Kind::Float32 => FLOAT32.to_string(),
            Kind::Float64 => FLOAT64.to_string(),
            Kind::String | Kind::Other => STRING.to_string(),
            Kind::DateTime => DATE_TIME.to_string(),
            Kind::Uuid => UUID.to_string(),
            Kind::Array(inner) => match inner.as_ref() {
                Kind::Nullable(element) => format!("Array(Nullable({}))", element.column_type()),
                element => format!("Array({})", element.column_type()),
            },
            Kind::Nullable(inner) => inner.column_type(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Kind::Nullable(_))
    }

    /// Strip one level of `Nullable`
    pub fn non_null(&self) -> &Kind {
        match self {
            Kind::Nullable(inner) => inner,
            other => other,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Nullable(inner) => write!(f, "Nullable({})", inner),
            other => f.write_str(&other.column_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_inference() {
        assert_eq!(Kind::Int8.column_type(), "Int32");
        assert_eq!(Kind::IntSize.column_type(), "Int32");
        assert_eq!(Kind::Int64.column_type(), "Int64");
        assert_eq!(Kind::UInt16.column_type(), "UInt32");
        assert_eq!(Kind::UInt64.column_type(), "UInt64");
        assert_eq!(Kind::Bool.column_type(), "Boolean");
        assert_eq!(Kind::Other.column_type(), "String");
        assert_eq!(
            Kind::Array(Box::new(Kind::Float32)).column_type(),
            "Array(Float32)"
        );
        assert_eq!(
            Kind::Nullable(Box::new(Kind::DateTime)).column_type(),
            "DateTime"
        );
        assert_eq!(
            Kind::Array(Box::new(Kind::Nullable(Box::new(Kind::String)))).column_type(),
            "Array(Nullable(String))"
        );
    }

    #[test]
    fn test_engine_display() {
        assert_eq!(Engine::default().to_string(), "MergeTree");
        assert_eq!(Engine::from("Memory".to_string()), Engine::MEMORY);
    }
}
