//! Value types for statement parameters and result cells

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A loosely-typed scalar passed to or read from the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// String value
    String(String),
    /// Timestamp without a time zone, as ClickHouse `DateTime` returns it
    DateTime(NaiveDateTime),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the ClickHouse type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Nullable(Nothing)",
            Value::Bool(_) => "Boolean",
            Value::I8(_) => "Int8",
            Value::I16(_) => "Int16",
            Value::I32(_) => "Int32",
            Value::I64(_) => "Int64",
            Value::U8(_) => "UInt8",
            Value::U16(_) => "UInt16",
            Value::U32(_) => "UInt32",
            Value::U64(_) => "UInt64",
            Value::F32(_) => "Float32",
            Value::F64(_) => "Float64",
            Value::String(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::Array(_) => "Array",
        }
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload as `i64`; unsigned values are reinterpreted bit-for-bit
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            Value::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Integer payload as `u64`; signed values are reinterpreted bit-for-bit
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::I8(v) => Some(v as u64),
            Value::I16(v) => Some(v as u64),
            Value::I32(v) => Some(v as u64),
            Value::I64(v) => Some(v as u64),
            Value::U8(v) => Some(v as u64),
            Value::U16(v) => Some(v as u64),
            Value::U32(v) => Some(v as u64),
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric payload as `f64`, including integers
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            Value::U64(v) => Some(v as f64),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Number, Value as Json};

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
                Json::Number(Number::from(self.as_i64().unwrap_or_default()))
            }
            Value::U8(_) | Value::U16(_) | Value::U32(_) | Value::U64(_) => {
                Json::Number(Number::from(self.as_u64().unwrap_or_default()))
            }
            Value::F32(f) => Number::from_f64(*f as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::F64(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Array(arr) => Json::Array(arr.iter().map(Value::to_json).collect()),
        }
    }
}

/// Build a `Vec<Value>` of positional arguments from heterogeneous expressions
///
/// # Examples
/// ```
/// use chorm_core::params;
///
/// let args = params![18, "active"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i8> for Value {
    fn from(val: i8) -> Self {
        Value::I8(val)
    }
}

impl From<i16> for Value {
    fn from(val: i16) -> Self {
        Value::I16(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<isize> for Value {
    fn from(val: isize) -> Self {
        Value::I64(val as i64)
    }
}

impl From<u8> for Value {
    fn from(val: u8) -> Self {
        Value::U8(val)
    }
}

impl From<u16> for Value {
    fn from(val: u16) -> Self {
        Value::U16(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::U32(val)
    }
}

impl From<u64> for Value {
    fn from(val: u64) -> Self {
        Value::U64(val)
    }
}

impl From<usize> for Value {
    fn from(val: usize) -> Self {
        Value::U64(val as u64)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(val: NaiveDateTime) -> Self {
        Value::DateTime(val)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(val: DateTime<Utc>) -> Self {
        Value::DateTime(val.naive_utc())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(vals: Vec<T>) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(vals: &[T]) -> Self {
        Value::Array(vals.iter().cloned().map(|v| v.into()).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
