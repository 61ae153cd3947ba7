//! Best-effort conversion between `Value` cells and typed record fields

use chrono::{DateTime, NaiveDateTime, Utc};

use super::types::Kind;
use crate::Value;

/// A record field that can be read into a `Value` and assigned from one
///
/// `assign` returns `false` when the value has no sensible conversion into the
/// field's type; the field is left untouched in that case.
pub trait FieldValue {
    fn kind(&self) -> Kind;

    fn to_value(&self) -> Value;

    fn assign(&mut self, value: &Value) -> bool;
}

/// Text rendering of any non-null value
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::F32(f) => Some(f.to_string()),
        Value::F64(f) => Some(f.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        Value::Array(_) => Some(value.to_json().to_string()),
        Value::U64(v) => Some(v.to_string()),
        other => other.as_i64().map(|v| v.to_string()),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| text.parse::<i64>().ok().and_then(unix_seconds))
}

fn unix_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Array cells may arrive as JSON text from text-protocol transports
fn json_to_value(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::I64)
            .or_else(|| n.as_u64().map(Value::U64))
            .or_else(|| n.as_f64().map(Value::F64))
            .unwrap_or(Value::Null),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        Json::Object(_) => Value::String(json.to_string()),
    }
}

macro_rules! integer_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                // Widening, narrowing and sign changes wrap like `as` casts
                fn assign(&mut self, value: &Value) -> bool {
                    let parsed = match value {
                        Value::U64(v) => Some(*v as $ty),
                        Value::Bool(b) => Some(*b as $ty),
                        Value::String(s) => {
                            let s = s.trim();
                            s.parse::<i64>()
                                .map(|v| v as $ty)
                                .or_else(|_| s.parse::<u64>().map(|v| v as $ty))
                                .ok()
                        }
                        other => other.as_i64().map(|v| v as $ty),
                    };

                    match parsed {
                        Some(v) => {
                            *self = v;
                            true
                        }
                        None => false,
                    }
                }
            }
        )*
    };
}

integer_field! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => IntSize,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    usize => UIntSize,
}

macro_rules! float_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn assign(&mut self, value: &Value) -> bool {
                    let parsed = match value {
                        Value::String(s) => s.trim().parse::<f64>().ok(),
                        other => other.as_f64(),
                    };

                    match parsed {
                        Some(v) => {
                            *self = v as $ty;
                            true
                        }
                        None => false,
                    }
                }
            }
        )*
    };
}

float_field! {
    f32 => Float32,
    f64 => Float64,
}

impl FieldValue for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn assign(&mut self, value: &Value) -> bool {
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            other => other.as_i64().map(|v| v != 0),
        };

        match parsed {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }
}

impl FieldValue for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn assign(&mut self, value: &Value) -> bool {
        match value_to_text(value) {
            Some(text) => {
                *self = text;
                true
            }
            None => false,
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn kind(&self) -> Kind {
        Kind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn assign(&mut self, value: &Value) -> bool {
        let parsed = match value {
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => parse_datetime(s),
            other => other.as_i64().and_then(unix_seconds),
        };

        match parsed {
            Some(dt) => {
                *self = dt;
                true
            }
            None => false,
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind(&self) -> Kind {
        Kind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.naive_utc())
    }

    fn assign(&mut self, value: &Value) -> bool {
        let mut naive = self.naive_utc();
        if naive.assign(value) {
            *self = naive.and_utc();
            true
        } else {
            false
        }
    }
}

impl<T> FieldValue for Vec<T>
where
    T: FieldValue + Default,
{
    fn kind(&self) -> Kind {
        Kind::Array(Box::new(T::default().kind()))
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn assign(&mut self, value: &Value) -> bool {
        let decoded;
        let items = match value {
            Value::Array(items) => items,
            Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {
                Ok(json @ serde_json::Value::Array(_)) => {
                    decoded = json_to_value(&json);
                    match &decoded {
                        Value::Array(items) => items,
                        _ => return false,
                    }
                }
                _ => return false,
            },
            _ => return false,
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let mut element = T::default();
            if !element.assign(item) {
                return false;
            }
            out.push(element);
        }

        *self = out;
        true
    }
}

impl<T> FieldValue for Option<T>
where
    T: FieldValue + Default,
{
    fn kind(&self) -> Kind {
        let inner = match self {
            Some(v) => v.kind(),
            None => T::default().kind(),
        };
        Kind::Nullable(Box::new(inner))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn assign(&mut self, value: &Value) -> bool {
        if value.is_null() {
            *self = None;
            return true;
        }

        let mut inner = T::default();
        if inner.assign(value) {
            *self = Some(inner);
            true
        } else {
            false
        }
    }
}

#[cfg(feature = "uuid-support")]
impl FieldValue for uuid::Uuid {
    fn kind(&self) -> Kind {
        Kind::Uuid
    }

    fn to_value(&self) -> Value {
        Value::String(self.hyphenated().to_string())
    }

    fn assign(&mut self, value: &Value) -> bool {
        match value.as_str().map(|s| uuid::Uuid::parse_str(s.trim())) {
            Some(Ok(id)) => {
                *self = id;
                true
            }
            _ => false,
        }
    }
}
