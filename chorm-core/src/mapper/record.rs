//! The `Record` trait and the `record!` macro that implements it

use super::coerce::FieldValue;
use super::types::{Engine, Kind};

/// Field-level metadata declared for a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    pub field_name: &'static str,
    pub kind: Kind,
    pub column: Option<String>,
    pub column_type: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
}

impl FieldMeta {
    pub fn new(field_name: &'static str, kind: Kind) -> Self {
        Self {
            field_name,
            kind,
            column: None,
            column_type: None,
            primary_key: false,
            auto_increment: false,
            nullable: false,
        }
    }

    /// Expose the field under a different column name
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    /// Override the inferred column type
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A typed value representing one table row
///
/// Usually implemented through [`record!`](crate::record).
pub trait Record: Default {
    /// Rust type name, used for the default table name and in errors
    fn type_name() -> &'static str;

    /// Explicit table name; defaults to the lower-cased type name
    fn table_name() -> Option<String> {
        None
    }

    fn engine() -> Engine {
        Engine::MERGE_TREE
    }

    fn engine_options() -> Vec<(String, String)> {
        Vec::new()
    }

    /// Field metadata in declaration order
    fn fields() -> Vec<FieldMeta>;

    fn field(&self, name: &str) -> Option<&dyn FieldValue>;

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldValue>;
}

/// Implement [`Record`](crate::Record) for a struct
///
/// Each listed field may carry metadata: `column("name")`, `column_type("Type")`,
/// `primary_key`, `auto_increment`, `nullable`. Unlisted fields are not mapped.
///
/// # Examples
/// ```
/// use chorm_core::{record, Record};
///
/// #[derive(Debug, Default)]
/// struct Event {
///     id: u64,
///     name: String,
///     score: f64,
/// }
///
/// record! {
///     #[table = "events"]
///     #[engine = "ReplacingMergeTree"]
///     #[option("index_granularity" = "8192")]
///     impl Record for Event {
///         id: [primary_key],
///         name: [column("event_name")],
///         score,
///     }
/// }
///
/// assert_eq!(Event::table_name().as_deref(), Some("events"));
/// assert_eq!(Event::fields().len(), 3);
/// ```
#[macro_export]
macro_rules! record {
    (
        $( #[table = $table:literal] )?
        $( #[engine = $engine:literal] )?
        $( #[option($option_key:literal = $option_value:literal)] )*
        impl Record for $ty:ident {
            $(
                $field:ident $( : [ $( $meta:ident $( ( $arg:expr ) )? ),* $(,)? ] )?
            ),* $(,)?
        }
    ) => {
        impl $crate::Record for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            $(
                fn table_name() -> ::std::option::Option<::std::string::String> {
                    ::std::option::Option::Some(::std::string::String::from($table))
                }
            )?

            $(
                fn engine() -> $crate::Engine {
                    $crate::Engine::custom($engine)
                }
            )?

            fn engine_options() -> ::std::vec::Vec<(::std::string::String, ::std::string::String)> {
                ::std::vec![
                    $( (::std::string::String::from($option_key), ::std::string::String::from($option_value)) ),*
                ]
            }

            fn fields() -> ::std::vec::Vec<$crate::FieldMeta> {
                let sample = <$ty as ::std::default::Default>::default();
                ::std::vec![
                    $(
                        {
                            #[allow(unused_mut)]
                            let mut meta = $crate::FieldMeta::new(
                                stringify!($field),
                                $crate::FieldValue::kind(&sample.$field),
                            );
                            $( $( meta = meta.$meta( $( $arg )? ); )* )?
                            meta
                        }
                    ),*
                ]
            }

            fn field(&self, name: &str) -> ::std::option::Option<&dyn $crate::FieldValue> {
                $(
                    if name == stringify!($field) {
                        return ::std::option::Option::Some(&self.$field);
                    }
                )*
                ::std::option::Option::None
            }

            fn field_mut(&mut self, name: &str) -> ::std::option::Option<&mut dyn $crate::FieldValue> {
                $(
                    if name == stringify!($field) {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                )*
                ::std::option::Option::None
            }
        }
    };
}
