//! Schema derivation and field access for record types

pub mod coerce;
pub mod record;
pub mod types;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::{Error, Result, Value};
use coerce::FieldValue;
use record::{FieldMeta, Record};
use types::{Engine, Kind};

/// What to do when a value cannot be converted into a field's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Leave the field unchanged and log the skip
    #[default]
    Lenient,
    /// Fail with `Error::Coercion`
    Strict,
}

/// Column-level schema of one record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Rust field identifier
    pub field_name: String,
    /// Exposed column name
    pub name: String,
    pub column_type: String,
    pub kind: Kind,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_nullable: bool,
}

impl FieldDescriptor {
    fn from_meta(meta: FieldMeta) -> Self {
        let is_nullable = meta.nullable || meta.kind.is_nullable();
        let kind = meta.kind.non_null().clone();
        let column_type = meta.column_type.unwrap_or_else(|| kind.column_type());

        Self {
            field_name: meta.field_name.to_string(),
            name: meta.column.unwrap_or_else(|| meta.field_name.to_string()),
            column_type,
            kind,
            is_primary_key: meta.primary_key,
            is_auto_increment: meta.auto_increment,
            is_nullable,
        }
    }

    /// Column definition as it appears in CREATE TABLE
    pub fn definition(&self) -> String {
        // Array cannot sit inside Nullable; a missing array is stored empty
        let wrap = self.is_nullable
            && !self.column_type.starts_with("Nullable(")
            && !self.column_type.starts_with("Array(");
        let mut definition = if wrap {
            format!("`{}` Nullable({})", self.name, self.column_type)
        } else {
            format!("`{}` {}", self.name, self.column_type)
        };

        if self.is_primary_key {
            definition.push_str(" PRIMARY KEY");
        }
        if self.is_auto_increment {
            definition.push_str(" AUTO_INCREMENT");
        }
        definition
    }
}

/// Derived schema of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub name: String,
    pub record: String,
    pub fields: Vec<FieldDescriptor>,
    pub engine: Engine,
    pub engine_options: BTreeMap<String, String>,
}

impl TableDescriptor {
    /// Look a field up by exposed column name, falling back to the Rust field name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.field_name == name))
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.fields.iter().map(FieldDescriptor::definition).collect();

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS `{}` ({}) ENGINE = {}",
            self.name,
            columns.join(", "),
            self.engine
        );

        if !self.engine_options.is_empty() {
            let options: Vec<String> = self
                .engine_options
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect();
            sql.push_str(&format!("({})", options.join(", ")));
        }

        sql
    }
}

/// Derives and caches table descriptors; reads and writes record fields
#[derive(Debug, Default)]
pub struct Mapper {
    cache: RwLock<HashMap<String, Arc<TableDescriptor>>>,
    policy: CoercionPolicy,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CoercionPolicy) -> Self {
        Self {
            cache: RwLock::default(),
            policy,
        }
    }

    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Explicit table name, or the lower-cased type name
    pub fn table_name<R: Record>() -> String {
        R::table_name().unwrap_or_else(|| R::type_name().to_lowercase())
    }

    /// Previously derived descriptor for a table, if any
    pub fn cached(&self, table: &str) -> Option<Arc<TableDescriptor>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(table)
            .cloned()
    }

    /// Derive the descriptor for `R`, or return the cached one
    pub fn describe<R: Record>(&self) -> Result<Arc<TableDescriptor>> {
        let table = Self::table_name::<R>();
        if let Some(descriptor) = self.cached(&table) {
            return Ok(descriptor);
        }

        if table.trim().is_empty() {
            return Err(Error::schema(R::type_name(), "table name is empty"));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for meta in R::fields() {
            let field = FieldDescriptor::from_meta(meta);
            if field.name.is_empty() {
                return Err(Error::schema(
                    R::type_name(),
                    format!("field '{}' has an empty column name", field.field_name),
                ));
            }
            if !seen.insert(field.name.clone()) {
                return Err(Error::schema(
                    R::type_name(),
                    format!("duplicate column '{}'", field.name),
                ));
            }
            fields.push(field);
        }

        let descriptor = Arc::new(TableDescriptor {
            name: table.clone(),
            record: R::type_name().to_string(),
            fields,
            engine: R::engine(),
            engine_options: R::engine_options().into_iter().collect(),
        });

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = cache.entry(table).or_insert_with(|| {
            tracing::trace!(table = %descriptor.name, "cached table descriptor");
            descriptor
        });
        Ok(Arc::clone(entry))
    }

    /// `CREATE TABLE` text for `R`
    pub fn create_table_sql<R: Record>(&self) -> Result<String> {
        Ok(self.describe::<R>()?.create_table_sql())
    }

    fn resolve<'a, R: Record>(descriptor: &'a TableDescriptor, name: &str) -> Result<&'a str> {
        descriptor
            .field(name)
            .map(|f| f.field_name.as_str())
            .ok_or_else(|| Error::field_not_found(R::type_name(), name))
    }

    /// Read a field by column or Rust field name
    pub fn get_field<R: Record>(&self, record: &R, name: &str) -> Result<Value> {
        let descriptor = self.describe::<R>()?;
        let field_name = Self::resolve::<R>(&descriptor, name)?;
        record
            .field(field_name)
            .map(|field| field.to_value())
            .ok_or_else(|| Error::field_not_found(R::type_name(), name))
    }

    /// Write a field by column or Rust field name, coercing the value
    pub fn set_field<R: Record>(&self, record: &mut R, name: &str, value: &Value) -> Result<()> {
        let descriptor = self.describe::<R>()?;
        let field_name = Self::resolve::<R>(&descriptor, name)?;
        let field = record
            .field_mut(field_name)
            .ok_or_else(|| Error::field_not_found(R::type_name(), name))?;
        self.assign(field, field_name, value)
    }

    pub(crate) fn assign(
        &self,
        field: &mut dyn FieldValue,
        field_name: &str,
        value: &Value,
    ) -> Result<()> {
        let kind = field.kind();

        // NULL only reaches nullable fields
        if value.is_null() && !kind.is_nullable() {
            return Ok(());
        }

        if field.assign(value) {
            return Ok(());
        }

        match self.policy {
            CoercionPolicy::Lenient => {
                tracing::debug!(
                    field = field_name,
                    expected = %kind,
                    value = ?value,
                    "skipping value that cannot be coerced"
                );
                Ok(())
            }
            CoercionPolicy::Strict => Err(Error::coercion(
                field_name,
                format!("{:?}", value),
                kind.to_string(),
            )),
        }
    }

    /// Primary-key column name and its current value
    pub fn primary_key<R: Record>(&self, record: &R) -> Result<(String, Value)> {
        let descriptor = self.describe::<R>()?;
        let key = descriptor
            .primary_key()
            .ok_or_else(|| Error::schema(R::type_name(), "no primary key field"))?;
        let value = record
            .field(&key.field_name)
            .map(|field| field.to_value())
            .ok_or_else(|| Error::field_not_found(R::type_name(), &key.field_name))?;
        Ok((key.name.clone(), value))
    }

    /// Field values in descriptor order
    pub fn values_of<R: Record>(&self, record: &R) -> Result<Vec<Value>> {
        let descriptor = self.describe::<R>()?;
        descriptor
            .fields
            .iter()
            .map(|f| {
                record
                    .field(&f.field_name)
                    .map(|field| field.to_value())
                    .ok_or_else(|| Error::field_not_found(R::type_name(), &f.field_name))
            })
            .collect()
    }

    /// Assign values to fields in descriptor order; extra values are ignored
    pub fn fill_positional<R: Record>(&self, record: &mut R, values: &[Value]) -> Result<()> {
        let descriptor = self.describe::<R>()?;
        for (field, value) in descriptor.fields.iter().zip(values) {
            self.set_by_descriptor(record, field, value)?;
        }
        Ok(())
    }

    /// Assign values by column name; unknown columns are ignored
    pub fn fill_named<R: Record>(
        &self,
        record: &mut R,
        columns: &[String],
        values: &[Value],
    ) -> Result<()> {
        let descriptor = self.describe::<R>()?;
        for (column, value) in columns.iter().zip(values) {
            if let Some(field) = descriptor.field(column) {
                self.set_by_descriptor(record, field, value)?;
            }
        }
        Ok(())
    }

    fn set_by_descriptor<R: Record>(
        &self,
        record: &mut R,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<()> {
        let target = record
            .field_mut(&field.field_name)
            .ok_or_else(|| Error::field_not_found(R::type_name(), &field.field_name))?;
        self.assign(target, &field.field_name, value)
    }
}
