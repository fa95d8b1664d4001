//! Table structure model: columns, datatypes and unique key definitions.
//!
//! The validation engine only reads a structure through [`TableStructure`].
//! [`Structure`] is the in-memory implementation used by the CLI and tests;
//! hosts with their own model implement the trait directly.
//!
//! # Example
//!
//! ```rust
//! use tablekey_core::{ColumnRange, KeyItem, Structure, UniqueKey};
//!
//! let structure = Structure::new("tariffs")
//!     .with_column("code", "String")
//!     .with_column("validFrom", "Integer")
//!     .with_column("validTo", "Integer")
//!     .with_unique_key(UniqueKey::new(
//!         "validity",
//!         vec![
//!             KeyItem::column("code"),
//!             KeyItem::range(ColumnRange::two_column("period", "validFrom", "validTo")),
//!         ],
//!     ));
//! assert_eq!(structure.columns().len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::datatype::ValueDatatype;
use crate::error::{Error, Result};

/// Read-only view of a table structure, as consumed by the validator.
///
/// Lookups never fail loudly: an unknown column or datatype yields `None`
/// and the engine degrades accordingly.
pub trait TableStructure {
    /// Number of declared columns.
    fn column_count(&self) -> usize;

    /// Resolves a column name to its position.
    fn column_index(&self, name: &str) -> Option<usize>;

    /// Resolves the declared datatype of a column.
    fn column_datatype(&self, name: &str) -> Option<ValueDatatype>;

    /// Unique key definitions in declaration order.
    fn unique_keys(&self) -> &[UniqueKey];

    /// Stamp that changes whenever the structure is modified.
    fn modification_stamp(&self) -> u64;
}

/// Kind of a column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    /// Range stored in a from-column and a to-column.
    TwoColumn,
    /// Only the lower bound is stored.
    OneColumnFrom,
    /// Only the upper bound is stored.
    OneColumnTo,
}

/// A named range over one or two columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    /// Range name.
    pub name: String,
    /// Range kind.
    pub kind: RangeKind,
    /// From-column name.
    #[serde(default)]
    pub from: Option<String>,
    /// To-column name.
    #[serde(default)]
    pub to: Option<String>,
}

impl ColumnRange {
    /// Creates a two-column range.
    #[must_use]
    pub fn two_column(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RangeKind::TwoColumn,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Creates a one-column range holding only the lower bound.
    #[must_use]
    pub fn one_column_from(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RangeKind::OneColumnFrom,
            from: Some(from.into()),
            to: None,
        }
    }

    /// Creates a one-column range holding only the upper bound.
    #[must_use]
    pub fn one_column_to(name: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RangeKind::OneColumnTo,
            from: None,
            to: Some(to.into()),
        }
    }

    /// Returns true for two-column ranges.
    #[must_use]
    pub fn is_two_column(&self) -> bool {
        self.kind == RangeKind::TwoColumn
    }

    /// Column names the range reads, from-column first.
    ///
    /// One-column ranges only report the column matching their kind.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self.kind {
            RangeKind::TwoColumn => self.from.iter().chain(self.to.iter()).map(String::as_str).collect(),
            RangeKind::OneColumnFrom => self.from.iter().map(String::as_str).collect(),
            RangeKind::OneColumnTo => self.to.iter().map(String::as_str).collect(),
        }
    }
}

/// One item of a unique key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyItem {
    /// A plain column.
    Column {
        /// Column name.
        column: String,
    },
    /// A column range.
    Range(ColumnRange),
}

impl KeyItem {
    /// Creates a plain column item.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            column: name.into(),
        }
    }

    /// Creates a range item.
    #[must_use]
    pub fn range(range: ColumnRange) -> Self {
        Self::Range(range)
    }

    /// Returns the range if this item is a two-column range.
    #[must_use]
    pub fn as_two_column_range(&self) -> Option<&ColumnRange> {
        match self {
            Self::Range(range) if range.is_two_column() => Some(range),
            _ => None,
        }
    }

    /// Column names the item reads.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Column { column } => vec![column.as_str()],
            Self::Range(range) => range.columns(),
        }
    }

    /// Display name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Column { column } => column,
            Self::Range(range) => &range.name,
        }
    }
}

/// A named unique key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Key name, used in diagnostics.
    pub name: String,
    /// Ordered key items.
    pub items: Vec<KeyItem>,
}

impl UniqueKey {
    /// Creates a unique key definition.
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<KeyItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Returns true if at least one item is a two-column range.
    #[must_use]
    pub fn contains_two_column_range(&self) -> bool {
        self.two_column_ranges().next().is_some()
    }

    /// Two-column range items in declaration order.
    pub fn two_column_ranges(&self) -> impl Iterator<Item = &ColumnRange> {
        self.items.iter().filter_map(KeyItem::as_two_column_range)
    }

    /// Items compared for exact equality (everything but two-column ranges).
    pub fn exact_match_items(&self) -> impl Iterator<Item = &KeyItem> {
        self.items
            .iter()
            .filter(|item| item.as_two_column_range().is_none())
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Datatype name, resolved with [`ValueDatatype::from_name`].
    pub datatype: String,
}

/// In-memory table structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    /// Structure name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    unique_keys: Vec<UniqueKey>,
    #[serde(skip)]
    modification_stamp: u64,
}

impl Structure {
    /// Creates an empty structure.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: appends a column.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.add_column(name, datatype);
        self
    }

    /// Builder: appends a unique key.
    #[must_use]
    pub fn with_unique_key(mut self, key: UniqueKey) -> Self {
        self.add_unique_key(key);
        self
    }

    /// Parses a structure from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structure`] if the text is not a valid structure.
    pub fn from_toml(text: &str) -> Result<Self> {
        let structure: Self = toml::from_str(text).map_err(|e| Error::Structure(e.to_string()))?;
        structure.validate()?;
        Ok(structure)
    }

    /// Loads a structure from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or
    /// [`Error::Structure`] if it is not a valid structure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Checks the definition for mistakes the engine cannot degrade around.
    ///
    /// References to undeclared columns are not errors; see
    /// [`Structure::unresolved_references`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structure`] for duplicate column names, keys without
    /// items, or ranges missing the column their kind requires.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Structure(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        for key in &self.unique_keys {
            if key.items.is_empty() {
                return Err(Error::Structure(format!(
                    "unique key '{}' has no items",
                    key.name
                )));
            }
            for item in &key.items {
                if let KeyItem::Range(range) = item {
                    let complete = match range.kind {
                        RangeKind::TwoColumn => range.from.is_some() && range.to.is_some(),
                        RangeKind::OneColumnFrom => range.from.is_some(),
                        RangeKind::OneColumnTo => range.to.is_some(),
                    };
                    if !complete {
                        return Err(Error::Structure(format!(
                            "range '{}' of unique key '{}' lacks a column for kind {:?}",
                            range.name, key.name, range.kind
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Lists `(key, column)` pairs whose column is not declared.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<(String, String)> {
        self.unique_keys
            .iter()
            .flat_map(|key| {
                key.items
                    .iter()
                    .flat_map(KeyItem::columns)
                    .filter(|column| self.column_index(column).is_none())
                    .map(|column| (key.name.clone(), column.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Declared columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Appends a column.
    pub fn add_column(&mut self, name: impl Into<String>, datatype: impl Into<String>) {
        self.insert_column(self.columns.len(), name, datatype);
    }

    /// Inserts a column at `index`, clamped to the column count.
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, datatype: impl Into<String>) {
        let index = index.min(self.columns.len());
        self.columns.insert(
            index,
            Column {
                name: name.into(),
                datatype: datatype.into(),
            },
        );
        self.touch();
    }

    /// Removes a column by name, returning its former position.
    pub fn remove_column(&mut self, name: &str) -> Option<usize> {
        let index = self.column_index(name)?;
        self.columns.remove(index);
        self.touch();
        Some(index)
    }

    /// Changes the declared datatype of a column.
    ///
    /// Returns false if the column does not exist.
    pub fn set_column_datatype(&mut self, name: &str, datatype: impl Into<String>) -> bool {
        let Some(column) = self.columns.iter_mut().find(|c| c.name == name) else {
            return false;
        };
        column.datatype = datatype.into();
        self.touch();
        true
    }

    /// Appends a unique key definition.
    pub fn add_unique_key(&mut self, key: UniqueKey) {
        self.unique_keys.push(key);
        self.touch();
    }

    /// Removes a unique key definition by name.
    pub fn remove_unique_key(&mut self, name: &str) -> Option<UniqueKey> {
        let index = self.unique_keys.iter().position(|k| k.name == name)?;
        let key = self.unique_keys.remove(index);
        self.touch();
        Some(key)
    }

    /// Marks the structure as modified.
    pub fn touch(&mut self) {
        self.modification_stamp = self.modification_stamp.wrapping_add(1);
    }
}

impl TableStructure for Structure {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn column_datatype(&self, name: &str) -> Option<ValueDatatype> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| ValueDatatype::from_name(&c.datatype))
    }

    fn unique_keys(&self) -> &[UniqueKey] {
        &self.unique_keys
    }

    fn modification_stamp(&self) -> u64 {
        self.modification_stamp
    }
}
