//! Table contents: the row container that drives the unique key validator.
//!
//! Every mutation goes through [`TableContents`], which forwards the matching
//! row event to its validator. Appending a blank row raises no event: a blank
//! row has no key value and cannot collide until a value is set.

mod row;

pub use row::{Row, RowId, TableRows};

use crate::config::ValidationConfig;
use crate::error::{Error, Result};
use crate::structure::{Structure, TableStructure};
use crate::unique_key::{UniqueKeyValidator, ValidationMode, ValidationOutcome};

/// Rows of one table plus their unique key validator.
#[derive(Debug)]
pub struct TableContents<S: TableStructure = Structure> {
    name: String,
    structure: S,
    column_count: usize,
    rows: TableRows,
    validator: UniqueKeyValidator,
}

impl<S: TableStructure> TableContents<S> {
    /// Creates an empty table with the default validation settings.
    pub fn new(name: impl Into<String>, structure: S) -> Self {
        Self::with_config(name, structure, ValidationConfig::default())
    }

    /// Creates an empty table with explicit validation settings.
    pub fn with_config(name: impl Into<String>, structure: S, config: ValidationConfig) -> Self {
        let column_count = structure.column_count();
        Self {
            name: name.into(),
            structure,
            column_count,
            rows: TableRows::new(),
            validator: UniqueKeyValidator::new(config),
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table structure.
    #[must_use]
    pub fn structure(&self) -> &S {
        &self.structure
    }

    /// Mutable table structure.
    ///
    /// Changes must bump the modification stamp; the validator drops its
    /// caches on the next call. Column changes go through
    /// [`TableContents::insert_column`] and [`TableContents::remove_column`]
    /// so that rows keep their width.
    pub fn structure_mut(&mut self) -> &mut S {
        &mut self.structure
    }

    /// Number of columns of every row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows in display order.
    #[must_use]
    pub fn rows(&self) -> &TableRows {
        &self.rows
    }

    /// Resolves a row handle.
    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    /// Row at a position.
    #[must_use]
    pub fn row_at(&self, index: usize) -> Option<&Row> {
        self.rows.get_index(index)
    }

    /// Appends a blank row.
    pub fn new_row(&mut self) -> RowId {
        let id = self.rows.next_id();
        self.rows.push(Row::blank(id, self.column_count));
        id
    }

    /// Inserts a blank row before position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowIndexOutOfRange`] if `index > row_count()`.
    pub fn insert_row(&mut self, index: usize) -> Result<RowId> {
        if index > self.rows.len() {
            return Err(Error::RowIndexOutOfRange {
                index,
                row_count: self.rows.len(),
            });
        }
        let id = self.rows.next_id();
        self.rows.insert_at(index, Row::blank(id, self.column_count));
        Ok(id)
    }

    /// Appends a row with the given values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnCountMismatch`] if the number of values differs
    /// from the column count.
    pub fn push_row(&mut self, values: Vec<Option<String>>) -> Result<RowId> {
        if values.len() != self.column_count {
            return Err(Error::ColumnCountMismatch {
                expected: self.column_count,
                actual: values.len(),
            });
        }
        let id = self.rows.next_id();
        self.rows.push(Row::new(id, values));
        self.notify_changed(id);
        Ok(id)
    }

    /// Sets the value of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`] or [`Error::ColumnOutOfRange`].
    pub fn set_value(&mut self, id: RowId, column: usize, value: impl Into<String>) -> Result<()> {
        self.write_cell(id, column, Some(value.into()))
    }

    /// Clears one cell to null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`] or [`Error::ColumnOutOfRange`].
    pub fn set_null(&mut self, id: RowId, column: usize) -> Result<()> {
        self.write_cell(id, column, None)
    }

    /// Replaces all values of a row at once, raising a single event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`] or [`Error::ColumnCountMismatch`].
    pub fn set_values(&mut self, id: RowId, values: Vec<Option<String>>) -> Result<()> {
        if values.len() != self.column_count {
            return Err(Error::ColumnCountMismatch {
                expected: self.column_count,
                actual: values.len(),
            });
        }
        let row = self.rows.get_mut(id).ok_or(Error::RowNotFound(id))?;
        *row = Row::new(id, values);
        self.notify_changed(id);
        Ok(())
    }

    /// Deletes a row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`] if the handle does not resolve.
    pub fn remove_row(&mut self, id: RowId) -> Result<Row> {
        if !self.rows.contains(id) {
            return Err(Error::RowNotFound(id));
        }
        self.validator
            .handle_row_removed(&self.structure, &self.rows, id);
        self.rows.remove(id).ok_or(Error::RowNotFound(id))
    }

    /// Deletes all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.validator.clear_caches();
    }

    /// Inserts a column at `index` in every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] if `index > column_count()`.
    pub fn insert_column(&mut self, index: usize, default: Option<String>) -> Result<()> {
        if index > self.column_count {
            return Err(Error::ColumnOutOfRange {
                index,
                column_count: self.column_count,
            });
        }
        for row in self.rows.iter_mut() {
            row.insert_column(index, default.clone());
        }
        self.column_count += 1;
        self.validator.clear_caches();
        Ok(())
    }

    /// Removes the column at `index` from every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] if `index >= column_count()`.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        if index >= self.column_count {
            return Err(Error::ColumnOutOfRange {
                index,
                column_count: self.column_count,
            });
        }
        for row in self.rows.iter_mut() {
            row.remove_column(index);
        }
        self.column_count -= 1;
        self.validator.clear_caches();
        Ok(())
    }

    /// Runs an automatic validation pass.
    pub fn validate(&mut self) -> ValidationOutcome {
        self.validator
            .validate(&self.structure, &self.rows, ValidationMode::Automatic)
    }

    /// Runs an explicit validation pass; range keys are always checked.
    pub fn validate_explicitly(&mut self) -> ValidationOutcome {
        self.validator
            .validate(&self.structure, &self.rows, ValidationMode::Explicit)
    }

    /// The unique key validator of this table.
    #[must_use]
    pub fn validator(&self) -> &UniqueKeyValidator {
        &self.validator
    }

    fn write_cell(&mut self, id: RowId, column: usize, value: Option<String>) -> Result<()> {
        if column >= self.column_count {
            return Err(Error::ColumnOutOfRange {
                index: column,
                column_count: self.column_count,
            });
        }
        let row = self.rows.get_mut(id).ok_or(Error::RowNotFound(id))?;
        row.set_value(column, value);
        self.notify_changed(id);
        Ok(())
    }

    fn notify_changed(&mut self, id: RowId) {
        self.validator
            .handle_row_changed(&self.structure, &self.rows, id);
    }
}

impl TableContents<Structure> {
    /// Declares a new column at `index` and widens every row with a null
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] if `index > column_count()`.
    pub fn add_column(
        &mut self,
        index: usize,
        name: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Result<()> {
        self.insert_column(index, None)?;
        self.structure.insert_column(index, name, datatype);
        Ok(())
    }

    /// Removes a declared column and its values, returning its former
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structure`] if no such column is declared.
    pub fn drop_column(&mut self, name: &str) -> Result<usize> {
        let index = self
            .structure
            .column_index(name)
            .ok_or_else(|| Error::Structure(format!("unknown column '{name}'")))?;
        self.remove_column(index)?;
        self.structure.remove_column(name);
        Ok(index)
    }
}
