//! Rows and the row arena.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a row within its table.
///
/// Handles are never reused, so a handle held by a cache entry either
/// resolves to the same row or to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(u64);

impl RowId {
    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One table row: a nullable text value per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    values: Vec<Option<String>>,
}

impl Row {
    pub(crate) fn new(id: RowId, values: Vec<Option<String>>) -> Self {
        Self { id, values }
    }

    pub(crate) fn blank(id: RowId, column_count: usize) -> Self {
        Self::new(id, vec![Some(String::new()); column_count])
    }

    /// Row handle.
    #[must_use]
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Value of a column as text.
    ///
    /// Null and out-of-range columns read as the empty string.
    #[must_use]
    pub fn value(&self, column: usize) -> &str {
        self.values
            .get(column)
            .and_then(Option::as_deref)
            .unwrap_or("")
    }

    /// Raw values, one per column.
    #[must_use]
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub(crate) fn set_value(&mut self, column: usize, value: Option<String>) {
        self.values[column] = value;
    }

    pub(crate) fn insert_column(&mut self, column: usize, value: Option<String>) {
        self.values.insert(column, value);
    }

    pub(crate) fn remove_column(&mut self, column: usize) {
        self.values.remove(column);
    }
}

/// Ordered row arena.
///
/// Lookup by [`RowId`] is O(1); the position of a row is its display order.
#[derive(Debug, Default)]
pub struct TableRows {
    rows: IndexMap<RowId, Row>,
    next_id: u64,
}

impl TableRows {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves a handle.
    #[must_use]
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Row at a position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Row> {
        self.rows.get_index(index).map(|(_, row)| row)
    }

    /// Position of a row.
    #[must_use]
    pub fn index_of(&self, id: RowId) -> Option<usize> {
        self.rows.get_index_of(&id)
    }

    /// Returns true if the handle resolves.
    #[must_use]
    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Row handles in display order.
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.keys().copied()
    }

    pub(crate) fn get_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.get_mut(&id)
    }

    pub(crate) fn next_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert_at(&mut self, index: usize, row: Row) {
        self.rows.shift_insert(index, row.id(), row);
    }

    pub(crate) fn push(&mut self, row: Row) {
        self.rows.insert(row.id(), row);
    }

    pub(crate) fn remove(&mut self, id: RowId) -> Option<Row> {
        self.rows.shift_remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.rows.values_mut()
    }
}
