//! Unique keys resolved against a structure.
//!
//! Column names are resolved to positions and range datatypes are looked up
//! once per cache generation, so fingerprint computation is pure indexing.

use crate::datatype::{ParsedValue, ValueDatatype};
use crate::structure::{TableStructure, UniqueKey};
use crate::table::{Row, RowId, TableRows};

/// Separator between the columns of a multi-column exact-match item.
pub(crate) const COLUMN_SEPARATOR: &str = "#";

/// A two-column range item with resolved columns and datatype.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedRange {
    pub(crate) name: String,
    from: usize,
    to: usize,
    datatype: ValueDatatype,
}

impl ResolvedRange {
    #[cfg(test)]
    pub(crate) fn new(name: &str, from: usize, to: usize, datatype: ValueDatatype) -> Self {
        Self {
            name: name.to_string(),
            from,
            to,
            datatype,
        }
    }

    /// Parsed from value of a row.
    pub(crate) fn value_from(&self, row: &Row) -> Option<ParsedValue> {
        self.datatype.parse(row.value(self.from))
    }

    /// Parsed to value of a row.
    pub(crate) fn value_to(&self, row: &Row) -> Option<ParsedValue> {
        self.datatype.parse(row.value(self.to))
    }

    /// `[from, to]` of a row; `None` if either bound does not parse or the
    /// range is degenerate (from > to).
    pub(crate) fn interval(&self, row: &Row) -> Option<(ParsedValue, ParsedValue)> {
        let from = self.value_from(row)?;
        let to = self.value_to(row)?;
        (from <= to).then_some((from, to))
    }

    /// Interval of a row looked up by handle.
    pub(crate) fn interval_of(&self, rows: &TableRows, row: RowId) -> Option<(ParsedValue, ParsedValue)> {
        self.interval(rows.get(row)?)
    }
}

/// A unique key with resolved exact-match columns and usable range items.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedKey {
    pub(crate) name: String,
    /// Column positions per exact-match item; `None` marks an unresolvable
    /// column.
    exact_items: Vec<Vec<Option<usize>>>,
    pub(crate) ranges: Vec<ResolvedRange>,
    /// All resolved columns of the key, in item order.
    pub(crate) columns: Vec<usize>,
}

impl ResolvedKey {
    /// Resolves a key definition.
    ///
    /// Range items whose columns or datatype cannot be resolved are dropped.
    /// Returns `None` for a key without items, or if the key declares range
    /// items but none is usable.
    pub(crate) fn resolve<S: TableStructure + ?Sized>(key: &UniqueKey, structure: &S) -> Option<Self> {
        if key.items.is_empty() {
            tracing::warn!(key = %key.name, "Unique key has no items, skipped");
            return None;
        }

        let mut exact_items = Vec::new();
        let mut ranges = Vec::new();
        let mut columns = Vec::new();

        for item in &key.items {
            if let Some(range) = item.as_two_column_range() {
                let from = range.from.as_deref().and_then(|c| structure.column_index(c));
                let to = range.to.as_deref().and_then(|c| structure.column_index(c));
                let datatype = range
                    .from
                    .as_deref()
                    .and_then(|c| structure.column_datatype(c));
                match (from, to, datatype) {
                    (Some(from), Some(to), Some(datatype)) => {
                        columns.extend([from, to]);
                        ranges.push(ResolvedRange {
                            name: range.name.clone(),
                            from,
                            to,
                            datatype,
                        });
                    }
                    _ => {
                        tracing::warn!(
                            key = %key.name,
                            range = %range.name,
                            "Range columns or datatype not resolvable, range comparison disabled"
                        );
                    }
                }
                continue;
            }

            let resolved: Vec<Option<usize>> = item
                .columns()
                .into_iter()
                .map(|name| {
                    let index = structure.column_index(name);
                    if index.is_none() {
                        tracing::warn!(key = %key.name, column = name, "Unique key column not found");
                    }
                    index
                })
                .collect();
            columns.extend(resolved.iter().flatten().copied());
            exact_items.push(resolved);
        }

        if key.contains_two_column_range() && ranges.is_empty() {
            tracing::warn!(key = %key.name, "No usable range item left, unique key skipped");
            return None;
        }

        Some(Self {
            name: key.name.clone(),
            exact_items,
            ranges,
            columns,
        })
    }

    /// Returns true if the key is validated by the range index.
    pub(crate) fn is_range_key(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// Canonical text of the exact-match portion of the key for a row.
    ///
    /// Returns `None` when a key column is unresolvable or every relevant
    /// value is empty. A key without exact-match items yields the empty
    /// string, which places every row in one table-wide group.
    pub(crate) fn exact_value(&self, row: &Row) -> Option<String> {
        if self.exact_items.is_empty() {
            return Some(String::new());
        }

        let mut all_empty = true;
        let mut parts = Vec::with_capacity(self.exact_items.len());
        for item in &self.exact_items {
            let mut values = Vec::with_capacity(item.len());
            for column in item {
                let value = row.value((*column)?);
                all_empty &= value.is_empty();
                values.push(value);
            }
            parts.push(values.join(COLUMN_SEPARATOR));
        }

        if all_empty {
            None
        } else {
            Some(format!("[{}]", parts.join(", ")))
        }
    }
}
