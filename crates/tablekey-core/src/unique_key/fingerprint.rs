//! Key fingerprints: the value of a unique key for one row at one point in time.
//!
//! A fingerprint records the row that produced it and the value it had
//! then. Rows keep changing after a fingerprint is cached; [`KeyFingerprint::is_valid`]
//! recomputes from the live row and tells whether the cached value still holds.
//!
//! Equality, hashing and ordering only look at the value. Two fingerprints of
//! different rows are equal exactly when the rows collide on that key.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::definition::{ResolvedKey, ResolvedRange};
use crate::datatype::ParsedValue;
use crate::table::{RowId, TableRows};

/// Behavior shared by simple and range fingerprints.
pub(crate) trait KeyFingerprint {
    /// What the fingerprint is computed from.
    type Definition;

    /// Row that produced the fingerprint.
    fn row(&self) -> RowId;

    /// Returns true if recomputing from the row's current values yields the
    /// same value. A removed row is never valid.
    fn is_valid(&self, definition: &Self::Definition, rows: &TableRows) -> bool;
}

/// Fingerprint of the exact-match portion of a unique key.
#[derive(Debug, Clone)]
pub(crate) struct KeyValue {
    row: RowId,
    value: String,
}

impl KeyValue {
    /// Computes the fingerprint of a row; `None` if it has no value.
    pub(crate) fn compute(key: &ResolvedKey, rows: &TableRows, row: RowId) -> Option<Self> {
        let value = key.exact_value(rows.get(row)?)?;
        Some(Self { row, value })
    }

    #[cfg(test)]
    pub(crate) fn new(row: RowId, value: &str) -> Self {
        Self {
            row,
            value: value.to_string(),
        }
    }

    /// The same fingerprint attributed to another row.
    pub(crate) fn with_row(&self, row: RowId) -> Self {
        Self {
            row,
            value: self.value.clone(),
        }
    }

    /// Canonical key text.
    pub(crate) fn value(&self) -> &str {
        &self.value
    }
}

impl KeyFingerprint for KeyValue {
    type Definition = ResolvedKey;

    fn row(&self) -> RowId {
        self.row
    }

    fn is_valid(&self, key: &ResolvedKey, rows: &TableRows) -> bool {
        Self::compute(key, rows, self.row).is_some_and(|current| current == *self)
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// Fingerprint of one two-column range item.
///
/// The from value is frozen at construction; the to value is always read
/// from the live row.
#[derive(Debug, Clone)]
pub(crate) struct KeyValueRange {
    row: RowId,
    from: ParsedValue,
}

impl KeyValueRange {
    /// Computes the fingerprint of a row.
    ///
    /// `None` if either bound is not parsable or the range is degenerate.
    pub(crate) fn compute(range: &ResolvedRange, rows: &TableRows, row: RowId) -> Option<Self> {
        let (from, _) = range.interval_of(rows, row)?;
        Some(Self { row, from })
    }

    /// The same fingerprint attributed to another row.
    pub(crate) fn with_row(&self, row: RowId) -> Self {
        Self {
            row,
            from: self.from.clone(),
        }
    }

    /// Frozen from value.
    pub(crate) fn value_from(&self) -> &ParsedValue {
        &self.from
    }

    /// Current to value of the row.
    pub(crate) fn value_to(&self, range: &ResolvedRange, rows: &TableRows) -> Option<ParsedValue> {
        range.value_to(rows.get(self.row)?)
    }
}

impl KeyFingerprint for KeyValueRange {
    type Definition = ResolvedRange;

    fn row(&self) -> RowId {
        self.row
    }

    fn is_valid(&self, range: &ResolvedRange, rows: &TableRows) -> bool {
        Self::compute(range, rows, self.row).is_some_and(|current| current == *self)
    }
}

impl Ord for KeyValueRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.from.cmp(&other.from)
    }
}

impl PartialOrd for KeyValueRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for KeyValueRange {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValueRange {}
