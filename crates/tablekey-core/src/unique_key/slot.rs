//! Index bucket: one row, or a collision set of rows.
//!
//! An absent map entry is the empty bucket. The transitions below are pure
//! so that every case of the maintenance protocol can be tested on its own.

use std::collections::BTreeSet;

use crate::table::RowId;

/// Occupants of an index bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowSlot {
    /// The common case: exactly one row.
    One(RowId),
    /// A collision group of at least two rows.
    Many(BTreeSet<RowId>),
}

impl RowSlot {
    /// Bucket after `row` changed to this bucket's value.
    pub(crate) fn changed(slot: Option<Self>, row: RowId) -> Self {
        match slot {
            None => Self::One(row),
            Some(Self::One(existing)) if existing == row => Self::One(existing),
            Some(Self::One(existing)) => Self::Many(BTreeSet::from([existing, row])),
            Some(Self::Many(mut rows)) => {
                rows.insert(row);
                Self::Many(rows)
            }
        }
    }

    /// Bucket after `row` was removed from the table.
    ///
    /// A different single occupant is kept while it still holds this value;
    /// `None` means the bucket is gone.
    pub(crate) fn removed(
        slot: Option<Self>,
        row: RowId,
        occupant_still_valid: impl FnOnce(RowId) -> bool,
    ) -> Option<Self> {
        match slot {
            None => None,
            Some(Self::One(existing)) if existing == row => None,
            Some(Self::One(existing)) => occupant_still_valid(existing).then_some(Self::One(existing)),
            Some(Self::Many(mut rows)) => {
                rows.remove(&row);
                Self::from_set(rows)
            }
        }
    }

    /// Bucket keeping only the rows accepted by `keep`.
    pub(crate) fn retain(self, mut keep: impl FnMut(RowId) -> bool) -> Option<Self> {
        match self {
            Self::One(row) => keep(row).then_some(Self::One(row)),
            Self::Many(mut rows) => {
                rows.retain(|row| keep(*row));
                Self::from_set(rows)
            }
        }
    }

    fn from_set(rows: BTreeSet<RowId>) -> Option<Self> {
        match rows.len() {
            0 => None,
            1 => rows.first().copied().map(Self::One),
            _ => Some(Self::Many(rows)),
        }
    }

    /// Number of rows.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(rows) => rows.len(),
        }
    }

    /// Returns true if the bucket holds a collision group.
    pub(crate) fn is_collision(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Returns true if `row` occupies the bucket.
    #[cfg(test)]
    pub(crate) fn contains(&self, row: RowId) -> bool {
        match self {
            Self::One(existing) => *existing == row,
            Self::Many(rows) => rows.contains(&row),
        }
    }

    /// Occupants in handle order.
    pub(crate) fn rows(&self) -> Box<dyn Iterator<Item = RowId> + '_> {
        match self {
            Self::One(row) => Box::new(std::iter::once(*row)),
            Self::Many(rows) => Box::new(rows.iter().copied()),
        }
    }
}
