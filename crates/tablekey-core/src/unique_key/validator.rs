//! Unique key validator: owns the key indexes of one table.
//!
//! Row events keep the indexes structurally current at O(keys × range items)
//! per event. Content staleness is only detected during [`UniqueKeyValidator::validate`],
//! which drops entries whose rows moved on and reports what is left.

use std::time::Instant;

use super::definition::ResolvedKey;
use super::range_index::RangeKeyIndex;
use super::simple_index::SimpleKeyIndex;
use crate::config::ValidationConfig;
use crate::datatype::ValueDatatype;
use crate::message::MessageList;
use crate::structure::TableStructure;
use crate::table::{RowId, TableRows};

/// How a validation pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Triggered by an edit. Range keys are skipped on large tables.
    #[default]
    Automatic,
    /// Requested by the user. Range keys are always validated.
    Explicit,
}

/// What happened to range keys during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    /// The structure declares no usable range key.
    NotApplicable,
    /// Range keys were validated.
    Performed,
    /// The result of the last explicit range validation was reused.
    Replayed,
    /// Range keys were not validated and no earlier result exists.
    Skipped,
}

/// Result of a validation pass.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Diagnostics, simple keys first.
    pub messages: MessageList,
    /// True if the error/no-error status differs from the previous pass.
    pub status_changed: bool,
    /// How range keys were handled.
    pub range_check: RangeCheck,
}

/// Cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorStats {
    /// Number of full index rebuilds.
    pub rebuilds: u64,
    /// Number of validation passes.
    pub passes: u64,
    /// Buckets dropped because none of their rows still matched.
    pub evicted_buckets: u64,
    /// Stale rows removed from buckets.
    pub pruned_entries: u64,
    /// Row pairs overlapping in the first two range items of a key, checked
    /// against the remaining items.
    pub range_candidates: u64,
}

#[derive(Debug)]
enum KeyIndex {
    Simple(SimpleKeyIndex),
    Range(RangeKeyIndex),
}

impl KeyIndex {
    fn new(key: ResolvedKey) -> Self {
        if key.is_range_key() {
            Self::Range(RangeKeyIndex::new(key))
        } else {
            Self::Simple(SimpleKeyIndex::new(key))
        }
    }

    fn key(&self) -> &ResolvedKey {
        match self {
            Self::Simple(index) => index.key(),
            Self::Range(index) => index.key(),
        }
    }

    fn on_row_changed(&mut self, rows: &TableRows, row: RowId) {
        match self {
            Self::Simple(index) => index.on_row_changed(rows, row),
            Self::Range(index) => index.on_row_changed(rows, row),
        }
    }

    fn on_row_removed(&mut self, rows: &TableRows, row: RowId) {
        match self {
            Self::Simple(index) => index.on_row_removed(rows, row),
            Self::Range(index) => index.on_row_removed(rows, row),
        }
    }
}

/// What the caches were built against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Freshness {
    stamp: u64,
    range_datatypes: Vec<Option<ValueDatatype>>,
}

impl Freshness {
    fn of<S: TableStructure + ?Sized>(structure: &S) -> Self {
        let range_datatypes = structure
            .unique_keys()
            .iter()
            .flat_map(|key| key.two_column_ranges())
            .map(|range| {
                range
                    .from
                    .as_deref()
                    .and_then(|column| structure.column_datatype(column))
            })
            .collect();
        Self {
            stamp: structure.modification_stamp(),
            range_datatypes,
        }
    }
}

/// Incremental unique key validator for one table.
///
/// Not thread-safe by contract: one editing session owns it, and edits and
/// validation passes never interleave.
#[derive(Debug)]
pub struct UniqueKeyValidator {
    config: ValidationConfig,
    freshness: Option<Freshness>,
    indexes: Option<Vec<KeyIndex>>,
    explicit_range_messages: Option<MessageList>,
    had_errors: bool,
    stats: ValidatorStats,
}

impl Default for UniqueKeyValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl UniqueKeyValidator {
    /// Creates a validator with empty caches.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            freshness: None,
            indexes: None,
            explicit_range_messages: None,
            had_errors: false,
            stats: ValidatorStats::default(),
        }
    }

    /// Validation settings.
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> &ValidatorStats {
        &self.stats
    }

    /// Returns true if the indexes are built.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.indexes.is_some()
    }

    /// Drops every cache; the next validation rebuilds from scratch.
    pub fn clear_caches(&mut self) {
        self.freshness = None;
        self.indexes = None;
        self.explicit_range_messages = None;
    }

    /// Drops the caches if the structure changed since they were built.
    ///
    /// Returns true if caches were dropped.
    pub fn refresh_if_stale<S: TableStructure + ?Sized>(&mut self, structure: &S) -> bool {
        let current = Freshness::of(structure);
        if self.freshness.as_ref() == Some(&current) {
            return false;
        }
        if self.freshness.is_some() {
            tracing::debug!(
                stamp = current.stamp,
                "Structure changed, dropping unique key caches"
            );
        }
        self.clear_caches();
        self.freshness = Some(current);
        true
    }

    /// Applies a `RowChanged` event. The row holds its new values.
    pub fn handle_row_changed<S: TableStructure + ?Sized>(
        &mut self,
        structure: &S,
        rows: &TableRows,
        row: RowId,
    ) {
        self.refresh_if_stale(structure);
        let Some(indexes) = self.indexes.as_mut() else {
            return;
        };
        for index in indexes {
            index.on_row_changed(rows, row);
        }
    }

    /// Applies a `RowRemoved` event. Must be called before the row leaves
    /// `rows`.
    pub fn handle_row_removed<S: TableStructure + ?Sized>(
        &mut self,
        structure: &S,
        rows: &TableRows,
        row: RowId,
    ) {
        self.refresh_if_stale(structure);
        let Some(indexes) = self.indexes.as_mut() else {
            return;
        };
        for index in indexes {
            index.on_row_removed(rows, row);
        }
    }

    /// Number of two-column range items declared by the structure.
    #[must_use]
    pub fn range_item_count<S: TableStructure + ?Sized>(structure: &S) -> usize {
        structure
            .unique_keys()
            .iter()
            .map(|key| key.two_column_ranges().count())
            .sum()
    }

    /// Returns true if range keys are validated on every automatic pass.
    #[must_use]
    pub fn is_range_validation_automatic<S: TableStructure + ?Sized>(
        &self,
        structure: &S,
        rows: &TableRows,
    ) -> bool {
        self.config
            .is_range_validation_automatic(Self::range_item_count(structure), rows.len())
    }

    /// Validates every unique key of the structure against `rows`.
    pub fn validate<S: TableStructure + ?Sized>(
        &mut self,
        structure: &S,
        rows: &TableRows,
        mode: ValidationMode,
    ) -> ValidationOutcome {
        self.refresh_if_stale(structure);
        if self.indexes.is_none() {
            self.rebuild(structure, rows);
        }

        let automatic = self.is_range_validation_automatic(structure, rows);
        let check_ranges = automatic || mode == ValidationMode::Explicit;
        let cap = self.config.violation_cap;

        let mut messages = MessageList::new();
        let mut range_messages = MessageList::new();
        let mut has_range_keys = false;
        for index in self.indexes.iter_mut().flatten() {
            match index {
                KeyIndex::Simple(index) => messages.extend(index.validate(rows, cap, &mut self.stats)),
                KeyIndex::Range(index) => {
                    has_range_keys = true;
                    if check_ranges {
                        range_messages.extend(index.validate(rows, cap, &mut self.stats));
                    }
                }
            }
        }

        let range_check = if !has_range_keys {
            RangeCheck::NotApplicable
        } else if check_ranges {
            self.explicit_range_messages = (!automatic).then(|| range_messages.clone());
            RangeCheck::Performed
        } else if let Some(cached) = &self.explicit_range_messages {
            range_messages = cached.clone();
            range_messages.retain(|m| m.row.map_or(true, |row| rows.contains(row)));
            RangeCheck::Replayed
        } else {
            RangeCheck::Skipped
        };
        messages.extend(range_messages);

        let has_errors = messages.contains_errors();
        let status_changed = has_errors != self.had_errors;
        self.had_errors = has_errors;
        self.stats.passes += 1;

        tracing::debug!(
            rows = rows.len(),
            messages = messages.len(),
            ?range_check,
            status_changed,
            "Unique key validation finished"
        );

        ValidationOutcome {
            messages,
            status_changed,
            range_check,
        }
    }

    fn rebuild<S: TableStructure + ?Sized>(&mut self, structure: &S, rows: &TableRows) {
        let started = Instant::now();
        let mut indexes: Vec<KeyIndex> = structure
            .unique_keys()
            .iter()
            .filter_map(|key| ResolvedKey::resolve(key, structure))
            .map(KeyIndex::new)
            .collect();

        for row in rows.ids() {
            for index in &mut indexes {
                index.on_row_changed(rows, row);
            }
        }

        self.stats.rebuilds += 1;
        tracing::debug!(
            keys = indexes.len(),
            range_keys = indexes.iter().filter(|i| i.key().is_range_key()).count(),
            rows = rows.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Rebuilt unique key caches"
        );
        self.indexes = Some(indexes);
    }

    #[cfg(test)]
    pub(crate) fn simple_index(&self, key: &str) -> Option<&SimpleKeyIndex> {
        self.indexes.iter().flatten().find_map(|index| match index {
            KeyIndex::Simple(index) if index.key().name == key => Some(index),
            _ => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn range_index(&self, key: &str) -> Option<&RangeKeyIndex> {
        self.indexes.iter().flatten().find_map(|index| match index {
            KeyIndex::Range(index) if index.key().name == key => Some(index),
            _ => None,
        })
    }
}
