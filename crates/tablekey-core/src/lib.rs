//! # `tablekey` Core
//!
//! Incremental unique key validation for editable tables.
//!
//! A table structure declares unique keys made of plain columns and column
//! ranges. `tablekey` keeps one index per key current while rows are edited
//! and reports every row whose key duplicates another row, or whose ranges
//! overlap another row's ranges with the same exact-match values.
//!
//! ## Features
//!
//! - **Incremental**: row events update the indexes in O(keys × range items)
//! - **Self-healing caches**: stale entries are dropped during validation
//! - **Range overlap**: sweep over ordered from values, per exact-match group
//! - **Bounded output**: violations are capped per key, with a summary message
//! - **Cost policy**: range checks on large tables only run on request
//!
//! ## Quick Start
//!
//! ```rust
//! use tablekey_core::{ColumnRange, KeyItem, Structure, TableContents, UniqueKey};
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
//!
//! let mut table = TableContents::new("tariffs", structure);
//! let row = |v: [&str; 3]| v.iter().map(|s| Some((*s).to_string())).collect::<Vec<_>>();
//! table.push_row(row(["A", "1", "10"]))?;
//! table.push_row(row(["A", "5", "15"]))?;
//! table.push_row(row(["A", "20", "30"]))?;
//!
//! let outcome = table.validate();
//! assert_eq!(outcome.messages.len(), 2);
//! # Ok::<(), tablekey_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod datatype;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod message;
#[cfg(test)]
mod message_tests;
pub mod structure;
pub mod table;
pub mod unique_key;

pub use config::{
    ConfigError, LoggingConfig, TableKeyConfig, ValidationConfig,
    DEFAULT_AUTOMATIC_RANGE_THRESHOLD, DEFAULT_VIOLATION_CAP,
};
pub use datatype::{ParsedValue, ValueDatatype};
pub use error::{Error, Result};
pub use message::{
    Message, MessageList, Severity, MSGCODE_TOO_MANY_UNIQUE_KEY_VIOLATIONS,
    MSGCODE_UNIQUE_KEY_VIOLATION,
};
pub use structure::{
    Column, ColumnRange, KeyItem, RangeKind, Structure, TableStructure, UniqueKey,
};
pub use table::{Row, RowId, TableContents, TableRows};
pub use unique_key::{
    RangeCheck, UniqueKeyValidator, ValidationMode, ValidationOutcome, ValidatorStats,
};
