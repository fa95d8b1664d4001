//! Value datatypes used to order range boundaries.
//!
//! Table cells are stored as text. Range keys compare their boundaries with
//! the declared datatype of the from-column, so `"9" < "10"` for integers and
//! `2024-02-01 < 2024-10-01` for dates. Anything that does not parse is "not
//! parsable" and never takes part in range ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Datatype of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDatatype {
    /// 64-bit signed integer.
    Integer,
    /// Finite floating point number.
    Decimal,
    /// Calendar date in ISO `YYYY-MM-DD` form.
    Date,
    /// `true` or `false`.
    Boolean,
    /// Arbitrary text, ordered lexically.
    String,
}

impl ValueDatatype {
    /// Resolves a datatype name as written in a structure definition.
    ///
    /// Matching is case-insensitive and accepts a few common aliases.
    /// Returns `None` for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" => Some(Self::Integer),
            "decimal" | "double" | "float" => Some(Self::Decimal),
            "date" | "localdate" | "gregoriancalendar" => Some(Self::Date),
            "boolean" | "bool" => Some(Self::Boolean),
            "string" | "text" => Some(Self::String),
            _ => None,
        }
    }

    /// Returns the canonical name of the datatype.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::Boolean => "Boolean",
            Self::String => "String",
        }
    }

    /// Parses a cell value. Empty values are never parsable.
    #[must_use]
    pub fn parse(&self, value: &str) -> Option<ParsedValue> {
        if value.is_empty() {
            return None;
        }
        match self {
            Self::Integer => value.trim().parse().ok().map(ParsedValue::Integer),
            Self::Decimal => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParsedValue::Decimal),
            Self::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .ok()
                .map(ParsedValue::Date),
            Self::Boolean => match value.trim() {
                "true" => Some(ParsedValue::Boolean(true)),
                "false" => Some(ParsedValue::Boolean(false)),
                _ => None,
            },
            Self::String => Some(ParsedValue::Text(value.to_string())),
        }
    }

    /// Returns true if `value` parses under this datatype.
    #[must_use]
    pub fn is_parsable(&self, value: &str) -> bool {
        self.parse(value).is_some()
    }

    /// Compares two cell values under this datatype.
    ///
    /// Returns `None` if either value is not parsable.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        Some(self.parse(a)?.cmp(&self.parse(b)?))
    }
}

impl fmt::Display for ValueDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell value parsed under its column's datatype.
///
/// Values of one datatype are totally ordered. Values of different datatypes
/// never meet inside one range item and are ordered by datatype only.
#[derive(Debug, Clone)]
pub enum ParsedValue {
    /// Integer value.
    Integer(i64),
    /// Decimal value, always finite.
    Decimal(f64),
    /// Date value.
    Date(NaiveDate),
    /// Boolean value.
    Boolean(bool),
    /// Text value.
    Text(String),
}

impl ParsedValue {
    const fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Decimal(_) => 1,
            Self::Date(_) => 2,
            Self::Boolean(_) => 3,
            Self::Text(_) => 4,
        }
    }
}

impl Ord for ParsedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ParsedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParsedValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedValue {}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}
