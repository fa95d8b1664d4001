//! Loading of structure and table contents files.
//!
//! CSV columns are matched to structure columns by header name. Unknown CSV
//! columns are ignored and structure columns missing from the file stay
//! null.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tablekey_core::{Structure, TableContents, ValidationConfig};

/// What happened while reading a contents file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of rows read.
    pub rows: usize,
    /// CSV headers without a matching structure column.
    pub ignored_columns: Vec<String>,
    /// Structure columns absent from the CSV.
    pub missing_columns: Vec<String>,
}

/// Reads a structure definition.
pub fn load_structure(path: &Path) -> Result<Structure> {
    Structure::load(path).with_context(|| format!("Failed to load structure {}", path.display()))
}

/// Reads a CSV file into a new table.
pub fn load_contents(
    path: &Path,
    structure: Structure,
    config: ValidationConfig,
) -> Result<(TableContents, LoadStats)> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("contents")
        .to_string();
    read_contents(BufReader::new(file), name, structure, config)
}

/// Reads CSV records from any reader into a new table.
pub fn read_contents<R: Read>(
    reader: R,
    name: String,
    structure: Structure,
    config: ValidationConfig,
) -> Result<(TableContents, LoadStats)> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let mut stats = LoadStats::default();
    // Structure column position → CSV field position
    let mut mapping: Vec<Option<usize>> = Vec::with_capacity(structure.columns().len());
    for column in structure.columns() {
        let position = headers.iter().position(|h| h.trim() == column.name);
        if position.is_none() {
            stats.missing_columns.push(column.name.clone());
        }
        mapping.push(position);
    }
    stats.ignored_columns = headers
        .iter()
        .filter(|h| !structure.columns().iter().any(|c| c.name == h.trim()))
        .map(str::to_string)
        .collect();

    if !stats.missing_columns.is_empty() {
        tracing::warn!(columns = ?stats.missing_columns, "Structure columns missing from CSV");
    }
    if !stats.ignored_columns.is_empty() {
        tracing::debug!(columns = ?stats.ignored_columns, "Ignoring CSV columns");
    }

    let mut table = TableContents::with_config(name, structure, config);
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let values = mapping
            .iter()
            .map(|position| position.and_then(|p| record.get(p)).map(str::to_string))
            .collect();
        table.push_row(values)?;
        stats.rows += 1;
    }

    tracing::debug!(rows = stats.rows, "Loaded table contents");
    Ok((table, stats))
}
