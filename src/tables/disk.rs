use crate::error::TableError;
use crate::tables::table::{ParseOptions, Row, Table};
use serde::Serialize;

/// Column names of `df -h` output, in order
pub const DEFAULT_DISK_COLUMNS: [&str; 6] = ["Filesystem", "Size", "Used", "Avail", "Use%", "Mounted"];

/// One mounted filesystem from `df -h`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRecord {
    pub filesystem: String,
    /// Human readable sizes exactly as printed by `df -h`
    pub size: String,
    pub used: String,
    pub avail: String,
    /// Capacity in percent, `None` when df prints `-`
    pub use_percent: Option<f64>,
    pub mounted: String,
}

/// Typed disk usage table parsed from a `df -h` dump
#[derive(Debug, Clone, PartialEq)]
pub struct DiskTable {
    table: Table,
    records: Vec<DiskRecord>,
}

impl DiskTable {
    /// Parse `df -h` text, keeping every filesystem in file order
    ///
    /// # Arguments
    ///
    /// * `text` - Contents of the disk usage log
    /// * `columns` - The six `df -h` column names
    ///
    /// # Errors
    ///
    /// - `TableError::MissingFields` for a truncated line
    /// - `TableError::InvalidValue` when Use% is neither `-` nor a percentage
    /// - `TableError::Schema` when `columns` does not have six names
    pub fn parse(text: &str, columns: &[String]) -> Result<Self, TableError> {
        let table = Table::parse(text, columns, ParseOptions::default())?;
        Self::from_table(table)
    }

    /// Convert a generic table into typed disk records, by position
    pub fn from_table(table: Table) -> Result<Self, TableError> {
        if table.columns().len() != DEFAULT_DISK_COLUMNS.len() {
            return Err(TableError::Schema {
                expected: DEFAULT_DISK_COLUMNS.len(),
                found: table.columns().len(),
            });
        }

        let records = table
            .rows()
            .iter()
            .map(|row| record_from_row(row, table.columns()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { table, records })
    }

    pub fn records(&self) -> &[DiskRecord] {
        &self.records
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

fn record_from_row(row: &Row, columns: &[String]) -> Result<DiskRecord, TableError> {
    Ok(DiskRecord {
        filesystem: row.cells[0].clone(),
        size: row.cells[1].clone(),
        used: row.cells[2].clone(),
        avail: row.cells[3].clone(),
        use_percent: parse_percent(row, columns, 4)?,
        mounted: row.cells[5].clone(),
    })
}

fn parse_percent(row: &Row, columns: &[String], index: usize) -> Result<Option<f64>, TableError> {
    let raw = row.cells[index].as_str();
    if raw == "-" {
        return Ok(None);
    }

    match raw.trim_end_matches('%').parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(TableError::InvalidValue {
            line: row.line,
            column: columns[index].clone(),
            value: raw.to_string(),
        }),
    }
}
