use crate::error::TableError;
use crate::tables::table::{ParseOptions, Row, Table};
use serde::Serialize;
use std::str::FromStr;

/// Column names of `ps aux` output, in order
pub const DEFAULT_PROCESS_COLUMNS: [&str; 11] = [
    "USER", "PID", "CPU", "MEM", "VSZ", "RSS", "TTY", "STAT", "START", "TIME", "COMMAND",
];

/// One process line from `ps aux`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub user: String,
    pub pid: u32,
    /// CPU usage percentage
    pub cpu: f64,
    /// Share of physical memory in percent
    pub mem: f64,
    /// Virtual size in KiB
    pub vsz: u64,
    /// Resident set size in KiB
    pub rss: u64,
    pub tty: String,
    pub stat: String,
    pub start: String,
    pub time: String,
    pub command: String,
}

/// Typed process table parsed from a `ps aux` dump
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessTable {
    table: Table,
    records: Vec<ProcessRecord>,
}

impl ProcessTable {
    /// Parse `ps aux` text; `#` comment lines are ignored
    ///
    /// # Arguments
    ///
    /// * `text` - Contents of the process log
    /// * `columns` - The eleven `ps aux` column names
    ///
    /// # Errors
    ///
    /// - `TableError::MissingFields` for a truncated line
    /// - `TableError::InvalidValue` when PID, %CPU, %MEM, VSZ or RSS is not
    ///   a finite number
    /// - `TableError::Schema` when `columns` does not have eleven names
    pub fn parse(text: &str, columns: &[String]) -> Result<Self, TableError> {
        let table = Table::parse(
            text,
            columns,
            ParseOptions {
                skip_comments: true,
            },
        )?;
        Self::from_table(table)
    }

    /// Convert a generic table into typed process records
    ///
    /// Columns are mapped by position, not by name.
    pub fn from_table(table: Table) -> Result<Self, TableError> {
        if table.columns().len() != DEFAULT_PROCESS_COLUMNS.len() {
            return Err(TableError::Schema {
                expected: DEFAULT_PROCESS_COLUMNS.len(),
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

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The `n` processes using the most memory, highest first
    ///
    /// Processes with equal memory keep their order from the source file.
    ///
    /// # Returns
    ///
    /// `min(n, len)` records, borrowed from the table
    pub fn top_by_memory(&self, n: usize) -> Vec<&ProcessRecord> {
        let mut sorted: Vec<&ProcessRecord> = self.records.iter().collect();
        // sort_by is stable, which keeps ties in file order
        sorted.sort_by(|a, b| b.mem.total_cmp(&a.mem));
        sorted.truncate(n);
        sorted
    }
}

fn record_from_row(row: &Row, columns: &[String]) -> Result<ProcessRecord, TableError> {
    let cell = |i: usize| row.cells[i].clone();

    Ok(ProcessRecord {
        user: cell(0),
        pid: parse_cell(row, columns, 1)?,
        cpu: parse_percent(row, columns, 2)?,
        mem: parse_percent(row, columns, 3)?,
        vsz: parse_cell(row, columns, 4)?,
        rss: parse_cell(row, columns, 5)?,
        tty: cell(6),
        stat: cell(7),
        start: cell(8),
        time: cell(9),
        command: cell(10),
    })
}

fn parse_cell<T: FromStr>(
    row: &Row,
    columns: &[String],
    index: usize,
) -> Result<T, TableError> {
    row.cells[index]
        .parse()
        .map_err(|_| invalid_value(row, columns, index))
}

/// `NaN` and `inf` parse as `f64` but are not percentages
fn parse_percent(row: &Row, columns: &[String], index: usize) -> Result<f64, TableError> {
    let value: f64 = parse_cell(row, columns, index)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_value(row, columns, index))
    }
}

fn invalid_value(row: &Row, columns: &[String], index: usize) -> TableError {
    TableError::InvalidValue {
        line: row.line,
        column: columns[index].clone(),
        value: row.cells[index].clone(),
    }
}
