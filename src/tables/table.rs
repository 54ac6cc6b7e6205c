use crate::error::TableError;
use log::debug;
use std::fmt::Write as _;

/// How raw text lines are turned into rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Skip lines whose first non-blank character is `#`
    pub skip_comments: bool,
}

/// One parsed row with its source line number (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<String>,
}

/// In-memory table with fixed, named columns
///
/// Cells are kept as text; typed views such as
/// [`ProcessTable`](crate::tables::ProcessTable) convert them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Parse whitespace-delimited text into a table with the given columns
    ///
    /// Fields are assigned positionally. Extra fields are joined into the
    /// last column with single spaces, so `ps` commands with arguments and
    /// mount points containing spaces stay intact.
    ///
    /// Only the first non-blank line (after comments, when skipped) can be the
    /// tool's own header. It is dropped when its leading fields name the
    /// leading columns, see [`is_header`]. Later lines are always data, so a
    /// process owned by an account called `user` is kept.
    ///
    /// # Arguments
    ///
    /// * `text` - Raw file contents
    /// * `columns` - Column names, in file order
    /// * `options` - Line filtering options
    ///
    /// # Errors
    ///
    /// - `TableError::Schema` if `columns` is empty
    /// - `TableError::MissingFields` for a row with fewer fields than columns
    pub fn parse(text: &str, columns: &[String], options: ParseOptions) -> Result<Self, TableError> {
        let width = columns.len();
        if width == 0 {
            return Err(TableError::Schema {
                expected: 1,
                found: 0,
            });
        }
        let mut rows = Vec::new();
        let mut seen_content = false;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            if options.skip_comments && trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();

            let first_content = !seen_content;
            seen_content = true;
            if first_content && is_header(&fields, columns) {
                debug!("Skipping header line {}: {}", line_no, trimmed);
                continue;
            }

            if fields.len() < width {
                return Err(TableError::MissingFields {
                    line: line_no,
                    expected: width,
                    found: fields.len(),
                });
            }

            let mut cells: Vec<String> = fields[..width - 1].iter().map(|f| f.to_string()).collect();
            cells.push(fields[width - 1..].join(" "));

            rows.push(Row {
                line: line_no,
                cells,
            });
        }

        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the first `n` rows as an aligned text block, header included
    pub fn preview(&self, n: usize) -> String {
        let shown = &self.rows[..n.min(self.rows.len())];

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in shown {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        let render = |out: &mut String, cells: &[String]| {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            let _ = writeln!(out, "{}", line.join("  ").trim_end());
        };

        render(&mut out, self.columns.as_slice());
        for row in shown {
            render(&mut out, row.cells.as_slice());
        }
        if self.rows.len() > shown.len() {
            let _ = writeln!(out, "... {} more rows", self.rows.len() - shown.len());
        }

        out
    }
}

/// Whether `fields` is a header line for `columns`
///
/// The first field must equal the first column name and, for tables with more
/// than one column, the second field must equal the second column name. Names
/// are compared ignoring case and a leading or trailing `%`, so `%CPU` matches
/// `CPU` and `Use%` matches `use`.
fn is_header(fields: &[&str], columns: &[String]) -> bool {
    let same = |field: &str, name: &str| {
        field
            .trim_matches('%')
            .eq_ignore_ascii_case(name.trim_matches('%'))
    };

    columns
        .iter()
        .take(2)
        .enumerate()
        .all(|(i, name)| fields.get(i).is_some_and(|field| same(field, name.as_str())))
}
