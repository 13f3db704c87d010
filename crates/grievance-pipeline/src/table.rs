//! Tabular batch input
//!
//! A [`Table`] is a header row plus string records, read from comma-separated
//! text. [`ColumnAliases`] maps whatever header names the file uses onto the
//! ticket fields the batch processor needs.

use csv::ReaderBuilder;
use grievance_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Header row plus records, every record as wide as the header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from in-memory rows. Short rows are padded with empty
    /// cells and long rows truncated to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, mut row)| {
                if row.len() > width {
                    warn!(
                        "Row {} has {} fields but the header has {}; extra fields dropped",
                        index + 1,
                        row.len(),
                        width
                    );
                }
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read comma-separated data with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_csv_str(data: &str) -> Result<Self> {
        Self::from_reader(data.as_bytes())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Accepted header names per ticket field, most preferred first.
///
/// Matching ignores case, spaces, underscores and hyphens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnAliases {
    #[serde(default = "default_text_aliases")]
    pub text: Vec<String>,

    #[serde(default = "default_id_aliases")]
    pub id: Vec<String>,

    #[serde(default = "default_customer_aliases")]
    pub customer: Vec<String>,

    #[serde(default = "default_date_aliases")]
    pub date: Vec<String>,
}

/// Resolved column positions for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub text: usize,
    pub id: Option<usize>,
    pub customer: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnMap {
    /// Cell value, empty when the row is short
    pub fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map(String::as_str).unwrap_or("")
    }

    /// Trimmed cell value of an optional column, `None` when absent or blank
    pub fn optional<'a>(row: &'a [String], index: Option<usize>) -> Option<&'a str> {
        index
            .map(|i| Self::cell(row, i).trim())
            .filter(|value| !value.is_empty())
    }
}

impl ColumnAliases {
    /// Locate the ticket fields among `headers`.
    ///
    /// Only the complaint text column is required.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnMap> {
        let text = find_column(headers, &self.text).ok_or_else(|| {
            Error::MissingRequiredColumn {
                expected: self.text.clone(),
            }
        })?;

        Ok(ColumnMap {
            text,
            id: find_column(headers, &self.id),
            customer: find_column(headers, &self.customer),
            date: find_column(headers, &self.date),
        })
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            text: default_text_aliases(),
            id: default_id_aliases(),
            customer: default_customer_aliases(),
            date: default_date_aliases(),
        }
    }
}

fn find_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
    aliases.iter().find_map(|alias| {
        let alias = header_key(alias);
        keys.iter().position(|key| *key == alias)
    })
}

fn header_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '\u{feff}'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_text_aliases() -> Vec<String> {
    aliases(&["Complaint", "Text", "Complaint_Text", "Grievance", "Description"])
}

fn default_id_aliases() -> Vec<String> {
    aliases(&["Complaint_ID", "Ticket_ID", "ID"])
}

fn default_customer_aliases() -> Vec<String> {
    aliases(&["Customer", "Customer_Name", "Name"])
}

fn default_date_aliases() -> Vec<String> {
    aliases(&["Date", "Complaint_Date", "Created"])
}
