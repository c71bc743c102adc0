use anyhow::{Context, Result};
use std::path::Path;

/// A CSV file read without interpreting its first row.
/// The first row doubles as the header for keyed lookups.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file, stripping a UTF-8 byte order mark if present
    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }
        Ok(Self { rows })
    }

    /// Header cells, trimmed. Empty when the file has no rows.
    pub fn header(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|r| r.iter().map(|h| h.trim()).collect())
            .unwrap_or_default()
    }

    /// Every row, the header row included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows after the header, each paired with a keyed accessor
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        let header = self.header();
        self.rows
            .iter()
            .skip(1)
            .map(move |row| Record { header: header.clone(), row })
    }
}

/// One data row addressed by header name
pub struct Record<'a> {
    header: Vec<&'a str>,
    row: &'a [String],
}

impl<'a> Record<'a> {
    /// Raw value of a column. A repeated column name resolves to its last occurrence.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.header.iter().rposition(|h| *h == column)?;
        self.row.get(idx).map(|v| v.as_str())
    }

    /// First non-empty raw value among `columns`, trimmed. Empty string when none match.
    pub fn first_of(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.is_empty())
            .unwrap_or("")
            .trim()
            .to_string()
    }
}
