use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::data_models::{Row, Table};
use crate::error::TableError;

/// Column names as constants for consistency
pub mod columns {
    pub const QUERY: &str = "Query";
    pub const EXPECTED_GROUPS: &str = "Expected Groups";
    pub const VALIDATION: &str = "Google Search Validation";
}

pub const TEMPLATE_QUERY: &str = "\"Top Trader Jobe Goods\"";
pub const TEMPLATE_EXPECTED: &str = "2324243,425343141";

pub fn load(path: impl AsRef<Path>) -> Result<Table, TableError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(TableError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let query_idx = column_index(&headers, columns::QUERY)?;
    let expected_idx = column_index(&headers, columns::EXPECTED_GROUPS)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let query = record.get(query_idx).unwrap_or("").to_string();
        let expected = record.get(expected_idx).unwrap_or("").to_string();
        rows.push(Row::new(record, query, expected));
    }

    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(Table { headers, rows })
}

/// Write the table with the verdict column. An existing verdict column is
/// overwritten in place, otherwise one is appended. Every row is written
/// with exactly as many cells as the header.
pub fn save(table: &Table, path: impl AsRef<Path>) -> Result<(), TableError> {
    let path = path.as_ref();
    let existing = table
        .headers
        .iter()
        .position(|h| h.trim() == columns::VALIDATION);

    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut headers = table.headers.clone();
    if existing.is_none() {
        headers.push_field(columns::VALIDATION);
    }
    writer.write_record(&headers)?;

    for row in &table.rows {
        let verdict = row.verdict.map(|v| v.as_str()).unwrap_or("");
        let mut fields: Vec<&str> = (0..table.headers.len())
            .map(|idx| row.record.get(idx).unwrap_or(""))
            .collect();
        match existing {
            Some(idx) => fields[idx] = verdict,
            None => fields.push(verdict),
        }
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Create an input file holding one example row, for a first run without one.
pub fn write_template(path: impl AsRef<Path>) -> Result<(), TableError> {
    let mut writer = WriterBuilder::new().from_path(path.as_ref())?;
    writer.write_record([columns::QUERY, columns::EXPECTED_GROUPS])?;
    writer.write_record([TEMPLATE_QUERY, TEMPLATE_EXPECTED])?;
    writer.flush()?;
    Ok(())
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, TableError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))
}
