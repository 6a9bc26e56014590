//! Header-keyed CSV reading and writing.

use crate::transfer::TransferError;

/// One data row, addressed by (lowercased) header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRecord {
    /// 1-based line number in the source text.
    pub line: u64,
    fields: Vec<(String, String)>,
}

impl TabularRecord {
    /// First non-blank value among the given column aliases (lowercase).
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            self.fields
                .iter()
                .find(|(header, _)| header == alias)
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        })
    }
}

/// A parsed table: normalized headers plus the ordered data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<TabularRecord>,
}

impl Table {
    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.headers.iter().any(|h| aliases.contains(&h.as_str()))
    }
}

/// Parse CSV text with a header row. Header matching is case-insensitive.
///
/// Blank rows are dropped; ragged rows are reported as errors.
pub fn parse_table(text: &str) -> Result<Table, TransferError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(table_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TransferError::MissingHeader);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(table_error)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields =
            headers.iter().cloned().zip(record.iter().map(str::to_string)).collect::<Vec<_>>();
        records.push(TabularRecord { line, fields });
    }

    Ok(Table { headers, records })
}

/// Render rows as CSV with the given header row.
pub fn write_table<I>(headers: &[&str], rows: I) -> Result<String, TransferError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).map_err(write_error)?;
    for row in rows {
        writer.write_record(&row).map_err(write_error)?;
    }
    let bytes = writer.into_inner().map_err(|e| TransferError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TransferError::Write(e.to_string()))
}

fn table_error(err: csv::Error) -> TransferError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    TransferError::Table { line, message: err.to_string() }
}

fn write_error(err: csv::Error) -> TransferError {
    TransferError::Write(err.to_string())
}
