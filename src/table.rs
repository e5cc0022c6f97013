use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::error::Error;

/// Station metadata from one source file's preamble, keyed by metadata column
/// name (`Location ID`, `Latitude`, `Time Zone`, `Elevation`, ...).
pub type SourceMetadata = BTreeMap<String, String>;

/// Tabular data combined from one or more CSV source files.
///
/// Rows keep source-file order first and in-file order second; `metadata`
/// holds one entry per source file, keyed by the file identifier (the archive
/// entry name, or a name derived from the download URL for a single CSV).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub metadata: BTreeMap<String, SourceMetadata>,
}

impl DataTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, by column name.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

struct ParsedSource {
    metadata: SourceMetadata,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Parses one NSRDB CSV payload.
///
/// The API emits a two-row preamble ahead of the data: row 1 holds the
/// station-metadata column names, row 2 their values. Row 3 carries the data
/// column names and everything after it is data.
fn parse_source(bytes: &[u8]) -> Result<ParsedSource, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = reader.records();

    let meta_keys = records.next().ok_or(Error::TruncatedCsv)??;
    let meta_values = records.next().ok_or(Error::TruncatedCsv)??;
    let column_row = records.next().ok_or(Error::TruncatedCsv)??;

    let metadata = meta_keys
        .iter()
        .enumerate()
        .filter(|(_, key)| !key.is_empty())
        .map(|(i, key)| {
            (
                key.to_string(),
                meta_values.get(i).unwrap_or("").to_string(),
            )
        })
        .collect();

    let columns = column_row.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ParsedSource {
        metadata,
        columns,
        rows,
    })
}

/// Combines CSV sources into one table, in source order.
///
/// Sources are expected to share one column schema (the API generates every
/// file of a request from the same attribute set); the column names of the
/// first source win.
pub(crate) fn assemble(sources: Vec<(String, Vec<u8>)>) -> Result<DataTable, Error> {
    let mut combined = DataTable::default();
    for (identifier, bytes) in sources {
        let parsed = parse_source(&bytes)?;
        if combined.columns.is_empty() {
            combined.columns = parsed.columns;
        }
        combined.rows.extend(parsed.rows);
        combined.metadata.insert(identifier, parsed.metadata);
    }
    Ok(combined)
}

pub(crate) fn from_single_csv(identifier: &str, bytes: &[u8]) -> Result<DataTable, Error> {
    assemble(vec![(identifier.to_string(), bytes.to_vec())])
}

/// Unpacks a generated-file archive and combines every CSV entry.
pub(crate) fn from_zip(bytes: &[u8]) -> Result<DataTable, Error> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut sources = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        sources.push((name, contents));
    }
    assemble(sources)
}
