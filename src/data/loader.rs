use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::infer::{infer_kinds, raw_value, InferOptions};
use super::model::{Column, Kind, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row, RFC 4180 quoting
/// * `.json` – `[{ "make": "Kia", "year": 2015, ... }, ...]`
///
/// Column kinds are inferred before the table is returned.
pub fn load_file(path: &Path, options: &InferOptions) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?, options)?,
        "json" => read_json(&std::fs::read_to_string(path)?, options)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

fn check_unique(headers: &[String]) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    match headers.iter().find(|h| !seen.insert(h.as_str())) {
        Some(dup) => Err(LoadError::DuplicateColumn(dup.clone())),
        None => Ok(()),
    }
}

fn build(headers: Vec<String>, cells: Vec<Vec<Value>>, options: &InferOptions) -> Result<Table, LoadError> {
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, Kind::Text, values))
        .collect();
    Ok(infer_kinds(&Table::new(columns)?, options))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV with a header row. Every record must have as many fields as the
/// header.
pub fn read_csv<R: Read>(source: R, options: &InferOptions) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    check_unique(&headers)?;

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(LoadError::RaggedRow {
                line: record.position().map_or(0, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(raw_value(field));
        }
    }

    build(headers, cells, options)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
/// Columns are the union of keys, in order of first appearance; absent keys
/// are missing values.
pub fn read_json(text: &str, options: &InferOptions) -> Result<Table, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidJson("expected top-level array".to_string()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::InvalidJson(format!("row {i} is not an object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let cells = headers
        .iter()
        .map(|h| {
            records
                .iter()
                .map(|rec| rec.get(h).map_or(Value::Missing, json_to_value))
                .collect()
        })
        .collect();

    build(headers, cells, options)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::Null => Value::Missing,
        JsonValue::String(s) => raw_value(s),
        JsonValue::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
        other => Value::Text(other.to_string()),
    }
}
