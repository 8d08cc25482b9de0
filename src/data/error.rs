use thiserror::Error;

use super::aggregate::AggregateFn;
use super::model::Kind;

/// Failures of the filter / sort / group / export engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot compute {function} of {kind} column '{column}'")]
    TypeMismatch {
        column: String,
        function: AggregateFn,
        kind: Kind,
    },

    #[error("filter does not apply to {kind} column '{column}'")]
    FilterMismatch { column: String, kind: Kind },

    #[error("no aggregation targets selected")]
    EmptyAggregation,

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Failures while reading a table from a file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("invalid JSON layout: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
