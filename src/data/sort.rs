use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::model::{Table, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Missing values go last in either direction.
fn compare(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if ascending => a.cmp(b),
        (false, false) => b.cmp(a),
    }
}

/// Row order for `spec`. Stable: equal keys keep their input order.
pub fn sorted_indices(table: &Table, spec: &SortSpec) -> Result<Vec<usize>, EngineError> {
    let values = &table.column(&spec.column)?.values;
    let mut rows: Vec<usize> = (0..table.len()).collect();
    rows.sort_by(|&a, &b| compare(&values[a], &values[b], spec.ascending));
    Ok(rows)
}

pub fn apply(table: &Table, spec: Option<&SortSpec>) -> Result<Table, EngineError> {
    match spec {
        None => Ok(table.clone()),
        Some(spec) => Ok(table.take(&sorted_indices(table, spec)?)),
    }
}
