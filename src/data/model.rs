use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// Categorical and free-text columns both store [`Value::Text`]; the column's
/// [`Kind`] tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Missing,
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

// -- Manual Eq/Ord/Hash so Value can key BTreeSet and HashMap --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                DateTime(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Number(a), Number(b)) => unsigned_zero(*a).total_cmp(&unsigned_zero(*b)),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

/// `-0.0 == 0.0` under `PartialEq`, so `Ord` and `Hash` must agree.
fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(f) => unsigned_zero(*f).to_bits().hash(state),
            Value::DateTime(d) => d.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
            Value::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether two values are of the same variant (and so comparable).
    pub fn same_variant(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::DateTime(d)
    }
}

// ---------------------------------------------------------------------------
// Kind – inferred semantic type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Numeric,
    Categorical,
    Temporal,
    /// Free-form strings: no filter widget, passthrough in filtering.
    Text,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Numeric => "numeric",
            Kind::Categorical => "categorical",
            Kind::Temporal => "temporal",
            Kind::Text => "text",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: Kind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: Kind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, Kind::Numeric, values.into_iter().map(Value::Number).collect())
    }

    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            Kind::Categorical,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest non-missing value, if any.
    pub fn extent(&self) -> Option<(&Value, &Value)> {
        let mut present = self.values.iter().filter(|v| !v.is_missing());
        let first = present.next()?;
        Some(present.fold((first, first), |(lo, hi), v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }))
    }

    /// Sorted set of distinct non-missing values.
    pub fn unique_values(&self) -> BTreeSet<&Value> {
        self.values.iter().filter(|v| !v.is_missing()).collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete dataset or a view derived from it
// ---------------------------------------------------------------------------

/// Ordered collection of uniquely named, equal-length columns.
///
/// Tables are never mutated once built; operations return new tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, checking that column names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, EngineError> {
        let rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(EngineError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != rows {
                return Err(EngineError::LengthMismatch {
                    column: col.name.clone(),
                    expected: rows,
                    found: col.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&Column, EngineError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EngineError::UnknownColumn(name.to_string()))
    }

    /// Cell at `(row, column index)`.
    pub fn cell(&self, row: usize, col: usize) -> &Value {
        &self.columns[col].values[row]
    }

    /// New table holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: rows.iter().map(|&r| c.values[r].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            rows: rows.len(),
        }
    }

    /// New table with every column passed through `f`. `f` must keep lengths.
    pub(crate) fn map_columns(&self, f: impl FnMut(&Column) -> Column) -> Table {
        Table {
            columns: self.columns.iter().map(f).collect(),
            rows: self.rows,
        }
    }
}
