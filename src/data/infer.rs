use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::model::{Column, Kind, Table, Value};

/// Raw tokens read as missing values.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

/// Thresholds for telling categorical columns from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferOptions {
    /// Upper bound on `distinct / non-missing` for a categorical column.
    pub categorical_ratio: f64,
    /// Upper bound on the number of distinct categorical values.
    pub max_categories: usize,
    /// Treat columns whose name contains "date" as temporal when most values parse.
    pub date_name_hint: bool,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            categorical_ratio: 0.5,
            max_categories: 1000,
            date_name_hint: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw token parsing
// ---------------------------------------------------------------------------

/// Turn a raw text field into a [`Value`]: missing tokens become
/// [`Value::Missing`], everything else stays text until inference.
pub fn raw_value(field: &str) -> Value {
    let trimmed = field.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        Value::Missing
    } else {
        Value::Text(field.to_string())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%a %b %d %Y %H:%M:%S GMT%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse an explicit date or date-time. Offsets are dropped and the local
/// wall-clock time is kept.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // "Tue Dec 16 2014 12:30:00 GMT-0800 (PST)": the zone name adds nothing.
    let s = match s.find(" (") {
        Some(idx) if s.ends_with(')') => &s[..idx],
        _ => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_number(s),
        _ => None,
    }
}

fn as_datetime(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::DateTime(d) => Some(*d),
        Value::Text(s) => parse_datetime(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn is_date_name(name: &str) -> bool {
    name.to_ascii_lowercase().contains("date")
}

/// Classify a column from its name and values.
///
/// Works on raw text values as well as already converted ones, so
/// classifying a coerced column returns the kind it was coerced to.
pub fn classify(name: &str, values: &[Value], options: &InferOptions) -> Kind {
    let present: Vec<&Value> = values.iter().filter(|v| !v.is_missing()).collect();
    if present.is_empty() {
        return Kind::Text;
    }

    if present.iter().all(|v| as_number(v).is_some()) {
        return Kind::Numeric;
    }

    let parsed = present.iter().filter(|v| as_datetime(v).is_some()).count();
    if parsed == present.len()
        || (options.date_name_hint && is_date_name(name) && parsed * 2 > present.len())
    {
        return Kind::Temporal;
    }

    let distinct: HashSet<&Value> = present.iter().copied().collect();
    let ratio_limit = options.categorical_ratio * present.len() as f64;
    if distinct.len() as f64 <= ratio_limit && distinct.len() <= options.max_categories {
        Kind::Categorical
    } else {
        Kind::Text
    }
}

/// Convert values to the representation of `kind`. Values that cannot be
/// converted become missing.
pub fn coerce(values: &[Value], kind: Kind) -> Vec<Value> {
    values
        .iter()
        .map(|v| {
            if v.is_missing() {
                return Value::Missing;
            }
            match kind {
                Kind::Numeric => as_number(v).map_or(Value::Missing, Value::Number),
                Kind::Temporal => as_datetime(v).map_or(Value::Missing, Value::DateTime),
                Kind::Categorical | Kind::Text => match v {
                    Value::Text(_) => v.clone(),
                    other => Value::Text(other.to_string()),
                },
            }
        })
        .collect()
}

/// Classify and convert one column.
pub fn infer_column(column: &Column, options: &InferOptions) -> Column {
    let kind = classify(&column.name, &column.values, options);
    Column::new(column.name.clone(), kind, coerce(&column.values, kind))
}

/// Reclassify every column of a table.
pub fn infer_kinds(table: &Table, options: &InferOptions) -> Table {
    table.map_columns(|c| infer_column(c, options))
}
