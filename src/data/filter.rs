use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::model::{Column, Kind, Table, Value};

// ---------------------------------------------------------------------------
// Filter specs
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]` over numbers or date-times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: Value,
    pub max: Value,
}

impl RangeFilter {
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        !value.is_missing()
            && value.same_variant(&self.min)
            && value.same_variant(&self.max)
            && &self.min <= value
            && value <= &self.max
    }
}

/// Membership in a set of allowed values. An empty set allows everything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetFilter {
    pub allowed: BTreeSet<Value>,
}

impl SetFilter {
    pub fn new<V: Into<Value>>(allowed: impl IntoIterator<Item = V>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        self.allowed.is_empty() || self.allowed.contains(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterSpec {
    Range(RangeFilter),
    Set(SetFilter),
}

impl FilterSpec {
    pub fn range(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        FilterSpec::Range(RangeFilter::new(min, max))
    }

    pub fn set<V: Into<Value>>(allowed: impl IntoIterator<Item = V>) -> Self {
        FilterSpec::Set(SetFilter::new(allowed))
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FilterSpec::Range(r) => r.matches(value),
            FilterSpec::Set(s) => s.matches(value),
        }
    }
}

/// Per-column filter specs: column name → spec.
/// Columns absent from the map are not filtered.
pub type FilterSet = BTreeMap<String, FilterSpec>;

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

fn check_applicable(column: &Column, spec: &FilterSpec) -> Result<(), EngineError> {
    let mismatch = || EngineError::FilterMismatch {
        column: column.name.clone(),
        kind: column.kind,
    };
    match (column.kind, spec) {
        (Kind::Numeric, FilterSpec::Range(r)) => {
            if r.min.as_f64().is_some() && r.max.as_f64().is_some() {
                Ok(())
            } else {
                Err(mismatch())
            }
        }
        (Kind::Temporal, FilterSpec::Range(r)) => {
            if r.min.as_datetime().is_some() && r.max.as_datetime().is_some() {
                Ok(())
            } else {
                Err(mismatch())
            }
        }
        (Kind::Categorical, FilterSpec::Range(_)) => Err(mismatch()),
        _ => Ok(()),
    }
}

/// Return indices of rows that pass all filters, in table order.
///
/// A row passes a column filter when:
/// * the column is Text → passes (free text is never filtered)
/// * the spec is a range → the value is present and within `[min, max]`
/// * the spec is a set → the set is empty, or contains the value
pub fn filtered_indices(table: &Table, filters: &FilterSet) -> Result<Vec<usize>, EngineError> {
    let mut active: Vec<(&Column, &FilterSpec)> = Vec::with_capacity(filters.len());
    for (name, spec) in filters {
        let column = table.column(name)?;
        if column.kind == Kind::Text {
            log::warn!("Ignoring filter on free-text column '{name}'");
            continue;
        }
        check_applicable(column, spec)?;
        active.push((column, spec));
    }

    Ok((0..table.len())
        .filter(|&row| {
            active
                .iter()
                .all(|(column, spec)| spec.matches(&column.values[row]))
        })
        .collect())
}

/// Apply all filters, returning a new table with the kept rows.
pub fn apply(table: &Table, filters: &FilterSet) -> Result<Table, EngineError> {
    if filters.is_empty() {
        return Ok(table.clone());
    }
    let rows = filtered_indices(table, filters)?;
    Ok(table.take(&rows))
}
