use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::model::{Column, Kind, Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFn {
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

impl AggregateFn {
    pub const ALL: [AggregateFn; 5] = [
        AggregateFn::Sum,
        AggregateFn::Mean,
        AggregateFn::Min,
        AggregateFn::Max,
        AggregateFn::Count,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Mean => "mean",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Count => "count",
        }
    }

    /// Whether the function is defined for columns of `kind`.
    pub fn accepts(self, kind: Kind) -> bool {
        self == AggregateFn::Count || kind == Kind::Numeric
    }

    fn compute(self, values: impl Iterator<Item = Value>) -> Value {
        let present = values.filter(|v| !v.is_missing());
        match self {
            AggregateFn::Count => Value::Number(present.count() as f64),
            AggregateFn::Sum => Value::Number(present.filter_map(|v| v.as_f64()).sum()),
            AggregateFn::Mean => {
                let (sum, n) = present
                    .filter_map(|v| v.as_f64())
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if n == 0 {
                    Value::Missing
                } else {
                    Value::Number(sum / n as f64)
                }
            }
            AggregateFn::Min => present
                .filter_map(|v| v.as_f64())
                .reduce(f64::min)
                .map_or(Value::Missing, Value::Number),
            AggregateFn::Max => present
                .filter_map(|v| v.as_f64())
                .reduce(f64::max)
                .map_or(Value::Missing, Value::Number),
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateFn::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown aggregate function: {s}"))
    }
}

/// Group rows by `group_column` and aggregate each target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub group_column: String,
    pub targets: Vec<(String, AggregateFn)>,
}

impl GroupSpec {
    pub fn new(group_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            targets: Vec::new(),
        }
    }

    /// Add a target. Repeating a `(column, function)` pair is a no-op.
    pub fn target(mut self, column: impl Into<String>, function: AggregateFn) -> Self {
        let target = (column.into(), function);
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
        self
    }

    /// Targets with repeated `(column, function)` pairs dropped, first
    /// occurrence kept.
    fn distinct_targets(&self) -> Vec<(&str, AggregateFn)> {
        let mut out: Vec<(&str, AggregateFn)> = Vec::with_capacity(self.targets.len());
        for (column, function) in &self.targets {
            if !out.contains(&(column.as_str(), *function)) {
                out.push((column.as_str(), *function));
            }
        }
        out
    }

    /// Output column name: the target's own name, suffixed with the function
    /// when the same column is aggregated with more than one function or is
    /// the group key.
    fn output_name(&self, column: &str, function: AggregateFn) -> String {
        let uses = self
            .distinct_targets()
            .iter()
            .filter(|(c, _)| *c == column)
            .count();
        if uses > 1 || column == self.group_column {
            format!("{column}_{function}")
        } else {
            column.to_string()
        }
    }
}

/// Row indices per group, groups in order of first appearance.
/// Missing forms a group of its own.
pub fn partition(column: &Column) -> Vec<(Value, Vec<usize>)> {
    let mut slot: HashMap<&Value, usize> = HashMap::new();
    let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
    for (row, value) in column.values.iter().enumerate() {
        let idx = *slot.entry(value).or_insert_with(|| {
            groups.push((value.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(row);
    }
    groups
}

pub fn apply(table: &Table, spec: &GroupSpec) -> Result<Table, EngineError> {
    if spec.targets.is_empty() {
        return Err(EngineError::EmptyAggregation);
    }
    let key = table.column(&spec.group_column)?;

    let mut targets = Vec::with_capacity(spec.targets.len());
    for (name, function) in spec.distinct_targets() {
        let column = table.column(name)?;
        if !function.accepts(column.kind) {
            return Err(EngineError::TypeMismatch {
                column: name.to_string(),
                function,
                kind: column.kind,
            });
        }
        targets.push((column, function));
    }

    let groups = partition(key);
    let mut columns = Vec::with_capacity(targets.len() + 1);
    columns.push(Column::new(
        key.name.clone(),
        key.kind,
        groups.iter().map(|(value, _)| value.clone()).collect(),
    ));
    for (column, function) in targets {
        let values = groups
            .iter()
            .map(|(_, rows)| function.compute(rows.iter().map(|&r| column.values[r].clone())))
            .collect();
        columns.push(Column::new(
            spec.output_name(&column.name, function),
            Kind::Numeric,
            values,
        ));
    }

    log::debug!(
        "Grouped {} rows by '{}' into {} groups",
        table.len(),
        spec.group_column,
        groups.len()
    );
    Table::new(columns)
}
