use super::aggregate::{self, GroupSpec};
use super::error::EngineError;
use super::export::{ExportFormat, Exporter};
use super::filter::{self, FilterSet, FilterSpec};
use super::infer::{self, InferOptions};
use super::model::Table;
use super::sort::{self, SortSpec};

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

pub fn infer_kinds(table: &Table) -> Table {
    infer::infer_kinds(table, &InferOptions::default())
}

pub fn apply_filters(table: &Table, specs: &FilterSet) -> Result<Table, EngineError> {
    filter::apply(table, specs)
}

pub fn apply_sort(table: &Table, spec: Option<&SortSpec>) -> Result<Table, EngineError> {
    sort::apply(table, spec)
}

pub fn apply_group(table: &Table, spec: &GroupSpec) -> Result<Table, EngineError> {
    aggregate::apply(table, spec)
}

pub fn export(table: &Table, format: ExportFormat) -> Result<Vec<u8>, EngineError> {
    Exporter::default().serialize(table, format)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Filters followed by an optional sort, built up declaratively and run
/// against any table. Running never touches the source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    filters: FilterSet,
    sort: Option<SortSpec>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the filter for `column`.
    pub fn filter(mut self, column: impl Into<String>, spec: FilterSpec) -> Self {
        self.filters.insert(column.into(), spec);
        self
    }

    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn sort(mut self, spec: Option<SortSpec>) -> Self {
        self.sort = spec;
        self
    }

    pub fn filter_set(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn run(&self, table: &Table) -> Result<Table, EngineError> {
        let filtered = apply_filters(table, &self.filters)?;
        let view = apply_sort(&filtered, self.sort.as_ref())?;
        log::debug!(
            "Pipeline: {} filters, sort {:?}: {} of {} rows",
            self.filters.len(),
            self.sort.as_ref().map(|s| s.column.as_str()),
            view.len(),
            table.len()
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::AggregateFn;
    use crate::data::model::{Column, Value};

    fn cars() -> Table {
        Table::new(vec![
            Column::numeric("year", [2010.0, 2012.0, 2015.0, 2020.0, 2013.0]),
            Column::categorical("make", ["kia", "bmw", "kia", "bmw", "kia"]),
            Column::numeric("price", [5.0, 9.0, 7.0, 30.0, 6.0]),
        ])
        .unwrap()
    }

    #[test]
    fn filters_then_sorts() {
        let pipeline = Pipeline::new()
            .filter("make", FilterSpec::set(["kia"]))
            .filter("year", FilterSpec::range(2011.0, 2020.0))
            .sort(Some(SortSpec::descending("price")));
        let view = pipeline.run(&cars()).unwrap();
        assert_eq!(
            view.column("year").unwrap().values,
            vec![Value::Number(2015.0), Value::Number(2013.0)]
        );
    }

    #[test]
    fn source_table_is_untouched() {
        let original = cars();
        let before = original.clone();
        let _ = Pipeline::new()
            .filter("year", FilterSpec::range(2015.0, 2015.0))
            .run(&original)
            .unwrap();
        assert_eq!(original, before);
    }

    #[test]
    fn grouping_runs_on_any_table() {
        let spec = GroupSpec::new("make").target("price", AggregateFn::Max);
        let view = Pipeline::new()
            .filter("make", FilterSpec::set(["kia"]))
            .run(&cars())
            .unwrap();
        assert_eq!(apply_group(&cars(), &spec).unwrap().len(), 2);
        assert_eq!(
            apply_group(&view, &spec).unwrap().column("price").unwrap().values,
            vec![Value::Number(7.0)]
        );
    }

    #[test]
    fn reinference_keeps_kinds() {
        let table = cars();
        assert_eq!(infer_kinds(&table), table);
    }
}
