use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};

use table_explorer::config::AppConfig;
use table_explorer::data::{
    apply_group, AggregateFn, Column, ExportFormat, Exporter, FilterSet, FilterSpec, GroupSpec,
    Kind, Pipeline, SortSpec, Table, Value,
};

// ---------------------------------------------------------------------------
// Per-column filter widgets
// ---------------------------------------------------------------------------

/// Widget state for one column's filter, chosen by the column's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    /// Numeric slider pair over the column's extent.
    Range { lo: f64, hi: f64, min: f64, max: f64 },
    /// Date pickers; `end` includes that whole day.
    Dates {
        start: NaiveDate,
        end: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
    /// Multiselect over the distinct labels. Nothing selected = no filter.
    Choice {
        options: Vec<Value>,
        selected: BTreeSet<Value>,
    },
    /// Free text, or a column without values to bound a widget.
    None,
}

impl FilterControl {
    pub fn for_column(column: &Column) -> Self {
        match column.kind {
            Kind::Numeric => match column.extent() {
                Some((Value::Number(min), Value::Number(max))) => FilterControl::Range {
                    lo: *min,
                    hi: *max,
                    min: *min,
                    max: *max,
                },
                _ => FilterControl::None,
            },
            Kind::Temporal => match column.extent() {
                Some((Value::DateTime(first), Value::DateTime(last))) => FilterControl::Dates {
                    start: first.date(),
                    end: last.date(),
                    first: first.date(),
                    last: last.date(),
                },
                _ => FilterControl::None,
            },
            Kind::Categorical => FilterControl::Choice {
                options: column.unique_values().into_iter().cloned().collect(),
                selected: BTreeSet::new(),
            },
            Kind::Text => FilterControl::None,
        }
    }

    /// The spec this widget currently asks for. Widgets left at their full
    /// extent ask for nothing, so rows with missing values stay visible.
    pub fn spec(&self) -> Option<FilterSpec> {
        match self {
            FilterControl::Range { lo, hi, min, max } => {
                (lo > min || hi < max).then(|| FilterSpec::range(*lo, *hi))
            }
            FilterControl::Dates {
                start,
                end,
                first,
                last,
            } => (start > first || end < last).then(|| {
                let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
                    .unwrap_or(NaiveTime::MIN);
                FilterSpec::range(start.and_time(NaiveTime::MIN), end.and_time(end_of_day))
            }),
            FilterControl::Choice { selected, .. } => {
                (!selected.is_empty()).then(|| FilterSpec::set(selected.iter().cloned()))
            }
            FilterControl::None => None,
        }
    }

    /// Back to "show everything".
    pub fn reset(&mut self) {
        match self {
            FilterControl::Range { lo, hi, min, max } => {
                *lo = *min;
                *hi = *max;
            }
            FilterControl::Dates {
                start,
                end,
                first,
                last,
            } => {
                *start = *first;
                *end = *last;
            }
            FilterControl::Choice { selected, .. } => selected.clear(),
            FilterControl::None => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnFilter {
    pub column: String,
    pub control: FilterControl,
}

// ---------------------------------------------------------------------------
// Group-by controls
// ---------------------------------------------------------------------------

/// One function applied to every selected numeric column.
#[derive(Debug, Clone)]
pub struct GroupControls {
    pub column: Option<String>,
    pub targets: BTreeSet<String>,
    pub function: AggregateFn,
}

impl Default for GroupControls {
    fn default() -> Self {
        Self {
            column: None,
            targets: BTreeSet::new(),
            function: AggregateFn::Sum,
        }
    }
}

impl GroupControls {
    pub fn spec(&self) -> Option<GroupSpec> {
        let column = self.column.as_ref()?;
        if self.targets.is_empty() {
            return None;
        }
        Some(
            self.targets
                .iter()
                .fold(GroupSpec::new(column.clone()), |spec, t| {
                    spec.target(t.clone(), self.function)
                }),
        )
    }
}

/// The action a status message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Filter,
    Group,
    Export,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub origin: Action,
    pub text: String,
}

/// Which table an export writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    View,
    Grouped,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Table as loaded (None until user loads a file). Never modified.
    pub original: Option<Table>,

    /// Filtered and sorted view of `original` (cached).
    pub view: Table,

    /// One filter widget per column, in column order.
    pub filters: Vec<ColumnFilter>,

    /// Sort column; `None` keeps load order.
    pub sort_column: Option<String>,
    pub sort_ascending: bool,

    pub group: GroupControls,

    /// Grouping of `original` for the current group controls.
    pub grouped: Option<Table>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            original: None,
            view: Table::default(),
            filters: Vec::new(),
            sort_column: None,
            sort_ascending: true,
            group: GroupControls::default(),
            grouped: None,
            status: None,
        }
    }

    /// Ingest a newly loaded table and reset every control.
    pub fn set_table(&mut self, table: Table) {
        self.filters = table
            .columns()
            .iter()
            .map(|c| ColumnFilter {
                column: c.name.clone(),
                control: FilterControl::for_column(c),
            })
            .collect();
        self.sort_column = None;
        self.sort_ascending = true;
        self.group = GroupControls::default();
        self.grouped = None;
        self.view = table.clone();
        self.original = Some(table);
        self.status = None;
    }

    pub fn filter_set(&self) -> FilterSet {
        self.filters
            .iter()
            .filter_map(|f| f.control.spec().map(|spec| (f.column.clone(), spec)))
            .collect()
    }

    pub fn pipeline(&self) -> Pipeline {
        let sort = self.sort_column.as_ref().map(|column| SortSpec {
            column: column.clone(),
            ascending: self.sort_ascending,
        });
        Pipeline::new().filters(self.filter_set()).sort(sort)
    }

    /// Recompute `view` after a filter or sort change.
    pub fn refresh(&mut self) {
        let Some(original) = &self.original else {
            return;
        };
        match self.pipeline().run(original) {
            Ok(view) => {
                self.view = view;
                self.clear_status(Action::Filter);
            }
            Err(e) => {
                log::error!("Filtering failed: {e}");
                self.report(Action::Filter, format!("Error: {e}"));
            }
        }
    }

    /// Recompute `grouped` after a group control change.
    pub fn regroup(&mut self) {
        self.grouped = None;
        let (Some(original), Some(spec)) = (&self.original, self.group.spec()) else {
            return;
        };
        match apply_group(original, &spec) {
            Ok(grouped) => {
                self.grouped = Some(grouped);
                self.clear_status(Action::Group);
            }
            Err(e) => {
                log::error!("Grouping failed: {e}");
                self.report(Action::Group, format!("Error while grouping: {e}"));
            }
        }
    }

    pub fn report(&mut self, origin: Action, text: impl Into<String>) {
        self.status = Some(Status {
            origin,
            text: text.into(),
        });
    }

    /// Drop the current message only if `origin` produced it.
    pub fn clear_status(&mut self, origin: Action) {
        if self.status.as_ref().is_some_and(|s| s.origin == origin) {
            self.status = None;
        }
    }

    pub fn reset_filters(&mut self) {
        for f in &mut self.filters {
            f.control.reset();
        }
        self.refresh();
    }

    /// Serialize the chosen table and write it to `path`.
    pub fn export(&self, source: ExportSource, format: ExportFormat, path: &Path) -> Result<()> {
        let table = match source {
            ExportSource::View => &self.view,
            ExportSource::Grouped => self.grouped.as_ref().context("nothing grouped yet")?,
        };
        let bytes = Exporter::new(self.config.sheet_name.clone()).serialize(table, format)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} rows to {}", table.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn sales() -> Table {
        let day = |d: u32| -> Value {
            NaiveDate::from_ymd_opt(2015, 1, d)
                .and_then(|date| date.and_hms_opt(15, 0, 0))
                .map(Value::DateTime)
                .unwrap()
        };
        Table::new(vec![
            Column::numeric("year", [2010.0, 2012.0, 2015.0, 2020.0]),
            Column::categorical("make", ["kia", "bmw", "kia", "bmw"]),
            Column::numeric("price", [5.0, 9.0, 7.0, 30.0]),
            Column::new("saledate", Kind::Temporal, vec![day(1), day(2), day(3), day(4)]),
        ])
        .unwrap()
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(sales());
        state
    }

    #[test]
    fn untouched_controls_request_no_filters() {
        let state = loaded();
        assert!(state.filter_set().is_empty());
        assert_eq!(state.view.len(), 4);
    }

    #[test]
    fn narrowed_slider_filters_the_view() {
        let mut state = loaded();
        if let FilterControl::Range { lo, .. } = &mut state.filters[0].control {
            *lo = 2012.0;
        }
        state.refresh();
        assert_eq!(state.view.len(), 3);
    }

    #[test]
    fn end_date_includes_the_whole_day() {
        let mut state = loaded();
        if let FilterControl::Dates { end, .. } = &mut state.filters[3].control {
            *end = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        }
        state.refresh();
        let dates: Vec<NaiveDateTime> = state
            .view
            .column("saledate")
            .unwrap()
            .values
            .iter()
            .filter_map(Value::as_datetime)
            .collect();
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn sort_and_reset() {
        let mut state = loaded();
        if let FilterControl::Choice { selected, .. } = &mut state.filters[1].control {
            selected.insert(Value::from("bmw"));
        }
        state.sort_column = Some("price".to_string());
        state.sort_ascending = false;
        state.refresh();
        assert_eq!(
            state.view.column("price").unwrap().values,
            vec![Value::Number(30.0), Value::Number(9.0)]
        );

        state.reset_filters();
        assert_eq!(state.view.len(), 4);
    }

    #[test]
    fn grouping_uses_the_original_table() {
        let mut state = loaded();
        if let FilterControl::Choice { selected, .. } = &mut state.filters[1].control {
            selected.insert(Value::from("kia"));
        }
        state.refresh();
        state.group.column = Some("make".to_string());
        state.group.targets.insert("price".to_string());
        state.group.function = AggregateFn::Mean;
        state.regroup();
        let grouped = state.grouped.as_ref().unwrap();
        assert_eq!(
            grouped.column("price").unwrap().values,
            vec![Value::Number(6.0), Value::Number(19.5)]
        );
    }

    #[test]
    fn grouping_errors_become_messages() {
        let mut state = loaded();
        state.group.column = Some("price".to_string());
        state.group.targets.insert("make".to_string());
        state.regroup();
        assert!(state.grouped.is_none());
        assert!(state.status.unwrap().text.contains("cannot compute sum"));
    }

    #[test]
    fn filtering_keeps_a_grouping_error_visible() {
        let mut state = loaded();
        state.group.column = Some("price".to_string());
        state.group.targets.insert("make".to_string());
        state.regroup();

        if let FilterControl::Range { lo, .. } = &mut state.filters[0].control {
            *lo = 2012.0;
        }
        state.refresh();
        assert_eq!(state.view.len(), 3);
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.origin, Action::Group);

        state.group.column = Some("make".to_string());
        state.group.targets = BTreeSet::from(["price".to_string()]);
        state.regroup();
        assert!(state.status.is_none());
    }
}
