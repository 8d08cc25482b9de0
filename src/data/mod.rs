/// Data layer: core types, loading, and the filter / sort / group engine.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → raw Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  infer   │  classify columns → Numeric / Categorical / Temporal / Text
///   └──────────┘
///        │
///        ├──────────────────────────────┐
///        ▼                              ▼
///   ┌──────────┐   ┌──────────┐   ┌───────────┐
///   │  filter  │ → │   sort   │   │ aggregate │  (on the original table)
///   └──────────┘   └──────────┘   └───────────┘
///        │                              │
///        ▼                              ▼
///   ┌──────────┐
///   │  export  │  Table → CSV / XLSX bytes
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod infer;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod sort;

pub use aggregate::{AggregateFn, GroupSpec};
pub use error::{EngineError, LoadError};
pub use export::{ExportFormat, Exporter};
pub use filter::{FilterSet, FilterSpec, RangeFilter, SetFilter};
pub use infer::InferOptions;
pub use model::{Column, Kind, Table, Value};
pub use pipeline::{apply_filters, apply_group, apply_sort, export, infer_kinds, Pipeline};
pub use sort::SortSpec;
