//! Cohort store
//!
//! One tabular dataset per cohort key, loaded from a workbook or CSV file,
//! with identifier and display-name columns inferred per file.

mod cohort;
mod columns;
mod registry;
mod table;
mod value;

pub use cohort::Cohort;
pub use columns::{ColumnInferencer, ColumnRoles};
pub use registry::CohortRegistry;
pub use table::{RawTable, SourceFormat};
pub use value::{format_number, Record, Schema, Value};
