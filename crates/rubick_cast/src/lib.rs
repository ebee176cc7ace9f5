//! `rubick_cast` v1:
//! Table kernel behind the CAST import-format converter.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : table model, options, reports and errors
//! - `table`  : table construction and lookups
//! - `util`   : pure helper functions
//! - `export` : reindex a table onto a template header
//! - `merge`  : SKU/Style left join
//! - `cast`   : sheet concatenation and the Types sheet
//! - `sample` : extract-missing and merge-sample follow-ups
pub mod cast;
pub mod conf;
pub mod export;
pub mod merge;
pub mod sample;
pub mod spec;
pub mod table;
pub mod util;

pub use cast::{concat_tables, derive_types_table};
pub use conf::{
    C_SHEET_TYPES, C_SHEET_VALUES, derive_default_exclude_sheets,
    derive_default_image_column_patterns, derive_default_style_column_patterns,
};
pub use export::{export, export_with_options};
pub use merge::{import_merge, import_merge_with_report};
pub use sample::{extract_missing, merge_sample};
pub use spec::{
    EnumCellValue, SchemaError, SpecExportOptions, SpecExportOutcome, SpecExportReport,
    SpecExtractMissingOptions, SpecExtractMissingOutcome, SpecKeyMapping, SpecMergeOutcome,
    SpecMergeReport, SpecMergeSampleOutcome, SpecTable,
};
pub use util::{compile_column_patterns, normalize_column_name};
