//! `rubick_cast_io_xlsx` v1:
//! Workbook I/O for `rubick_cast` tables.
//!
//! Modules:
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : read/write options, reports and `WorkbookError`
//! - `util`   : header de-duplication, sheet naming, slicing, width estimation
//! - `reader` : calamine-backed worksheet reader
//! - `writer` : rust_xlsxwriter-backed workbook writer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{EnumFmtKey, derive_default_xlsx_formats, derive_default_xlsx_write_options};
pub use reader::{XlsxReader, read_table};
pub use spec::{
    EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetTable,
    SpecXlsxReadOptions, SpecXlsxReport, SpecXlsxWriteOptions, WorkbookError,
};
pub use util::is_supported_workbook_path;
pub use writer::{XlsxWriter, write_tables, write_tables_with_options};
