//! Shared XLSX models and the workbook error type.

use std::path::PathBuf;

use rubick_cast::{SchemaError, SpecTable};
use rust_xlsxwriter::FormatAlign;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// Cell format preset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<FormatAlign>,
    /// Thin border on all sides.
    pub if_border: bool,

    /// Number format code.
    pub num_format: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReadOptions

/// Options for reading worksheets into tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReadOptions {
    /// Sheet names skipped by [`crate::reader::XlsxReader::read_sheets`]
    /// (case-insensitive).
    pub sheets_excluded: Vec<String>,
    /// Keep rows whose cells are all blank.
    pub if_keep_blank_rows: bool,
}

/// One worksheet read into a table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetTable {
    /// Worksheet name.
    pub sheet_name: String,
    /// Worksheet contents, first row as header.
    pub table: SpecTable,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only.
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells (default).
    #[default]
    All,
}

impl EnumAutofitColumnsRule {
    /// Parse `none`, `header`, `body` or `all` (case-insensitive).
    pub fn parse(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Autofit policy for per-sheet write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::All,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Freeze the header row.
    pub if_freeze_header: bool,
    /// Text written for empty cells; `None` leaves them blank.
    pub missing_value_str: Option<String>,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            policy_autofit: SpecAutofitCellsPolicy::default(),
            if_freeze_header: true,
            missing_value_str: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Reports

/// Concrete sheet part emitted to workbook (after Excel-limit slicing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
    /// Inclusive source column start.
    pub col_start_inclusive: usize,
    /// Exclusive source column end.
    pub col_end_exclusive: usize,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet slices produced by the write call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Workbook read/write failures.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Could not open workbook {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },

    #[error("Workbook {} has no sheets", .path.display())]
    NoSheets { path: PathBuf },

    #[error("Sheet {sheet:?} not found. Available: [{available}]")]
    SheetNotFound { sheet: String, available: String },

    #[error("Could not read sheet {sheet:?}: {message}")]
    Read { sheet: String, message: String },

    #[error("xlsx write error: {0}")]
    Write(String),

    #[error("{0}")]
    Limit(String),

    #[error("Cannot write after close().")]
    Closed,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
