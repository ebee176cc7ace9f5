//! Table models, operation options/reports and the schema error type.

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// One cell of a [`SpecTable`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    Empty,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Excel serial date-time number.
    Date(f64),
}

impl EnumCellValue {
    /// True for [`EnumCellValue::Empty`] and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Render the cell as text. Integral numbers drop the fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) | Self::Date(n) => derive_number_text(*n),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

fn derive_number_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Table

/// In-memory table: ordered unique column names plus row-major cells.
///
/// Build through [`SpecTable::new`] or [`SpecTable::with_columns`] so the
/// unique-name and row-width invariants hold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<EnumCellValue>>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OperationOptions

/// Names the join-key column on each side of an import merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecKeyMapping {
    /// Key column in the SKU table.
    pub sku_key_column: String,
    /// Key column in the Style table.
    pub style_key_column: String,
}

/// Export formatter options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportOptions {
    /// Append input columns unknown to the template after the template columns.
    pub if_preserve_unknown_columns: bool,
}

/// Extract-missing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractMissingOptions {
    /// Key column present in both tables.
    pub style_id_column: String,
    /// Flag column inspected in the flagged table.
    pub flag_column: String,
}

impl Default for SpecExtractMissingOptions {
    fn default() -> Self {
        Self {
            style_id_column: crate::conf::C_COL_STYLE_ID_DEFAULT.to_string(),
            flag_column: crate::conf::C_COL_AI_FLAG_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Reports

/// Export counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Rows written to the output table.
    pub rows_processed: usize,
    /// Input column count.
    pub columns_in_input: usize,
    /// Output column count.
    pub columns_in_output: usize,
    /// Output columns without an input counterpart.
    pub columns_added: usize,
}

/// Export table plus counters.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecExportOutcome {
    pub table: SpecTable,
    pub report: SpecExportReport,
}

/// Import merge counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMergeReport {
    /// SKU rows emitted.
    pub rows_processed: usize,
    /// SKU rows with a Style match.
    pub rows_matched: usize,
    /// SKU rows without a Style match (blank keys included).
    pub rows_unmatched: usize,
    /// Style rows ignored because an earlier row had the same key.
    pub style_duplicates_ignored: usize,
    /// Output column count.
    pub columns_count: usize,
}

/// Merged table plus counters.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMergeOutcome {
    pub table: SpecTable,
    pub report: SpecMergeReport,
}

/// Extract-missing result.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecExtractMissingOutcome {
    /// Filtered values rows.
    pub table: SpecTable,
    /// Distinct keys whose flag is blank.
    pub missing_count: usize,
}

/// Merge-sample result.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMergeSampleOutcome {
    pub table: SpecTable,
    /// Output rows overwritten from the sample.
    pub rows_updated: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// A required column is absent or a table violates its schema invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Template has no columns to match against")]
    EmptyTemplate,

    #[error("Input has no columns to process")]
    EmptyInput,

    #[error("{table} table is missing column {column:?}")]
    MissingColumn { table: String, column: String },

    #[error(
        "Could not find style ID column in {table} table. Expected a column like 'style_id', 'SKU', or 'styleId'. Found: [{found}]"
    )]
    KeyColumnNotDetected { table: String, found: String },

    #[error("Duplicate column names detected: {0}")]
    DuplicateColumns(String),

    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid column pattern: {0}")]
    InvalidPattern(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
