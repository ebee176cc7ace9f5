//! Workbook reader that turns worksheets into [`SpecTable`]s.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use rubick_cast::{EnumCellValue, SchemaError, SpecTable};

use crate::spec::{SpecSheetTable, SpecXlsxReadOptions, WorkbookError};
use crate::util::derive_unique_header_names;

/// Open workbook handle. The first row of each sheet is its header.
pub struct XlsxReader {
    path_file_in: PathBuf,
    workbook: Sheets<BufReader<File>>,
    read_options: SpecXlsxReadOptions,
}

impl XlsxReader {
    /// Open any workbook format calamine understands (xlsx, xlsm, xlsb, xls, ods).
    pub fn open(
        path_file_in: impl AsRef<Path>,
        read_options: SpecXlsxReadOptions,
    ) -> Result<Self, WorkbookError> {
        let path_file_in = path_file_in.as_ref().to_path_buf();
        let workbook = open_workbook_auto(&path_file_in).map_err(|err| WorkbookError::Open {
            path: path_file_in.clone(),
            message: err.to_string(),
        })?;
        Ok(Self {
            path_file_in,
            workbook,
            read_options,
        })
    }

    /// Return input file path as string.
    pub fn file_in(&self) -> String {
        self.path_file_in.to_string_lossy().to_string()
    }

    /// All sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Read one sheet by exact name.
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<SpecTable, WorkbookError> {
        let l_names = self.sheet_names();
        if !l_names.iter().any(|c_name| c_name == sheet_name) {
            return Err(WorkbookError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: l_names.join(", "),
            });
        }

        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|err| WorkbookError::Read {
                sheet: sheet_name.to_string(),
                message: err.to_string(),
            })?;
        Ok(derive_table_from_range(
            &range,
            self.read_options.if_keep_blank_rows,
        )?)
    }

    /// Read the first sheet.
    pub fn read_first_sheet(&mut self) -> Result<SpecSheetTable, WorkbookError> {
        let Some(sheet_name) = self.sheet_names().into_iter().next() else {
            return Err(WorkbookError::NoSheets {
                path: self.path_file_in.clone(),
            });
        };
        let table = self.read_sheet(&sheet_name)?;
        Ok(SpecSheetTable { sheet_name, table })
    }

    /// Read every sheet not listed in `sheets_excluded`, in workbook order.
    pub fn read_sheets(&mut self) -> Result<Vec<SpecSheetTable>, WorkbookError> {
        let l_names: Vec<String> = self
            .sheet_names()
            .into_iter()
            .filter(|c_name| !self.is_sheet_excluded(c_name))
            .collect();

        let mut l_sheets = Vec::with_capacity(l_names.len());
        for sheet_name in l_names {
            let table = self.read_sheet(&sheet_name)?;
            l_sheets.push(SpecSheetTable { sheet_name, table });
        }
        Ok(l_sheets)
    }

    /// True when `sheet_name` is excluded (case-insensitive).
    pub fn is_sheet_excluded(&self, sheet_name: &str) -> bool {
        self.read_options
            .sheets_excluded
            .iter()
            .any(|c_excluded| c_excluded.trim().eq_ignore_ascii_case(sheet_name.trim()))
    }
}

/// Read the first sheet of `path_file_in` as a table.
pub fn read_table(path_file_in: impl AsRef<Path>) -> Result<SpecTable, WorkbookError> {
    let mut reader = XlsxReader::open(path_file_in, SpecXlsxReadOptions::default())?;
    Ok(reader.read_first_sheet()?.table)
}

/// Build a table from a cell range whose first row is the header.
pub fn derive_table_from_range(
    range: &Range<Data>,
    if_keep_blank_rows: bool,
) -> Result<SpecTable, SchemaError> {
    let mut iter_rows = range.rows();
    let Some(row_header) = iter_rows.next() else {
        return Ok(SpecTable::default());
    };

    let l_header_cells: Vec<EnumCellValue> =
        row_header.iter().map(derive_cell_value_from_data).collect();
    let l_columns = derive_unique_header_names(&l_header_cells);

    let l_rows: Vec<Vec<EnumCellValue>> = iter_rows
        .map(|row| row.iter().map(derive_cell_value_from_data).collect::<Vec<_>>())
        .filter(|row| if_keep_blank_rows || !row.iter().all(EnumCellValue::is_blank))
        .collect();

    SpecTable::new(l_columns, l_rows)
}

/// Convert one calamine cell.
pub fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty => EnumCellValue::Empty,
        Data::String(val) if val.is_empty() => EnumCellValue::Empty,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Bool(val) => EnumCellValue::String(if *val { "True" } else { "False" }.to_string()),
        Data::DateTime(val) => EnumCellValue::Date(val.as_f64()),
        Data::Error(err) => EnumCellValue::String(err.to_string()),
        _ => EnumCellValue::String(value.to_string()),
    }
}
