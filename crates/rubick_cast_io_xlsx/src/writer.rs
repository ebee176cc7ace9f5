//! XLSX writer kernel that serializes [`SpecTable`]s into workbook output.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use rubick_cast::{EnumCellValue, SpecTable};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{
    EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, derive_default_xlsx_formats,
    derive_default_xlsx_write_options,
};
use crate::spec::{
    EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetSlice,
    SpecXlsxReport, SpecXlsxWriteOptions, WorkbookError,
};
use crate::util::{estimate_width_len, plan_sheet_slices, sanitize_sheet_name};

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_number: SpecCellFormat,
    fmt_date: SpecCellFormat,
    fmt_header: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// Missing format keys fall back to the default presets. The workbook is
    /// buffered in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: impl Into<PathBuf>,
        formats: BTreeMap<EnumFmtKey, SpecCellFormat>,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        let dict_fmt_default = derive_default_xlsx_formats();
        let derive_fmt = |key: EnumFmtKey| {
            formats
                .get(&key)
                .or_else(|| dict_fmt_default.get(&key))
                .cloned()
                .unwrap_or_default()
        };

        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            fmt_text: derive_fmt(EnumFmtKey::Text),
            fmt_number: derive_fmt(EnumFmtKey::Number),
            fmt_date: derive_fmt(EnumFmtKey::Date),
            fmt_header: derive_fmt(EnumFmtKey::Header),
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Writer with default formats and options.
    pub fn with_defaults(path_file_out: impl Into<PathBuf>) -> Self {
        Self::new(
            path_file_out,
            derive_default_xlsx_formats(),
            derive_default_xlsx_write_options(),
        )
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), WorkbookError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error)?;
        self.if_closed = true;
        Ok(())
    }

    /// Write one table as a sheet (or several, when Excel limits force a split).
    pub fn write_sheet(&mut self, table: &SpecTable, sheet_name: &str) -> Result<(), WorkbookError> {
        if self.if_closed {
            return Err(WorkbookError::Closed);
        }
        validate_policy_autofit(&self.write_options.policy_autofit)?;

        let policy_autofit = self.write_options.policy_autofit.clone();
        let missing_value_str = self.write_options.missing_value_str.clone();
        let if_freeze_header = self.write_options.if_freeze_header;

        let mut report = SpecXlsxReport::default();
        let l_sheet_parts = plan_sheet_slices(
            table.height(),
            table.width(),
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        );

        let fmt_header = derive_rust_xlsx_format(&self.fmt_header);
        let fmt_text = derive_rust_xlsx_format(&self.fmt_text);
        let fmt_number = derive_rust_xlsx_format(&self.fmt_number);
        let fmt_date = derive_rust_xlsx_format(&self.fmt_date);

        let if_autofit_columns = !matches!(policy_autofit.rule_columns, EnumAutofitColumnsRule::None);

        for sheet_slice in l_sheet_parts {
            let sheet_name_unique = self.derive_unique_sheet_name(&sheet_slice.sheet_name);
            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&sheet_name_unique)
                .map_err(derive_xlsx_error)?;

            let l_columns_slice =
                &table.columns()[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive];
            let n_width_slice = l_columns_slice.len();

            let mut l_width_by_col_header = vec![0usize; n_width_slice];
            let mut l_width_by_col_body = vec![0usize; n_width_slice];

            for (n_idx_col, c_col) in l_columns_slice.iter().enumerate() {
                worksheet
                    .write_string_with_format(0, cast_col_num(n_idx_col)?, c_col, &fmt_header)
                    .map_err(derive_xlsx_error)?;
                l_width_by_col_header[n_idx_col] =
                    estimate_width_len(&EnumCellValue::String(c_col.clone()), None);
            }

            if if_freeze_header {
                worksheet.set_freeze_panes(1, 0).map_err(derive_xlsx_error)?;
            }

            let l_rows_slice =
                &table.rows()[sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive];
            for (n_idx_row, row) in l_rows_slice.iter().enumerate() {
                let if_row_inspected = policy_autofit
                    .height_body_inferred_max
                    .is_none_or(|n_max| n_idx_row < n_max);

                let l_cells_slice =
                    &row[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive];
                for (n_idx_col, value) in l_cells_slice.iter().enumerate() {
                    if if_autofit_columns && if_row_inspected {
                        l_width_by_col_body[n_idx_col] = usize::max(
                            l_width_by_col_body[n_idx_col],
                            estimate_width_len(value, missing_value_str.as_deref()),
                        );
                    }

                    let format = match value {
                        EnumCellValue::Number(_) => &fmt_number,
                        EnumCellValue::Date(_) => &fmt_date,
                        EnumCellValue::Empty | EnumCellValue::String(_) => &fmt_text,
                    };
                    write_cell_with_format(
                        worksheet,
                        n_idx_row + 1,
                        n_idx_col,
                        value,
                        format,
                        missing_value_str.as_deref(),
                    )?;
                }
            }

            if if_autofit_columns {
                apply_column_widths(
                    worksheet,
                    &policy_autofit,
                    &l_width_by_col_header,
                    &l_width_by_col_body,
                )?;
            }

            report.sheets.push(SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..sheet_slice
            });
        }

        self.l_reports.push(report);
        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Write `l_sheets` (name, table) pairs into a fresh workbook at `path_file_out`.
pub fn write_tables(
    path_file_out: impl Into<PathBuf>,
    l_sheets: &[(&str, &SpecTable)],
) -> Result<Vec<SpecXlsxReport>, WorkbookError> {
    write_tables_with_options(path_file_out, l_sheets, derive_default_xlsx_write_options())
}

/// [`write_tables`] with explicit write options and the default formats.
pub fn write_tables_with_options(
    path_file_out: impl Into<PathBuf>,
    l_sheets: &[(&str, &SpecTable)],
    write_options: SpecXlsxWriteOptions,
) -> Result<Vec<SpecXlsxReport>, WorkbookError> {
    let mut writer = XlsxWriter::new(path_file_out, derive_default_xlsx_formats(), write_options);
    for (sheet_name, table) in l_sheets {
        writer.write_sheet(table, sheet_name)?;
    }
    writer.close()?;
    Ok(writer.report())
}

fn apply_column_widths(
    worksheet: &mut Worksheet,
    policy_autofit: &SpecAutofitCellsPolicy,
    l_width_by_col_header: &[usize],
    l_width_by_col_body: &[usize],
) -> Result<(), WorkbookError> {
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    let n_pad = policy_autofit.width_cell_padding;

    for (n_idx_col, (n_width_header, n_width_body)) in l_width_by_col_header
        .iter()
        .zip(l_width_by_col_body)
        .enumerate()
    {
        let n_width_recorded = match policy_autofit.rule_columns {
            EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::None => *n_width_header,
            EnumAutofitColumnsRule::Body => *n_width_body,
            EnumAutofitColumnsRule::All => usize::max(*n_width_header, *n_width_body),
        };
        let n_width_final = usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad));
        worksheet
            .set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)
            .map_err(derive_xlsx_error)?;
    }
    Ok(())
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), WorkbookError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(WorkbookError::Write(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(WorkbookError::Write(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
    missing_value_str: Option<&str>,
) -> Result<(), WorkbookError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::Empty => match missing_value_str {
            Some(val) => worksheet.write_string_with_format(n_row, n_col, val, format),
            None => worksheet.write_blank(n_row, n_col, format),
        },
        EnumCellValue::String(val) => worksheet.write_string_with_format(n_row, n_col, val, format),
        EnumCellValue::Number(val) | EnumCellValue::Date(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)
        }
    }
    .map_err(derive_xlsx_error)?;
    Ok(())
}

fn derive_rust_xlsx_format(cfg_fmt: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &cfg_fmt.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = cfg_fmt.font_size {
        format = format.set_font_size(val as f64);
    }
    if cfg_fmt.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(align) = cfg_fmt.align {
        format = format.set_align(align);
    }
    if let Some(val) = &cfg_fmt.num_format {
        format = format.set_num_format(val.clone());
    }
    if cfg_fmt.if_border {
        format = format.set_border(FormatBorder::Thin);
    }

    format
}

fn cast_row_num(value: usize) -> Result<u32, WorkbookError> {
    u32::try_from(value).map_err(|_| WorkbookError::Limit(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, WorkbookError> {
    u16::try_from(value)
        .map_err(|_| WorkbookError::Limit(format!("column index overflow: {value}")))
}

fn derive_xlsx_error(err: XlsxError) -> WorkbookError {
    WorkbookError::Write(err.to_string())
}
