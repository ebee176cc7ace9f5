//! Stateless helper utilities used by the XLSX reader and writer.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rubick_cast::EnumCellValue;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    TUP_WORKBOOK_EXTENSIONS,
};
use crate::spec::{SpecSheetSlice, SpecXlsxReport};

////////////////////////////////////////////////////////////////////////////////
// #region HeaderNormalization

/// Turn a raw header row into unique column names.
///
/// Blank headers become `Unnamed: <idx>`; repeated names get `.1`, `.2`, ...
/// suffixes in order of appearance.
pub fn derive_unique_header_names(header_cells: &[EnumCellValue]) -> Vec<String> {
    let l_names_raw: Vec<String> = header_cells
        .iter()
        .enumerate()
        .map(|(n_idx, value)| {
            if value.is_blank() {
                format!("Unnamed: {n_idx}")
            } else {
                value.to_text()
            }
        })
        .collect();

    let mut set_used: HashSet<String> = HashSet::new();
    let mut dict_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut l_names = Vec::with_capacity(l_names_raw.len());
    for c_name in l_names_raw {
        let mut c_candidate = c_name.clone();
        while set_used.contains(&c_candidate) {
            let n_count = dict_counts.entry(c_name.clone()).or_insert(0);
            *n_count += 1;
            c_candidate = format!("{c_name}.{n_count}");
        }
        set_used.insert(c_candidate.clone());
        l_names.push(c_candidate);
    }
    l_names
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathValidation

/// True when `path` carries a workbook extension the reader understands.
pub fn is_supported_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| TUP_WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Split a table range into Excel-compliant sheet slices.
///
/// One header row is repeated on every slice.
pub fn plan_sheet_slices(
    height_table: usize,
    width_table: usize,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> Vec<SpecSheetSlice> {
    let n_rows_data_max = N_NROWS_EXCEL_MAX - 1;

    let mut l_col_slices = Vec::new();
    let mut n_col_start = 0;
    while n_col_start < width_table {
        let n_col_end = usize::min(width_table, n_col_start + N_NCOLS_EXCEL_MAX);
        l_col_slices.push((n_col_start, n_col_end));
        n_col_start = n_col_end;
    }
    if l_col_slices.is_empty() {
        l_col_slices.push((0, 0));
    }

    let mut l_row_slices = Vec::new();
    let mut n_row_start = 0;
    while n_row_start < height_table {
        let n_row_end = usize::min(height_table, n_row_start + n_rows_data_max);
        l_row_slices.push((n_row_start, n_row_end));
        n_row_start = n_row_end;
    }
    if l_row_slices.is_empty() {
        l_row_slices.push((0, 0));
    }

    let n_parts_total = l_col_slices.len() * l_row_slices.len();

    let mut l_sheet_parts = Vec::with_capacity(n_parts_total);
    let mut n_idx_part = 1;
    for (col_start, col_end) in &l_col_slices {
        for (row_start, row_end) in &l_row_slices {
            let c_part_sheet_name = if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx_part)
            };

            l_sheet_parts.push(SpecSheetSlice {
                sheet_name: c_part_sheet_name,
                row_start_inclusive: *row_start,
                row_end_exclusive: *row_end,
                col_start_inclusive: *col_start,
                col_end_exclusive: *col_end,
            });
            n_idx_part += 1;
        }
    }

    if n_parts_total > 1 {
        report.warn(format!(
            "Excel limit overflow: split into {} sheets (columns-first, then rows).",
            l_sheet_parts.len()
        ));
    }

    l_sheet_parts
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue, missing_value_str: Option<&str>) -> usize {
    match value {
        EnumCellValue::Empty => missing_value_str.map_or(0, estimate_unicode_string_width),
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(_) => value.to_text().len(),
        // "yyyy-mm-dd hh:mm:ss"
        EnumCellValue::Date(_) => 19,
    }
}

/// ASCII counts 1, everything else 1.6 (CJK glyphs are roughly double width).
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
