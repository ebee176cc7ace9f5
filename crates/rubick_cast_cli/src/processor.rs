//! File-level processors: validate inputs, read workbooks, run one table
//! operation and write the result workbook.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rubick_cast::{
    C_SHEET_TYPES, C_SHEET_VALUES, SchemaError, SpecExportOptions, SpecExportReport,
    SpecExtractMissingOptions, SpecKeyMapping, SpecMergeReport, SpecTable,
    compile_column_patterns, concat_tables, derive_types_table, export_with_options,
    extract_missing, import_merge_with_report, merge_sample,
};
use rubick_cast_io_xlsx::{
    SpecXlsxReadOptions, WorkbookError, XlsxReader, is_supported_workbook_path,
    write_tables_with_options,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Settings};

const N_BYTES_PER_MB: u64 = 1024 * 1024;
const C_EXT_OUTPUT: &str = "xlsx";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "Unsupported file type: {}. Expected one of: .xlsx, .xlsm, .xls, .xlsb, .ods",
        .0.display()
    )]
    UnsupportedExtension(PathBuf),

    #[error("File {} is {size_mb:.1} MB, over the {max_mb} MB limit", .path.display())]
    FileTooLarge {
        path: PathBuf,
        size_mb: f64,
        max_mb: u64,
    },

    #[error("Invalid output file: {}. Output must be an .xlsx file", .0.display())]
    UnsupportedOutput(PathBuf),

    #[error("No valid sheets found in {}", .0.display())]
    NoValidSheets(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

////////////////////////////////////////////////////////////////////////////////
// #region Reports

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportProcessReport {
    pub path_output: PathBuf,
    pub export: SpecExportReport,
}

impl fmt::Display for SpecExportProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} rows, {} columns ({} added from template) -> {}",
            self.export.rows_processed,
            self.export.columns_in_output,
            self.export.columns_added,
            self.path_output.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecImportProcessReport {
    pub path_output: PathBuf,
    pub sheets_merged: usize,
    pub sheets_skipped: usize,
    /// Counters summed over all merged sheets; `columns_count` is the width
    /// of the concatenated Values table.
    pub merge: SpecMergeReport,
}

impl fmt::Display for SpecImportProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merged {} rows from {} sheet(s) ({} matched, {} unmatched), {} columns -> {}",
            self.merge.rows_processed,
            self.sheets_merged,
            self.merge.rows_matched,
            self.merge.rows_unmatched,
            self.merge.columns_count,
            self.path_output.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractMissingProcessReport {
    pub path_output: PathBuf,
    pub missing_count: usize,
    pub rows_extracted: usize,
    pub types_rows: usize,
}

impl fmt::Display for SpecExtractMissingProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extracted {} rows for {} styles missing a flag -> {}",
            self.rows_extracted,
            self.missing_count,
            self.path_output.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeSampleProcessReport {
    pub path_output: PathBuf,
    pub rows_updated: usize,
    pub total_rows: usize,
}

impl fmt::Display for SpecMergeSampleProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Updated {} of {} rows -> {}",
            self.rows_updated,
            self.total_rows,
            self.path_output.display()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InputValidation

/// Reject missing, non-workbook or oversized inputs before reading them.
pub fn validate_input_file(path: &Path, max_file_size_mb: u64) -> Result<(), ProcessError> {
    if !path.is_file() {
        return Err(ProcessError::NotFound(path.to_path_buf()));
    }
    if !is_supported_workbook_path(path) {
        return Err(ProcessError::UnsupportedExtension(path.to_path_buf()));
    }

    let n_bytes = fs::metadata(path)?.len();
    if n_bytes > max_file_size_mb.saturating_mul(N_BYTES_PER_MB) {
        return Err(ProcessError::FileTooLarge {
            path: path.to_path_buf(),
            size_mb: n_bytes as f64 / N_BYTES_PER_MB as f64,
            max_mb: max_file_size_mb,
        });
    }
    Ok(())
}

/// Reject output paths the XLSX writer would mislabel.
pub fn validate_output_file(path: &Path) -> Result<(), ProcessError> {
    let if_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(C_EXT_OUTPUT));
    if !if_xlsx {
        return Err(ProcessError::UnsupportedOutput(path.to_path_buf()));
    }
    Ok(())
}

/// `<dir of input>/<prefix><input stem>.xlsx`
pub fn derive_export_output_path(path_input: &Path, output_prefix: &str) -> PathBuf {
    let c_stem = path_input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path_input.with_file_name(format!("{output_prefix}{c_stem}.xlsx"))
}

/// Write `l_sheets` with the configured writer options and log writer warnings.
pub fn write_workbook(
    path_output: &Path,
    l_sheets: &[(&str, &SpecTable)],
    settings: &Settings,
) -> Result<Vec<String>, ProcessError> {
    let write_options = settings.output.derive_write_options()?;
    let l_warnings: Vec<String> = write_tables_with_options(path_output, l_sheets, write_options)?
        .into_iter()
        .flat_map(|report| report.warnings)
        .collect();
    for c_warning in &l_warnings {
        warn!(output = %path_output.display(), "{c_warning}");
    }
    Ok(l_warnings)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Processors

/// Reindex the first sheet of `path_input` onto the header of `path_template`.
pub fn process_export(
    path_input: &Path,
    path_template: &Path,
    path_output: Option<&Path>,
    settings: &Settings,
) -> Result<SpecExportProcessReport, ProcessError> {
    validate_input_file(path_input, settings.app.max_file_size_mb)?;
    validate_input_file(path_template, settings.app.max_file_size_mb)?;
    let path_output = path_output.map_or_else(
        || derive_export_output_path(path_input, &settings.export.output_prefix),
        Path::to_path_buf,
    );
    validate_output_file(&path_output)?;
    info!(input = %path_input.display(), template = %path_template.display(), "export started");

    let input = XlsxReader::open(path_input, SpecXlsxReadOptions::default())?
        .read_first_sheet()?;
    let template = XlsxReader::open(path_template, SpecXlsxReadOptions::default())?
        .read_first_sheet()?;
    debug!(
        input_sheet = %input.sheet_name,
        input_columns = input.table.width(),
        template_columns = template.table.width(),
        "tables read"
    );

    let outcome = export_with_options(
        &input.table,
        &template.table,
        &SpecExportOptions {
            if_preserve_unknown_columns: settings.export.preserve_unknown_columns,
        },
    )?;
    write_workbook(
        &path_output,
        &[(template.sheet_name.as_str(), &outcome.table)],
        settings,
    )?;

    info!(
        rows = outcome.report.rows_processed,
        columns_added = outcome.report.columns_added,
        output = %path_output.display(),
        "export finished"
    );
    Ok(SpecExportProcessReport {
        path_output,
        export: outcome.report,
    })
}

/// Merge every SKU sheet with its Style sheet and write the Types/Values workbook.
pub fn process_import(
    path_sku: &Path,
    path_style: &Path,
    path_output: Option<&Path>,
    settings: &Settings,
) -> Result<SpecImportProcessReport, ProcessError> {
    validate_input_file(path_sku, settings.app.max_file_size_mb)?;
    validate_input_file(path_style, settings.app.max_file_size_mb)?;
    let path_output = path_output.map_or_else(
        || path_sku.with_file_name(&settings.import.output_filename),
        Path::to_path_buf,
    );
    validate_output_file(&path_output)?;
    info!(sku = %path_sku.display(), style = %path_style.display(), "import started");

    let l_style_patterns = compile_column_patterns(&settings.import.style_column_patterns)?;
    let l_image_patterns = compile_column_patterns(&settings.import.image_column_patterns)?;
    let read_options = SpecXlsxReadOptions {
        sheets_excluded: settings.import.exclude_sheets.clone(),
        ..Default::default()
    };

    let l_sku_sheets = XlsxReader::open(path_sku, read_options.clone())?.read_sheets()?;
    if l_sku_sheets.is_empty() {
        return Err(ProcessError::NoValidSheets(path_sku.to_path_buf()));
    }
    let mut reader_style = XlsxReader::open(path_style, read_options)?;
    let l_style_names: Vec<String> = reader_style
        .sheet_names()
        .into_iter()
        .filter(|c_name| !reader_style.is_sheet_excluded(c_name))
        .collect();
    let Some(c_style_fallback) = l_style_names.first().cloned() else {
        return Err(ProcessError::NoValidSheets(path_style.to_path_buf()));
    };

    let mut dict_style_tables: HashMap<String, SpecTable> = HashMap::new();
    let mut l_merged: Vec<SpecTable> = Vec::with_capacity(l_sku_sheets.len());
    let mut merge_total = SpecMergeReport::default();
    let mut n_sheets_skipped = 0usize;

    for sku_sheet in &l_sku_sheets {
        if sku_sheet.table.width() == 0 {
            warn!(sheet = %sku_sheet.sheet_name, "empty SKU sheet skipped");
            n_sheets_skipped += 1;
            continue;
        }

        let c_style_sheet = if l_style_names.contains(&sku_sheet.sheet_name) {
            sku_sheet.sheet_name.clone()
        } else {
            c_style_fallback.clone()
        };
        if !dict_style_tables.contains_key(&c_style_sheet) {
            let table = reader_style.read_sheet(&c_style_sheet)?;
            dict_style_tables.insert(c_style_sheet.clone(), table);
        }
        let Some(style) = dict_style_tables.get(&c_style_sheet) else {
            continue;
        };

        let result = SpecKeyMapping::resolve(
            &sku_sheet.table,
            style,
            settings.import.sku_key_column.as_deref(),
            settings.import.style_key_column.as_deref(),
            &l_style_patterns,
        )
        .and_then(|key_mapping| {
            debug!(
                sheet = %sku_sheet.sheet_name,
                style_sheet = %c_style_sheet,
                sku_key = %key_mapping.sku_key_column,
                style_key = %key_mapping.style_key_column,
                "key columns resolved"
            );
            import_merge_with_report(&sku_sheet.table, style, &key_mapping)
        });

        let outcome = match result {
            Ok(outcome) => outcome,
            // The first sheet defines the batch; later sheets may be partial.
            Err(err) if l_merged.is_empty() => return Err(err.into()),
            Err(err) => {
                warn!(sheet = %sku_sheet.sheet_name, error = %err, "SKU sheet skipped");
                n_sheets_skipped += 1;
                continue;
            }
        };

        info!(
            sheet = %sku_sheet.sheet_name,
            rows = outcome.report.rows_processed,
            matched = outcome.report.rows_matched,
            unmatched = outcome.report.rows_unmatched,
            "sheet merged"
        );
        if outcome.report.style_duplicates_ignored > 0 {
            warn!(
                style_sheet = %c_style_sheet,
                duplicates = outcome.report.style_duplicates_ignored,
                "duplicate style keys ignored, first row kept"
            );
        }
        merge_total.rows_processed += outcome.report.rows_processed;
        merge_total.rows_matched += outcome.report.rows_matched;
        merge_total.rows_unmatched += outcome.report.rows_unmatched;
        merge_total.style_duplicates_ignored += outcome.report.style_duplicates_ignored;
        l_merged.push(outcome.table);
    }

    if l_merged.is_empty() {
        return Err(ProcessError::NoValidSheets(path_sku.to_path_buf()));
    }

    let values = concat_tables(&l_merged)?;
    merge_total.columns_count = values.width();
    if settings.import.write_types_sheet {
        let types = derive_types_table(values.columns(), &l_image_patterns)?;
        write_workbook(
            &path_output,
            &[(C_SHEET_TYPES, &types), (C_SHEET_VALUES, &values)],
            settings,
        )?;
    } else {
        write_workbook(&path_output, &[(C_SHEET_VALUES, &values)], settings)?;
    }

    info!(
        rows = merge_total.rows_processed,
        sheets = l_merged.len(),
        output = %path_output.display(),
        "import finished"
    );
    Ok(SpecImportProcessReport {
        path_output,
        sheets_merged: l_merged.len(),
        sheets_skipped: n_sheets_skipped,
        merge: merge_total,
    })
}

/// Copy the Values rows of `path_input` whose styles lack a flag in `path_flagged`.
///
/// The Types sheet of `path_input` is written through unchanged.
pub fn process_extract_missing(
    path_input: &Path,
    path_flagged: &Path,
    path_output: &Path,
    settings: &Settings,
) -> Result<SpecExtractMissingProcessReport, ProcessError> {
    validate_input_file(path_input, settings.app.max_file_size_mb)?;
    validate_input_file(path_flagged, settings.app.max_file_size_mb)?;
    validate_output_file(path_output)?;
    info!(input = %path_input.display(), flagged = %path_flagged.display(), "extract-missing started");

    let flagged = XlsxReader::open(path_flagged, SpecXlsxReadOptions::default())?
        .read_first_sheet()?;
    let mut reader_input = XlsxReader::open(path_input, SpecXlsxReadOptions::default())?;
    let values = reader_input.read_sheet(&settings.extract.values_sheet)?;
    let types = reader_input.read_sheet(&settings.extract.types_sheet)?;

    let outcome = extract_missing(
        &values,
        &flagged.table,
        &SpecExtractMissingOptions {
            style_id_column: settings.extract.style_id_column.clone(),
            flag_column: settings.extract.flag_column.clone(),
        },
    )?;
    if outcome.missing_count == 0 {
        warn!("no styles with a missing flag");
    }
    write_workbook(
        path_output,
        &[(C_SHEET_TYPES, &types), (C_SHEET_VALUES, &outcome.table)],
        settings,
    )?;

    info!(
        missing = outcome.missing_count,
        rows = outcome.table.height(),
        output = %path_output.display(),
        "extract-missing finished"
    );
    Ok(SpecExtractMissingProcessReport {
        path_output: path_output.to_path_buf(),
        missing_count: outcome.missing_count,
        rows_extracted: outcome.table.height(),
        types_rows: types.height(),
    })
}

/// Overwrite rows of `path_output_in` with the reviewed rows of `path_sample`.
pub fn process_merge_sample(
    path_output_in: &Path,
    path_sample: &Path,
    path_result: &Path,
    settings: &Settings,
) -> Result<SpecMergeSampleProcessReport, ProcessError> {
    validate_input_file(path_output_in, settings.app.max_file_size_mb)?;
    validate_input_file(path_sample, settings.app.max_file_size_mb)?;
    validate_output_file(path_result)?;
    info!(output = %path_output_in.display(), sample = %path_sample.display(), "merge-sample started");

    let output = XlsxReader::open(path_output_in, SpecXlsxReadOptions::default())?
        .read_first_sheet()?;
    let sample = XlsxReader::open(path_sample, SpecXlsxReadOptions::default())?
        .read_first_sheet()?;

    let outcome = merge_sample(
        &output.table,
        &sample.table,
        &settings.extract.style_id_column,
    )?;
    write_workbook(
        path_result,
        &[(output.sheet_name.as_str(), &outcome.table)],
        settings,
    )?;

    info!(
        updated = outcome.rows_updated,
        rows = outcome.table.height(),
        output = %path_result.display(),
        "merge-sample finished"
    );
    Ok(SpecMergeSampleProcessReport {
        path_output: path_result.to_path_buf(),
        rows_updated: outcome.rows_updated,
        total_rows: outcome.table.height(),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use rubick_cast::EnumCellValue;
    use rubick_cast_io_xlsx::{read_table, write_tables};

    fn table(columns: &[&str], rows: Vec<Vec<EnumCellValue>>) -> SpecTable {
        SpecTable::new(columns.iter().map(ToString::to_string).collect(), rows).unwrap()
    }

    fn text_rows(table: &SpecTable) -> Vec<Vec<String>> {
        table
            .rows()
            .iter()
            .map(|row| row.iter().map(EnumCellValue::to_text).collect())
            .collect()
    }

    #[test]
    fn test_validate_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path_csv = dir.path().join("data.csv");
        fs::write(&path_csv, "a,b").unwrap();
        let path_xlsx = dir.path().join("big.xlsx");
        fs::write(&path_xlsx, vec![0u8; 2 * N_BYTES_PER_MB as usize]).unwrap();

        assert!(matches!(
            validate_input_file(&dir.path().join("nope.xlsx"), 50),
            Err(ProcessError::NotFound(_))
        ));
        assert!(matches!(
            validate_input_file(&path_csv, 50),
            Err(ProcessError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            validate_input_file(&path_xlsx, 1),
            Err(ProcessError::FileTooLarge { max_mb: 1, .. })
        ));
        validate_input_file(&path_xlsx, 50).unwrap();
    }

    #[test]
    fn test_validate_output_file() {
        validate_output_file(Path::new("out.xlsx")).unwrap();
        validate_output_file(Path::new("/data/OUT.XLSX")).unwrap();
        for c_path in ["out.csv", "out.xls", "out"] {
            assert!(matches!(
                validate_output_file(Path::new(c_path)),
                Err(ProcessError::UnsupportedOutput(_))
            ));
        }
    }

    #[test]
    fn test_process_export_rejects_non_xlsx_output() {
        let dir = tempfile::tempdir().unwrap();
        let path_input = dir.path().join("input.xlsx");
        let path_output = dir.path().join("out.csv");
        write_tables(&path_input, &[("Sheet1", &table(&["sku"], vec![]))]).unwrap();

        let err = process_export(&path_input, &path_input, Some(&path_output), &Settings::default())
            .unwrap_err();

        assert!(matches!(err, ProcessError::UnsupportedOutput(_)));
        assert!(!path_output.exists());
    }

    #[test]
    fn test_write_workbook_returns_split_warning() {
        let dir = tempfile::tempdir().unwrap();
        let n_width = rubick_cast_io_xlsx::conf::N_NCOLS_EXCEL_MAX + 1;
        let wide = SpecTable::new(
            (0..n_width).map(|n_idx| format!("c{n_idx}")).collect(),
            vec![],
        )
        .unwrap();

        let l_warnings =
            write_workbook(&dir.path().join("wide.xlsx"), &[("Values", &wide)], &Settings::default())
                .unwrap();

        assert_eq!(l_warnings.len(), 1);
        assert!(l_warnings[0].contains("split into 2 sheets"), "{l_warnings:?}");
    }

    #[test]
    fn test_derive_export_output_path() {
        assert_eq!(
            derive_export_output_path(Path::new("/data/batch.xls"), "Formatted_"),
            PathBuf::from("/data/Formatted_batch.xlsx")
        );
    }

    #[test]
    fn test_process_export_writes_template_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path_input = dir.path().join("input.xlsx");
        let path_template = dir.path().join("template.xlsx");
        write_tables(
            &path_input,
            &[("Data", &table(&["sku", "size"], vec![vec!["A1".into(), "M".into()]]))],
        )
        .unwrap();
        write_tables(
            &path_template,
            &[("Sheet1", &table(&["SKU", "Color", "Size"], vec![]))],
        )
        .unwrap();

        let report =
            process_export(&path_input, &path_template, None, &Settings::default()).unwrap();

        assert_eq!(report.path_output, dir.path().join("Formatted_input.xlsx"));
        assert_eq!(report.export.columns_added, 1);
        let out = read_table(&report.path_output).unwrap();
        assert_eq!(out.columns(), &["SKU", "Color", "Size"]);
        assert_eq!(text_rows(&out), vec![vec!["A1", "", "M"]]);
    }

    #[test]
    fn test_process_export_applies_output_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path_input = dir.path().join("input.xlsx");
        let path_template = dir.path().join("template.xlsx");
        let path_output = dir.path().join("out.xlsx");
        write_tables(
            &path_input,
            &[("Data", &table(&["sku"], vec![vec!["A1".into()]]))],
        )
        .unwrap();
        write_tables(&path_template, &[("Sheet1", &table(&["SKU", "Color"], vec![]))]).unwrap();

        let mut settings = Settings::default();
        settings.output.missing_value = Some("N/A".to_string());
        process_export(&path_input, &path_template, Some(&path_output), &settings).unwrap();

        assert_eq!(text_rows(&read_table(&path_output).unwrap()), vec![vec!["A1", "N/A"]]);
    }

    #[test]
    fn test_process_import_keeps_whitespace_variant_style_column() {
        let dir = tempfile::tempdir().unwrap();
        let path_sku = dir.path().join("sku.xlsx");
        let path_style = dir.path().join("style.xlsx");
        let path_output = dir.path().join("merged.xlsx");
        write_tables(
            &path_sku,
            &[("Sheet1", &table(&["styleId", "Brand Size"], vec![vec!["S1".into(), "M".into()]]))],
        )
        .unwrap();
        write_tables(
            &path_style,
            &[(
                "Sheet1",
                &table(&["styleId", "BrandSize"], vec![vec!["S1".into(), "Medium".into()]]),
            )],
        )
        .unwrap();

        let report =
            process_import(&path_sku, &path_style, Some(&path_output), &Settings::default())
                .unwrap();

        assert_eq!(report.merge.columns_count, 3);
        let mut reader = XlsxReader::open(&path_output, SpecXlsxReadOptions::default()).unwrap();
        let values = reader.read_sheet("Values").unwrap();
        assert_eq!(values.columns(), &["styleId", "Brand Size", "BrandSize_style"]);
        assert_eq!(text_rows(&values), vec![vec!["S1", "M", "Medium"]]);
    }

    #[test]
    fn test_process_import_merges_sheets_and_writes_types() {
        let dir = tempfile::tempdir().unwrap();
        let path_sku = dir.path().join("sku.xlsx");
        let path_style = dir.path().join("style.xlsx");
        let path_output = dir.path().join("merged.xlsx");
        let sku_shirts = table(
            &["sku_id", "styleId", "qty"],
            vec![
                vec!["A1".into(), "ST1".into(), 5.0.into()],
                vec!["A2".into(), "ST9".into(), 1.0.into()],
            ],
        );
        let sku_pants = table(
            &["sku_id", "styleId", "qty"],
            vec![vec!["B1".into(), "ST2".into(), 3.0.into()]],
        );
        let master = table(&["note"], vec![vec!["ignore".into()]]);
        let style = table(
            &["styleId", "name", "image_url"],
            vec![
                vec!["ST1".into(), "Red Shirt".into(), "http://x/1.jpg".into()],
                vec!["ST2".into(), "Blue Pants".into(), EnumCellValue::Empty],
            ],
        );
        write_tables(
            &path_sku,
            &[("Shirts", &sku_shirts), ("masterdata", &master), ("Pants", &sku_pants)],
        )
        .unwrap();
        write_tables(&path_style, &[("Styles", &style)]).unwrap();

        let report =
            process_import(&path_sku, &path_style, Some(&path_output), &Settings::default())
                .unwrap();

        assert_eq!(report.sheets_merged, 2);
        assert_eq!(report.merge.rows_processed, 3);
        assert_eq!(report.merge.rows_matched, 2);
        assert_eq!(report.merge.rows_unmatched, 1);

        let mut reader = XlsxReader::open(&path_output, SpecXlsxReadOptions::default()).unwrap();
        assert_eq!(reader.sheet_names(), vec!["Types", "Values"]);
        let values = reader.read_sheet("Values").unwrap();
        assert_eq!(values.columns(), &["sku_id", "styleId", "qty", "name", "image_url"]);
        assert_eq!(
            text_rows(&values),
            vec![
                vec!["A1", "ST1", "5", "Red Shirt", "http://x/1.jpg"],
                vec!["A2", "ST9", "1", "", ""],
                vec!["B1", "ST2", "3", "Blue Pants", ""],
            ]
        );
        let types = reader.read_sheet("Types").unwrap();
        assert_eq!(
            text_rows(&types)[2],
            vec!["", "", "string", "string", "string", "string", "image"]
        );
    }

    #[test]
    fn test_process_import_missing_key_names_column() {
        let dir = tempfile::tempdir().unwrap();
        let path_sku = dir.path().join("sku.xlsx");
        let path_style = dir.path().join("style.xlsx");
        write_tables(&path_sku, &[("Sheet1", &table(&["sku_id", "qty"], vec![]))]).unwrap();
        write_tables(&path_style, &[("Sheet1", &table(&["styleId"], vec![]))]).unwrap();

        let mut settings = Settings::default();
        settings.import.sku_key_column = Some("style_key".to_string());

        let err = process_import(&path_sku, &path_style, None, &settings).unwrap_err();

        assert!(err.to_string().contains("\"style_key\""), "{err}");
    }

    #[test]
    fn test_process_extract_missing_keeps_types_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path_input = dir.path().join("cast.xlsx");
        let path_flagged = dir.path().join("flagged.xlsx");
        let path_output = dir.path().join("missing.xlsx");
        let types = table(
            &["Column1", "Column2", "styleId"],
            vec![vec![EnumCellValue::Empty, EnumCellValue::Empty, "styleId".into()]],
        );
        let values = table(&["styleId"], vec![vec!["S1".into()], vec!["S2".into()]]);
        let flagged = table(
            &["styleId", "AI Generated Image Flag"],
            vec![vec!["S1".into(), "yes".into()], vec!["S2".into(), EnumCellValue::Empty]],
        );
        write_tables(&path_input, &[("Types", &types), ("Values", &values)]).unwrap();
        write_tables(&path_flagged, &[("Sheet1", &flagged)]).unwrap();

        let report = process_extract_missing(
            &path_input,
            &path_flagged,
            &path_output,
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(report.missing_count, 1);
        assert_eq!(report.rows_extracted, 1);
        assert_eq!(report.types_rows, 1);
        let mut reader = XlsxReader::open(&path_output, SpecXlsxReadOptions::default()).unwrap();
        assert_eq!(reader.read_sheet("Types").unwrap(), types);
        assert_eq!(text_rows(&reader.read_sheet("Values").unwrap()), vec![vec!["S2"]]);
    }

    #[test]
    fn test_process_merge_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path_output_in = dir.path().join("output.xlsx");
        let path_sample = dir.path().join("sample.xlsx");
        let path_result = dir.path().join("result.xlsx");
        write_tables(
            &path_output_in,
            &[(
                "Sheet1",
                &table(
                    &["styleId", "name"],
                    vec![vec!["S1".into(), "old".into()], vec!["S2".into(), "keep".into()]],
                ),
            )],
        )
        .unwrap();
        write_tables(
            &path_sample,
            &[("Sheet1", &table(&["styleId", "name"], vec![vec!["S1".into(), "new".into()]]))],
        )
        .unwrap();

        let report = process_merge_sample(
            &path_output_in,
            &path_sample,
            &path_result,
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(report.rows_updated, 1);
        assert_eq!(report.total_rows, 2);
        assert_eq!(
            text_rows(&read_table(&path_result).unwrap()),
            vec![vec!["S1", "new"], vec!["S2", "keep"]]
        );
    }
}
