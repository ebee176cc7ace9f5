//! Import merge formatter: left-join an SKU table with a Style table.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::conf::C_SUFFIX_STYLE_COLLISION;
use crate::spec::{
    EnumCellValue, SchemaError, SpecKeyMapping, SpecMergeOutcome, SpecMergeReport, SpecTable,
};
use crate::util::{
    derive_column_preview, find_column_by_patterns, normalize_canonical_column_name, normalize_key,
};

const C_TABLE_SKU: &str = "SKU";
const C_TABLE_STYLE: &str = "Style";

impl SpecKeyMapping {
    pub fn new(sku_key_column: impl Into<String>, style_key_column: impl Into<String>) -> Self {
        Self {
            sku_key_column: sku_key_column.into(),
            style_key_column: style_key_column.into(),
        }
    }

    /// Detect both key columns by `patterns`.
    pub fn detect(
        sku: &SpecTable,
        style: &SpecTable,
        patterns: &[Regex],
    ) -> Result<Self, SchemaError> {
        Self::resolve(sku, style, None, None, patterns)
    }

    /// Use explicit key names where given and detect the rest by `patterns`.
    pub fn resolve(
        sku: &SpecTable,
        style: &SpecTable,
        sku_key_column: Option<&str>,
        style_key_column: Option<&str>,
        patterns: &[Regex],
    ) -> Result<Self, SchemaError> {
        let c_sku_key = match sku_key_column {
            Some(c_name) => c_name.to_string(),
            None => detect_key_column(C_TABLE_SKU, sku, patterns)?,
        };
        let c_style_key = match style_key_column {
            Some(c_name) => c_name.to_string(),
            None => detect_key_column(C_TABLE_STYLE, style, patterns)?,
        };
        Ok(Self::new(c_sku_key, c_style_key))
    }
}

fn detect_key_column(
    table_name: &str,
    table: &SpecTable,
    patterns: &[Regex],
) -> Result<String, SchemaError> {
    find_column_by_patterns(table.columns(), patterns)
        .map(|n_idx| table.columns()[n_idx].clone())
        .ok_or_else(|| SchemaError::KeyColumnNotDetected {
            table: table_name.to_string(),
            found: derive_column_preview(table.columns()),
        })
}

/// Merge `sku` with `style` on the mapped key columns.
///
/// Every SKU row is emitted once. Output columns are all SKU columns followed
/// by the Style columns except the Style key. The first Style row wins for a
/// repeated key; unmatched or blank SKU keys get empty Style cells.
pub fn import_merge(
    sku: &SpecTable,
    style: &SpecTable,
    key_mapping: &SpecKeyMapping,
) -> Result<SpecTable, SchemaError> {
    import_merge_with_report(sku, style, key_mapping).map(|out| out.table)
}

/// [`import_merge`] with counters.
pub fn import_merge_with_report(
    sku: &SpecTable,
    style: &SpecTable,
    key_mapping: &SpecKeyMapping,
) -> Result<SpecMergeOutcome, SchemaError> {
    let n_idx_sku_key = sku.require_column(C_TABLE_SKU, &key_mapping.sku_key_column)?;
    let n_idx_style_key = style.require_column(C_TABLE_STYLE, &key_mapping.style_key_column)?;

    let mut dict_style_rows: HashMap<String, usize> = HashMap::new();
    let mut n_duplicates = 0usize;
    for (n_idx_row, c_key) in style
        .column_values(n_idx_style_key)
        .map(normalize_key)
        .enumerate()
    {
        let Some(c_key) = c_key else {
            continue;
        };
        if dict_style_rows.contains_key(&c_key) {
            n_duplicates += 1;
        } else {
            dict_style_rows.insert(c_key, n_idx_row);
        }
    }

    let l_cols_idx_style: Vec<usize> = (0..style.width())
        .filter(|n_idx| *n_idx != n_idx_style_key)
        .collect();
    let l_columns = derive_merged_columns(sku.columns(), style.columns(), &l_cols_idx_style);

    let mut l_rows = Vec::with_capacity(sku.height());
    let mut n_matched = 0usize;
    for row_sku in sku.rows() {
        let row_style = normalize_key(&row_sku[n_idx_sku_key])
            .and_then(|c_key| dict_style_rows.get(&c_key))
            .map(|n_idx_row| &style.rows()[*n_idx_row]);
        if row_style.is_some() {
            n_matched += 1;
        }

        let mut row_out = Vec::with_capacity(l_columns.len());
        row_out.extend(row_sku.iter().cloned());
        row_out.extend(l_cols_idx_style.iter().map(|n_idx_col| {
            row_style.map_or(EnumCellValue::Empty, |row| row[*n_idx_col].clone())
        }));
        l_rows.push(row_out);
    }

    let report = SpecMergeReport {
        rows_processed: l_rows.len(),
        rows_matched: n_matched,
        rows_unmatched: l_rows.len() - n_matched,
        style_duplicates_ignored: n_duplicates,
        columns_count: l_columns.len(),
    };

    Ok(SpecMergeOutcome {
        table: SpecTable::new(l_columns, l_rows)?,
        report,
    })
}

/// SKU header followed by the selected Style columns, renaming Style names
/// that collide with an already used name.
///
/// Collisions use the canonical identity (case and whitespace insensitive) that
/// [`crate::cast::concat_tables`] unions on, so no Style column folds away later.
fn derive_merged_columns(
    sku_columns: &[String],
    style_columns: &[String],
    cols_idx_style: &[usize],
) -> Vec<String> {
    let mut set_used: HashSet<String> = sku_columns
        .iter()
        .map(|c_col| normalize_canonical_column_name(c_col))
        .collect();
    let mut l_columns = sku_columns.to_vec();

    for n_idx_col in cols_idx_style {
        let c_col = &style_columns[*n_idx_col];
        let mut c_candidate = c_col.clone();
        let mut n_suffix = 1usize;
        while set_used.contains(&normalize_canonical_column_name(&c_candidate)) {
            c_candidate = if n_suffix == 1 {
                format!("{c_col}{C_SUFFIX_STYLE_COLLISION}")
            } else {
                format!("{c_col}{C_SUFFIX_STYLE_COLLISION}_{n_suffix}")
            };
            n_suffix += 1;
        }
        set_used.insert(normalize_canonical_column_name(&c_candidate));
        l_columns.push(c_candidate);
    }

    l_columns
}
