//! Export formatter: reindex a table onto a template header.

use std::collections::BTreeSet;

use crate::spec::{
    EnumCellValue, SchemaError, SpecExportOptions, SpecExportOutcome, SpecExportReport, SpecTable,
};

/// Reindex `input` so its columns are exactly `template`'s columns.
///
/// Template columns absent from `input` become empty columns and input columns
/// absent from the template are dropped. An exact name match wins, otherwise
/// names match case-insensitively after trimming; output headers are spelled as
/// in the template.
pub fn export(input: &SpecTable, template: &SpecTable) -> Result<SpecTable, SchemaError> {
    export_with_options(input, template, &SpecExportOptions::default()).map(|out| out.table)
}

/// [`export`] with options and counters.
pub fn export_with_options(
    input: &SpecTable,
    template: &SpecTable,
    options: &SpecExportOptions,
) -> Result<SpecExportOutcome, SchemaError> {
    if template.width() == 0 {
        return Err(SchemaError::EmptyTemplate);
    }
    if input.width() == 0 {
        return Err(SchemaError::EmptyInput);
    }

    // (output name, source column in `input`)
    let mut l_plan: Vec<(String, Option<usize>)> = template
        .columns()
        .iter()
        .map(|c_col| (c_col.clone(), input.find_column(c_col)))
        .collect();

    if options.if_preserve_unknown_columns {
        // Input columns no template column consumed.
        let set_idx_used: BTreeSet<usize> = l_plan.iter().filter_map(|(_, src)| *src).collect();
        for (n_idx_col, c_col) in input.columns().iter().enumerate() {
            if !set_idx_used.contains(&n_idx_col) {
                l_plan.push((c_col.clone(), Some(n_idx_col)));
            }
        }
    }

    let l_columns: Vec<String> = l_plan.iter().map(|(c_col, _)| c_col.clone()).collect();
    let l_rows: Vec<Vec<EnumCellValue>> = input
        .rows()
        .iter()
        .map(|row| {
            l_plan
                .iter()
                .map(|(_, n_idx_src)| match n_idx_src {
                    Some(n_idx) => row[*n_idx].clone(),
                    None => EnumCellValue::Empty,
                })
                .collect()
        })
        .collect();

    let report = SpecExportReport {
        rows_processed: l_rows.len(),
        columns_in_input: input.width(),
        columns_in_output: l_columns.len(),
        columns_added: l_plan.iter().filter(|(_, src)| src.is_none()).count(),
    };

    Ok(SpecExportOutcome {
        table: SpecTable::new(l_columns, l_rows)?,
        report,
    })
}
