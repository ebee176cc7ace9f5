//! Follow-up operations on produced CAST files: extract rows with a missing
//! flag, and overwrite rows from a reviewed sample.

use std::collections::{HashMap, HashSet};

use crate::spec::{
    SchemaError, SpecExtractMissingOptions, SpecExtractMissingOutcome, SpecMergeSampleOutcome,
    SpecTable,
};
use crate::util::normalize_key;

/// Keep the `values` rows whose key has a blank flag in `flagged`.
pub fn extract_missing(
    values: &SpecTable,
    flagged: &SpecTable,
    options: &SpecExtractMissingOptions,
) -> Result<SpecExtractMissingOutcome, SchemaError> {
    let n_idx_flag = flagged.require_column("Flagged", &options.flag_column)?;
    let n_idx_flagged_key = flagged.require_column("Flagged", &options.style_id_column)?;
    let n_idx_values_key = values.require_column("Values", &options.style_id_column)?;

    let set_keys_missing: HashSet<String> = flagged
        .rows()
        .iter()
        .filter(|row| row[n_idx_flag].is_blank())
        .filter_map(|row| normalize_key(&row[n_idx_flagged_key]))
        .collect();

    let l_rows = values
        .rows()
        .iter()
        .filter(|row| {
            normalize_key(&row[n_idx_values_key])
                .is_some_and(|c_key| set_keys_missing.contains(&c_key))
        })
        .cloned()
        .collect();

    Ok(SpecExtractMissingOutcome {
        table: SpecTable::new(values.columns().to_vec(), l_rows)?,
        missing_count: set_keys_missing.len(),
    })
}

/// Overwrite `output` rows with the `sample` row of the same key.
///
/// Only columns present in both tables are written; the first sample row wins
/// for a repeated key. Row order and header of `output` are kept.
pub fn merge_sample(
    output: &SpecTable,
    sample: &SpecTable,
    key_column: &str,
) -> Result<SpecMergeSampleOutcome, SchemaError> {
    let n_idx_output_key = output.require_column("Output", key_column)?;
    let n_idx_sample_key = sample.require_column("Sample", key_column)?;

    let mut dict_sample_rows: HashMap<String, usize> = HashMap::new();
    for (n_idx_row, row) in sample.rows().iter().enumerate() {
        if let Some(c_key) = normalize_key(&row[n_idx_sample_key]) {
            dict_sample_rows.entry(c_key).or_insert(n_idx_row);
        }
    }

    // (output column, sample column) pairs, key excluded
    let l_cols_common: Vec<(usize, usize)> = output
        .columns()
        .iter()
        .enumerate()
        .filter(|(n_idx, _)| *n_idx != n_idx_output_key)
        .filter_map(|(n_idx, c_col)| sample.find_column(c_col).map(|n_idx_s| (n_idx, n_idx_s)))
        .filter(|(_, n_idx_s)| *n_idx_s != n_idx_sample_key)
        .collect();

    let mut n_rows_updated = 0usize;
    let mut l_rows = output.rows().to_vec();
    for row in &mut l_rows {
        let Some(row_sample) = normalize_key(&row[n_idx_output_key])
            .and_then(|c_key| dict_sample_rows.get(&c_key))
            .map(|n_idx_row| &sample.rows()[*n_idx_row])
        else {
            continue;
        };
        for (n_idx_out, n_idx_sample) in &l_cols_common {
            row[*n_idx_out] = row_sample[*n_idx_sample].clone();
        }
        n_rows_updated += 1;
    }

    Ok(SpecMergeSampleOutcome {
        table: SpecTable::new(output.columns().to_vec(), l_rows)?,
        rows_updated: n_rows_updated,
    })
}
