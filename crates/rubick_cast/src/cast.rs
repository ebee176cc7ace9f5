//! CAST workbook helpers: sheet concatenation and the Types sheet.

use std::collections::HashMap;

use regex::Regex;

use crate::conf::{C_TYPES_MANDATORY, TUP_TYPES_LEADING_COLUMNS};
use crate::spec::{EnumCellValue, SchemaError, SpecTable};
use crate::util::{infer_column_type, normalize_canonical_column_name};

/// Stack tables vertically over the union of their columns.
///
/// Columns are identified canonically (case and whitespace insensitive) and
/// keep the spelling and position of their first appearance. Cells of columns
/// a table lacks are empty.
pub fn concat_tables(tables: &[SpecTable]) -> Result<SpecTable, SchemaError> {
    let mut dict_canonical: HashMap<String, usize> = HashMap::new();
    let mut l_columns: Vec<String> = Vec::new();
    let mut l_mappings: Vec<Vec<usize>> = Vec::with_capacity(tables.len());

    for table in tables {
        let l_mapping = table
            .columns()
            .iter()
            .map(|c_col| {
                let c_key = normalize_canonical_column_name(c_col);
                *dict_canonical.entry(c_key).or_insert_with(|| {
                    l_columns.push(c_col.clone());
                    l_columns.len() - 1
                })
            })
            .collect();
        l_mappings.push(l_mapping);
    }

    let n_rows_total = tables.iter().map(SpecTable::height).sum();
    let mut l_rows = Vec::with_capacity(n_rows_total);
    for (table, l_mapping) in tables.iter().zip(&l_mappings) {
        for row in table.rows() {
            let mut row_out = vec![EnumCellValue::Empty; l_columns.len()];
            for (value, n_idx_out) in row.iter().zip(l_mapping) {
                // Two columns of one table may share a canonical name; keep the first non-blank.
                if row_out[*n_idx_out].is_blank() {
                    row_out[*n_idx_out] = value.clone();
                }
            }
            l_rows.push(row_out);
        }
    }

    SpecTable::new(l_columns, l_rows)
}

/// Build the CAST Types sheet describing `columns`.
///
/// Header is `Column1`, `Column2` followed by `columns`; the three rows hold
/// the column name, `mandatory` and the inferred type.
pub fn derive_types_table(
    columns: &[String],
    image_patterns: &[Regex],
) -> Result<SpecTable, SchemaError> {
    let mut l_header: Vec<String> = TUP_TYPES_LEADING_COLUMNS
        .iter()
        .map(ToString::to_string)
        .collect();
    l_header.extend(columns.iter().cloned());

    let row_lead = vec![EnumCellValue::Empty; TUP_TYPES_LEADING_COLUMNS.len()];
    let mut row_names = row_lead.clone();
    let mut row_required = row_lead.clone();
    let mut row_types = row_lead;
    for c_col in columns {
        row_names.push(EnumCellValue::String(c_col.clone()));
        row_required.push(EnumCellValue::from(C_TYPES_MANDATORY));
        row_types.push(EnumCellValue::from(infer_column_type(c_col, image_patterns)));
    }

    SpecTable::new(l_header, vec![row_names, row_required, row_types])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::derive_default_image_column_patterns;
    use crate::util::compile_column_patterns;

    fn table(columns: &[&str], rows: Vec<Vec<EnumCellValue>>) -> SpecTable {
        SpecTable::new(columns.iter().map(ToString::to_string).collect(), rows).unwrap()
    }

    #[test]
    fn test_concat_unions_columns_canonically() {
        let t1 = table(&["styleId", "Brand Size"], vec![vec!["S1".into(), "M".into()]]);
        let t2 = table(
            &["brandsize", "Color", "StyleId"],
            vec![vec!["L".into(), "Red".into(), "S2".into()]],
        );

        let out = concat_tables(&[t1, t2]).unwrap();

        assert_eq!(out.columns(), &["styleId", "Brand Size", "Color"]);
        assert_eq!(out.rows()[0], vec!["S1".into(), "M".into(), EnumCellValue::Empty]);
        assert_eq!(
            out.rows()[1],
            vec![EnumCellValue::from("S2"), "L".into(), "Red".into()]
        );
    }

    #[test]
    fn test_concat_of_nothing_is_empty() {
        let out = concat_tables(&[]).unwrap();
        assert_eq!(out.width(), 0);
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn test_types_table_layout() {
        let l_pats = compile_column_patterns(&derive_default_image_column_patterns()).unwrap();
        let l_cols = vec!["styleId".to_string(), "Front Image URL".to_string()];

        let out = derive_types_table(&l_cols, &l_pats).unwrap();

        assert_eq!(
            out.columns(),
            &["Column1", "Column2", "styleId", "Front Image URL"]
        );
        assert_eq!(out.height(), 3);
        assert_eq!(out.rows()[0][2], EnumCellValue::from("styleId"));
        assert_eq!(out.rows()[1][3], EnumCellValue::from("mandatory"));
        assert_eq!(out.rows()[2][2], EnumCellValue::from("string"));
        assert_eq!(out.rows()[2][3], EnumCellValue::from("image"));
        assert!(out.rows().iter().all(|row| row[0].is_blank() && row[1].is_blank()));
    }
}
