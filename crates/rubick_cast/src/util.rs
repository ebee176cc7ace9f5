//! Stateless helpers for column matching and key normalization.

use std::collections::{BTreeMap, BTreeSet};

use regex::{Regex, RegexBuilder};

use crate::conf::{C_TYPE_IMAGE, C_TYPE_STRING};
use crate::spec::{EnumCellValue, SchemaError};

////////////////////////////////////////////////////////////////////////////////
// #region NameNormalization

/// Normalize a column name for lookup: trimmed, lower-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Canonical column identity used when unioning sheets: lower-cased, all whitespace removed.
pub fn normalize_canonical_column_name(name: &str) -> String {
    name.chars()
        .filter(|chr| !chr.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized join key of a cell, `None` when the cell is blank.
pub fn normalize_key(value: &EnumCellValue) -> Option<String> {
    if value.is_blank() {
        return None;
    }
    Some(value.to_text().trim().to_lowercase())
}

/// Find `name` in `columns`.
///
/// An exact match wins; otherwise the first normalized match. Headers may
/// differ only by case, so the exact pass keeps `a` and `A` apart.
pub fn find_column_in_list(columns: &[String], name: &str) -> Option<usize> {
    if let Some(n_idx) = columns.iter().position(|c_col| c_col == name) {
        return Some(n_idx);
    }
    let c_name_norm = normalize_column_name(name);
    columns
        .iter()
        .position(|c_col| normalize_column_name(c_col) == c_name_norm)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SchemaValidation

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), SchemaError> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {:?}", l_pos.len(), l_pos))
        .collect::<Vec<_>>()
        .join("; ");

    Err(SchemaError::DuplicateColumns(c_msg))
}

/// Short column listing for error messages: at most five names, then `...`.
pub fn derive_column_preview(columns: &[String]) -> String {
    let mut c_preview = columns
        .iter()
        .take(5)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if columns.len() > 5 {
        c_preview.push_str(", ...");
    }
    c_preview
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Compile case-insensitive column patterns.
pub fn compile_column_patterns(patterns: &[String]) -> Result<Vec<Regex>, SchemaError> {
    patterns
        .iter()
        .map(|c_pat| {
            RegexBuilder::new(c_pat)
                .case_insensitive(true)
                .build()
                .map_err(|err| SchemaError::InvalidPattern(format!("{c_pat:?}: {err}")))
        })
        .collect()
}

/// Index of the first column matched by any pattern.
///
/// Columns are scanned in order; for each column the patterns are tried in order.
pub fn find_column_by_patterns(columns: &[String], patterns: &[Regex]) -> Option<usize> {
    columns
        .iter()
        .position(|c_col| patterns.iter().any(|pat| pat.is_match(c_col)))
}

/// Infer the CAST value type of a column from its name.
pub fn infer_column_type(name: &str, image_patterns: &[Regex]) -> &'static str {
    if image_patterns.iter().any(|pat| pat.is_match(name)) {
        C_TYPE_IMAGE
    } else {
        C_TYPE_STRING
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{derive_default_image_column_patterns, derive_default_style_column_patterns};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_find_column_ignores_case_and_surrounding_space() {
        let l_cols = cols(&["sku", " Size "]);
        assert_eq!(find_column_in_list(&l_cols, "SKU"), Some(0));
        assert_eq!(find_column_in_list(&l_cols, "size"), Some(1));
        assert_eq!(find_column_in_list(&l_cols, "Color"), None);
    }

    #[test]
    fn test_find_column_prefers_exact_name() {
        let l_cols = cols(&["a", "A"]);
        assert_eq!(find_column_in_list(&l_cols, "a"), Some(0));
        assert_eq!(find_column_in_list(&l_cols, "A"), Some(1));
        assert_eq!(find_column_in_list(&l_cols, " A "), Some(0));
    }

    #[test]
    fn test_canonical_name_strips_inner_whitespace() {
        assert_eq!(normalize_canonical_column_name("Brand  Size"), "brandsize");
        assert_eq!(normalize_canonical_column_name(" brand size "), "brandsize");
    }

    #[test]
    fn test_normalize_key_skips_blank_and_folds_case() {
        assert_eq!(normalize_key(&EnumCellValue::from(" St1 ")), Some("st1".to_string()));
        assert_eq!(normalize_key(&EnumCellValue::Number(42.0)), Some("42".to_string()));
        assert_eq!(normalize_key(&EnumCellValue::from("  ")), None);
        assert_eq!(normalize_key(&EnumCellValue::Empty), None);
    }

    #[test]
    fn test_validate_unique_columns_reports_positions() {
        let err = validate_unique_columns(&cols(&["a", "b", "a"])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumns("\"a\" x2 at indices [0, 2]".to_string())
        );
        assert!(validate_unique_columns(&cols(&["a", "A"])).is_ok());
    }

    #[test]
    fn test_style_patterns_detect_expected_columns() {
        let l_pats = compile_column_patterns(&derive_default_style_column_patterns()).unwrap();
        assert_eq!(find_column_by_patterns(&cols(&["qty", "Style_Id"]), &l_pats), Some(1));
        assert_eq!(find_column_by_patterns(&cols(&["SKU", "name"]), &l_pats), Some(0));
        assert_eq!(find_column_by_patterns(&cols(&["myStyleId"]), &l_pats), Some(0));
        assert_eq!(find_column_by_patterns(&cols(&["sku_id", "name"]), &l_pats), None);
    }

    #[test]
    fn test_infer_column_type_marks_image_columns() {
        let l_pats = compile_column_patterns(&derive_default_image_column_patterns()).unwrap();
        assert_eq!(infer_column_type("Front Image", &l_pats), "image");
        assert_eq!(infer_column_type("CDN Link", &l_pats), "image");
        assert_eq!(infer_column_type("Color", &l_pats), "string");
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let err = compile_column_patterns(&cols(&["("])).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern(_)));
    }

    #[test]
    fn test_column_preview_truncates() {
        let l_cols = cols(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(derive_column_preview(&l_cols), "a, b, c, d, e, ...");
    }
}
