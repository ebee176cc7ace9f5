//! CAST format constants and default presets.

/// Default key column of the extract-missing and merge-sample operations.
pub const C_COL_STYLE_ID_DEFAULT: &str = "styleId";
/// Default flag column inspected by extract-missing.
pub const C_COL_AI_FLAG_DEFAULT: &str = "AI Generated Image Flag";

/// Name of the CAST column-metadata sheet.
pub const C_SHEET_TYPES: &str = "Types";
/// Name of the CAST data sheet.
pub const C_SHEET_VALUES: &str = "Values";

/// Leading placeholder columns of the Types sheet.
pub const TUP_TYPES_LEADING_COLUMNS: [&str; 2] = ["Column1", "Column2"];
/// Requirement marker written to the second Types row.
pub const C_TYPES_MANDATORY: &str = "mandatory";
/// Type written for image-like columns.
pub const C_TYPE_IMAGE: &str = "image";
/// Type written for every other column.
pub const C_TYPE_STRING: &str = "string";

/// Suffix for Style columns whose name collides with an SKU column.
pub const C_SUFFIX_STYLE_COLLISION: &str = "_style";

/// Sheet names skipped when reading an SKU workbook.
pub fn derive_default_exclude_sheets() -> Vec<String> {
    vec!["masterdata".to_string()]
}

/// Case-insensitive patterns that identify the style key column, tried in order.
pub fn derive_default_style_column_patterns() -> Vec<String> {
    vec![
        r"^style[_\s\-]?id$".to_string(),
        r"^sku$".to_string(),
        r"styleid".to_string(),
    ]
}

/// Case-insensitive patterns that mark a column as holding images.
pub fn derive_default_image_column_patterns() -> Vec<String> {
    ["image", "img", "url", "cdn"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
