//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use rust_xlsxwriter::FormatAlign;

use crate::spec::{SpecCellFormat, SpecXlsxWriteOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// File extensions the reader accepts (lower-case, without dot).
pub const TUP_WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumFmtKey {
    /// Text cell format.
    Text,
    /// Number cell format.
    Number,
    /// Date-time cell format.
    Date,
    /// Header cell format.
    Header,
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text, cfg_base_fmt.clone());
    dict_fmt.insert(EnumFmtKey::Number, cfg_base_fmt.clone());
    dict_fmt.insert(
        EnumFmtKey::Date,
        SpecCellFormat {
            num_format: Some("yyyy-mm-dd hh:mm:ss".to_string()),
            ..cfg_base_fmt.clone()
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Header,
        SpecCellFormat {
            bold: Some(true),
            if_border: true,
            align: Some(FormatAlign::Center),
            ..cfg_base_fmt
        },
    );

    dict_fmt
}

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
