//! Layered settings: defaults, optional YAML file, then `RUBICK_CAST_*` env.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use rubick_cast::{
    C_SHEET_TYPES, C_SHEET_VALUES, compile_column_patterns, derive_default_exclude_sheets,
    derive_default_image_column_patterns, derive_default_style_column_patterns,
};
use rubick_cast::conf::{C_COL_AI_FLAG_DEFAULT, C_COL_STYLE_ID_DEFAULT};
use rubick_cast_io_xlsx::{EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecXlsxWriteOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file picked up from the working directory when present.
pub const C_FILE_CONFIG_DEFAULT: &str = "rubick-cast.yaml";
/// Environment prefix; nested keys are split on `__`.
pub const C_ENV_PREFIX: &str = "RUBICK_CAST_";

const TUP_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const TUP_LOG_FORMATS: [&str; 2] = ["pretty", "json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid max_file_size_mb: {0}. Must be at least 1")]
    InvalidMaxFileSize(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json")]
    InvalidLogFormat(String),

    #[error("{0} cannot be empty")]
    EmptyPatterns(&'static str),

    #[error("Invalid {field}: {message}")]
    InvalidPattern { field: &'static str, message: String },

    #[error("Invalid autofit_columns: {0}. Must be one of: none, header, body, all")]
    InvalidAutofitColumns(String),

    #[error("Invalid column widths: min {min}, max {max}. Need 1 <= min <= max")]
    InvalidColumnWidth { min: usize, max: usize },
}

////////////////////////////////////////////////////////////////////////////////
// #region Sections

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecAppSettings {
    pub app_name: String,
    pub log_level: String,
    pub log_format: String,
    /// Inputs larger than this are rejected before reading.
    pub max_file_size_mb: u64,
}

impl Default for SpecAppSettings {
    fn default() -> Self {
        Self {
            app_name: "Rubick CAST Formatting".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            max_file_size_mb: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecExportSettings {
    /// Prepended to the input file name when no output path is given.
    pub output_prefix: String,
    pub preserve_unknown_columns: bool,
}

impl Default for SpecExportSettings {
    fn default() -> Self {
        Self {
            output_prefix: "Formatted_".to_string(),
            preserve_unknown_columns: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecImportSettings {
    /// Used when no output path is given; written next to the SKU workbook.
    pub output_filename: String,
    pub exclude_sheets: Vec<String>,
    /// Detected per sheet when unset.
    pub sku_key_column: Option<String>,
    /// Detected per sheet when unset.
    pub style_key_column: Option<String>,
    pub style_column_patterns: Vec<String>,
    pub image_column_patterns: Vec<String>,
    pub write_types_sheet: bool,
}

impl Default for SpecImportSettings {
    fn default() -> Self {
        Self {
            output_filename: "Batch_Merged_With_Types_Values.xlsx".to_string(),
            exclude_sheets: derive_default_exclude_sheets(),
            sku_key_column: None,
            style_key_column: None,
            style_column_patterns: derive_default_style_column_patterns(),
            image_column_patterns: derive_default_image_column_patterns(),
            write_types_sheet: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecExtractSettings {
    pub style_id_column: String,
    pub flag_column: String,
    pub values_sheet: String,
    pub types_sheet: String,
}

impl Default for SpecExtractSettings {
    fn default() -> Self {
        Self {
            style_id_column: C_COL_STYLE_ID_DEFAULT.to_string(),
            flag_column: C_COL_AI_FLAG_DEFAULT.to_string(),
            values_sheet: C_SHEET_VALUES.to_string(),
            types_sheet: C_SHEET_TYPES.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecOutputSettings {
    /// Text written into empty cells; left blank when unset.
    pub missing_value: Option<String>,
    /// Source of the inferred column widths: none, header, body or all.
    pub autofit_columns: String,
    /// Body rows inspected for widths; every row when unset.
    pub autofit_rows_max: Option<usize>,
    pub column_width_min: usize,
    pub column_width_max: usize,
    pub freeze_header: bool,
}

impl Default for SpecOutputSettings {
    fn default() -> Self {
        let policy_autofit = SpecAutofitCellsPolicy::default();
        Self {
            missing_value: None,
            autofit_columns: "all".to_string(),
            autofit_rows_max: policy_autofit.height_body_inferred_max,
            column_width_min: policy_autofit.width_cell_min,
            column_width_max: policy_autofit.width_cell_max,
            freeze_header: true,
        }
    }
}

impl SpecOutputSettings {
    /// Workbook writer options for every output file.
    pub fn derive_write_options(&self) -> Result<SpecXlsxWriteOptions, ConfigError> {
        let rule_columns = EnumAutofitColumnsRule::parse(&self.autofit_columns)
            .ok_or_else(|| ConfigError::InvalidAutofitColumns(self.autofit_columns.clone()))?;
        if self.column_width_min == 0 || self.column_width_max < self.column_width_min {
            return Err(ConfigError::InvalidColumnWidth {
                min: self.column_width_min,
                max: self.column_width_max,
            });
        }

        Ok(SpecXlsxWriteOptions {
            policy_autofit: SpecAutofitCellsPolicy {
                rule_columns,
                height_body_inferred_max: self.autofit_rows_max,
                width_cell_min: self.column_width_min,
                width_cell_max: self.column_width_max,
                ..Default::default()
            },
            if_freeze_header: self.freeze_header,
            missing_value_str: self.missing_value.clone(),
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Settings

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: SpecAppSettings,
    pub export: SpecExportSettings,
    pub import: SpecImportSettings,
    pub extract: SpecExtractSettings,
    pub output: SpecOutputSettings,
}

impl Settings {
    /// Load settings with hierarchical merging.
    ///
    /// Precedence (lowest to highest): defaults, `rubick-cast.yaml` in the
    /// working directory (or `path_config` when given), `RUBICK_CAST_*` env.
    pub fn load(path_config: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        figment = match path_config {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()).into());
                }
                figment.merge(Yaml::file(path))
            }
            None => figment.merge(Yaml::file(C_FILE_CONFIG_DEFAULT)),
        };

        let settings: Settings = figment
            .merge(Env::prefixed(C_ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load from one YAML file over the defaults, ignoring the environment.
    pub fn load_from_file(path_config: impl AsRef<Path>) -> Result<Self> {
        let path_config = path_config.as_ref();
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path_config))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path_config.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.max_file_size_mb == 0 {
            return Err(ConfigError::InvalidMaxFileSize(self.app.max_file_size_mb));
        }
        if !TUP_LOG_LEVELS.contains(&self.app.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.app.log_level.clone()));
        }
        if !TUP_LOG_FORMATS.contains(&self.app.log_format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(self.app.log_format.clone()));
        }

        for (field, l_patterns) in [
            ("style_column_patterns", &self.import.style_column_patterns),
            ("image_column_patterns", &self.import.image_column_patterns),
        ] {
            if l_patterns.is_empty() {
                return Err(ConfigError::EmptyPatterns(field));
            }
            compile_column_patterns(l_patterns).map_err(|err| ConfigError::InvalidPattern {
                field,
                message: err.to_string(),
            })?;
        }
        self.output.derive_write_options()?;
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
