//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "rubick-format")]
#[command(version, about = "Convert spreadsheets to and from the Rubick CAST import format", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Settings file (defaults to ./rubick-cast.yaml when present)
    #[arg(long, global = true, env = "RUBICK_CAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: pretty or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Verbose output (debug logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Reindex a spreadsheet onto the columns of a template
    Export {
        /// Spreadsheet to reformat
        input: PathBuf,

        /// Spreadsheet whose header defines the output columns
        template: PathBuf,

        /// Output workbook (defaults to <prefix><input>.xlsx next to the input)
        output: Option<PathBuf>,

        /// Append input columns the template does not know after the template columns
        #[arg(long)]
        preserve_unknown_columns: bool,
    },

    /// Merge a SKU workbook with a Style workbook into CAST Types/Values sheets
    Import {
        /// Workbook keyed by SKU, one sheet per product group
        sku: PathBuf,

        /// Workbook keyed by style
        style: PathBuf,

        /// Output workbook (defaults to the configured file name next to the SKU workbook)
        output: Option<PathBuf>,

        /// Key column of the SKU sheets (detected when omitted)
        #[arg(long)]
        sku_key: Option<String>,

        /// Key column of the Style sheets (detected when omitted)
        #[arg(long)]
        style_key: Option<String>,

        /// Sheet names to skip, comma separated
        #[arg(long, value_delimiter = ',')]
        exclude_sheets: Option<Vec<String>>,

        /// Write only the Values sheet
        #[arg(long)]
        no_types_sheet: bool,
    },

    /// Extract the Values rows whose styles have no AI image flag
    ExtractMissing {
        /// CAST workbook with Types and Values sheets
        input: PathBuf,

        /// Processed output holding the flag column
        flagged: PathBuf,

        /// Output workbook
        output: PathBuf,
    },

    /// Overwrite rows of an output file with reviewed sample rows
    MergeSample {
        /// Output file to update
        output: PathBuf,

        /// Reviewed sample rows
        sample: PathBuf,

        /// Result workbook
        result: PathBuf,

        /// Key column shared by both files
        #[arg(long)]
        key: Option<String>,
    },
}

impl SubCommand {
    /// Fold command flags into `settings`; flags win over file and env values.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        match self {
            SubCommand::Export {
                preserve_unknown_columns,
                ..
            } => {
                if *preserve_unknown_columns {
                    settings.export.preserve_unknown_columns = true;
                }
            }
            SubCommand::Import {
                sku_key,
                style_key,
                exclude_sheets,
                no_types_sheet,
                ..
            } => {
                if let Some(c_key) = sku_key {
                    settings.import.sku_key_column = Some(c_key.clone());
                }
                if let Some(c_key) = style_key {
                    settings.import.style_key_column = Some(c_key.clone());
                }
                if let Some(l_sheets) = exclude_sheets {
                    settings.import.exclude_sheets = l_sheets.clone();
                }
                if *no_types_sheet {
                    settings.import.write_types_sheet = false;
                }
            }
            SubCommand::ExtractMissing { .. } => {}
            SubCommand::MergeSample { key, .. } => {
                if let Some(c_key) = key {
                    settings.extract.style_id_column = c_key.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_import_with_overrides() {
        let args = Args::try_parse_from([
            "rubick-format",
            "import",
            "sku.xlsx",
            "style.xlsx",
            "out.xlsx",
            "--sku-key",
            "style_key",
            "--exclude-sheets",
            "masterdata,notes",
            "--no-types-sheet",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);

        let mut settings = Settings::default();
        args.command.apply_overrides(&mut settings);

        assert_eq!(settings.import.sku_key_column.as_deref(), Some("style_key"));
        assert_eq!(settings.import.style_key_column, None);
        assert_eq!(settings.import.exclude_sheets, vec!["masterdata", "notes"]);
        assert!(!settings.import.write_types_sheet);
    }

    #[test]
    fn test_parse_export_output_is_optional() {
        let args = Args::try_parse_from(["rubick-format", "export", "in.xlsx", "tpl.xlsx"]).unwrap();

        let SubCommand::Export { output, .. } = args.command else {
            panic!("expected export");
        };
        assert_eq!(output, None);
    }

    #[test]
    fn test_export_requires_template() {
        assert!(Args::try_parse_from(["rubick-format", "export", "in.xlsx"]).is_err());
    }
}
