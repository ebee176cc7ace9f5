//! `rubick_cast_cli` v1:
//! Command surface of the `rubick-format` binary.
//!
//! Modules:
//! - `cli`       : clap argument definitions
//! - `config`    : layered settings (defaults, YAML, env)
//! - `logging`   : tracing subscriber setup
//! - `processor` : file-level export/import/extract-missing/merge-sample
pub mod cli;
pub mod config;
pub mod logging;
pub mod processor;

use anyhow::Result;

use crate::cli::{Args, SubCommand};
use crate::config::Settings;
use crate::logging::{EnumLogFormat, init_logging};
use crate::processor::{
    process_export, process_extract_missing, process_import, process_merge_sample,
};

/// Load settings, set up logging and run one command. Returns the summary line.
pub fn run(args: Args) -> Result<String> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(c_format) = &args.log_format {
        settings.app.log_format = c_format.clone();
    }
    args.command.apply_overrides(&mut settings);
    settings.validate()?;

    init_logging(
        &settings.app.log_level,
        EnumLogFormat::parse(&settings.app.log_format)?,
        args.verbose,
    )?;

    let c_summary = match &args.command {
        SubCommand::Export {
            input,
            template,
            output,
            ..
        } => process_export(input, template, output.as_deref(), &settings)?.to_string(),
        SubCommand::Import {
            sku, style, output, ..
        } => process_import(sku, style, output.as_deref(), &settings)?.to_string(),
        SubCommand::ExtractMissing {
            input,
            flagged,
            output,
        } => process_extract_missing(input, flagged, output, &settings)?.to_string(),
        SubCommand::MergeSample {
            output,
            sample,
            result,
            ..
        } => process_merge_sample(output, sample, result, &settings)?.to_string(),
    };
    Ok(c_summary)
}
