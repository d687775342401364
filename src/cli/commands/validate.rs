//! `validate` command
//!
//! Loads each configuration file through the full pipeline and reports the
//! result without starting anything.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{CatFactsError, ConfigError, Severity, ValidationIssue};

/// Per-file validation outcome.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validate configuration files without starting the server.
///
/// Every file is checked even after a failure.
///
/// # Errors
///
/// Returns the first file's error if any file fails to load or validate,
/// or, with `--strict`, has warnings.
pub fn run(args: &ValidateArgs) -> Result<(), CatFactsError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<CatFactsError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");

        match loader.load(path) {
            Ok(result) => {
                let failed = args.strict && !result.warnings.is_empty();
                if failed && first_error.is_none() {
                    first_error = Some(strict_failure(path, &result.warnings).into());
                }
                reports.push(FileReport {
                    file: path.display().to_string(),
                    valid: !failed,
                    errors: Vec::new(),
                    warnings: result.warnings.iter().map(ToString::to_string).collect(),
                });
            }
            Err(e) => {
                reports.push(FileReport {
                    file: path.display().to_string(),
                    valid: false,
                    errors: vec![e.to_string()],
                    warnings: Vec::new(),
                });
                first_error.get_or_insert(e.into());
            }
        }
    }

    print_reports(&reports, args.format)?;
    first_error.map_or(Ok(()), Err)
}

/// Turns warnings into a validation error for `--strict`.
fn strict_failure(path: &Path, warnings: &[LoadWarning]) -> ConfigError {
    ConfigError::ValidationError {
        path: path.display().to_string(),
        errors: warnings
            .iter()
            .map(|w| ValidationIssue {
                path: w.location.clone().unwrap_or_default(),
                message: w.message.clone(),
                severity: Severity::Warning,
            })
            .collect(),
    }
}

fn print_reports(reports: &[FileReport], format: OutputFormat) -> Result<(), CatFactsError> {
    match format {
        OutputFormat::Human => {
            for report in reports {
                let status = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {status}", report.file);
                for error in &report.errors {
                    println!("  error: {error}");
                }
                for warning in &report.warnings {
                    println!("  warning: {warning}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
    }
    Ok(())
}
