//! Command-line front end for the replayable-spreadsheet validator.
//!
//! Exit codes:
//!
//! - 0: no ERROR or FATAL findings
//! - 1: at least one ERROR finding
//! - 2: validation aborted by a FATAL finding
//! - 3: the tool itself failed (bad arguments, unreadable template, write error)

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use rpsv::logging::{init_logging, LogConfig, LogFormat};
use rpsv::schema::DEFAULT_HEADER_SCAN_LIMIT;
use rpsv::template::Template;
use rpsv::{ReportFormat, ValidationOutcome, Validator, ValidatorConfig};

const EXIT_ERRORS: u8 = 1;
const EXIT_FATAL: u8 = 2;
const EXIT_TOOL_FAILURE: u8 = 3;

#[derive(Parser)]
#[command(
    name = "rpsv",
    version,
    about = "Validate a replayable spreadsheet of MODS metadata",
    long_about = "Validate a replayable spreadsheet (.csv, .xls or .xlsx) before it is \
                  converted to MODS records.\n\n\
                  Findings are reported as ERROR, WARNING or INFO; a FATAL finding \
                  stops validation early."
)]
struct Cli {
    /// Spreadsheet to validate.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Reference MODS template (defaults to the bundled template).
    #[arg(long = "template", value_name = "PATH")]
    template: Option<PathBuf>,

    /// Write the report to a file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Report format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    format: FormatArg,

    /// Number of leading rows searched for the header row.
    #[arg(long = "header-scan-limit", value_name = "ROWS", default_value_t = DEFAULT_HEADER_SCAN_LIMIT)]
    header_scan_limit: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    log_format: LogFormatArg,
}

/// CLI report format choices.
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if let Err(print_err) = err.print() {
                eprintln!("error: failed to print usage: {print_err}");
                return ExitCode::from(EXIT_TOOL_FAILURE);
            }
            return if err.use_stderr() {
                ExitCode::from(EXIT_TOOL_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        },
    };

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::from(EXIT_TOOL_FAILURE);
    }

    match run(&cli) {
        Ok(outcome) if outcome.is_aborted() => ExitCode::from(EXIT_FATAL),
        Ok(outcome) if outcome.has_errors() => ExitCode::from(EXIT_ERRORS),
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(EXIT_TOOL_FAILURE)
        },
    }
}

fn run(cli: &Cli) -> Result<ValidationOutcome> {
    let mut config = ValidatorConfig::new().with_header_scan_limit(cli.header_scan_limit);
    if let Some(path) = &cli.template {
        let template = Template::from_path(path)
            .with_context(|| format!("failed to load template {}", path.display()))?;
        config = config.with_template(template);
    }

    let validator = Validator::new(config).context("failed to build validator")?;
    let outcome = validator.validate_file(&cli.file);

    if outcome.is_clean() {
        println!("No errors logged.");
        return Ok(outcome);
    }

    let format = ReportFormat::from(cli.format);
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            outcome.write_report(format, &mut writer)?;
            writer.flush()?;
        },
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            outcome.write_report(format, &mut writer)?;
            writer.flush()?;
        },
    }
    Ok(outcome)
}
