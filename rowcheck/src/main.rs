//! rowcheck CLI - Validate CSV files before loading them
//!
//! # Commands
//!
//! ```bash
//! rowcheck validate input.csv --config job.json -o clean.csv --errors errors.json
//! rowcheck clean input.csv -o trimmed.csv     # Strip whitespace from every cell
//! rowcheck coerce " 12.7 " --min 0            # Try the integer coercer on one value
//! rowcheck parse input.csv                    # Dump parsed records as JSON
//! ```

use clap::{ArgAction, Parser, Subcommand};
use rowcheck::parser::format_delimiter;
use rowcheck::transform::coerce::clamp_min;
use rowcheck::{
    coerce, derive_columns, read_csv_file, render_error_lines, run_with_headers,
    strip_whitespace, write_csv, write_error_report, write_report, JobConfig, OnFailure,
    ValidationReport,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rejection reasons echoed to stderr before truncating.
const SHOWN_ERRORS: usize = 10;

#[derive(Parser)]
#[command(name = "rowcheck")]
#[command(about = "Header checks, row validation and safe integer coercion for CSV files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CSV file and split it into accepted rows and errors
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Job configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Column that must be present in the header row (repeatable)
        #[arg(long = "require-header", value_name = "HEADER")]
        require_header: Vec<String>,

        /// Column that must be non-blank in every row (repeatable)
        #[arg(long = "non-empty", value_name = "FIELD")]
        non_empty: Vec<String>,

        /// Column converted to an integer (repeatable)
        #[arg(long = "int", value_name = "FIELD")]
        int: Vec<String>,

        /// What a failed integer conversion does: reject | use-default
        #[arg(long)]
        on_failure: Option<OnFailure>,

        /// Replacement value under use-default
        #[arg(long, allow_hyphen_values = true)]
        default: Option<i64>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Trim whitespace from every cell before validating
        #[arg(long)]
        strip: bool,

        /// Output CSV for accepted rows
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output JSON array of row errors
        #[arg(long)]
        errors: Option<PathBuf>,

        /// Output JSON run report (counts, run id, errors)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Strip surrounding whitespace from every cell
    Clean {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Coerce a single value to an integer
    Coerce {
        /// Raw value
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Fallback when the value is blank or not numeric
        #[arg(long, allow_hyphen_values = true)]
        default: Option<i64>,

        /// Raise results below this bound
        #[arg(long, allow_hyphen_values = true)]
        min: Option<i64>,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            input,
            config,
            require_header,
            non_empty,
            int,
            on_failure,
            default,
            delimiter,
            strip,
            output,
            errors,
            report,
        } => {
            let overrides = Overrides {
                require_header,
                non_empty,
                int,
                on_failure,
                default,
                strip,
            };
            cmd_validate(
                &input,
                config.as_deref(),
                overrides,
                delimiter,
                output.as_deref(),
                errors.as_deref(),
                report.as_deref(),
            )
        }

        Commands::Clean {
            input,
            output,
            delimiter,
        } => cmd_clean(&input, &output, delimiter),

        Commands::Coerce { value, default, min } => cmd_coerce(&value, default, min),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Command-line settings layered over the job file.
struct Overrides {
    require_header: Vec<String>,
    non_empty: Vec<String>,
    int: Vec<String>,
    on_failure: Option<OnFailure>,
    default: Option<i64>,
    strip: bool,
}

impl Overrides {
    fn apply(self, mut job: JobConfig) -> JobConfig {
        job.validation = job
            .validation
            .require_headers(self.require_header)
            .require_non_empty(self.non_empty)
            .coerce(self.int);

        if let Some(policy) = self.on_failure {
            job.validation.on_failure = policy;
        }
        if self.default.is_some() {
            job.validation.coerce_default = self.default;
        }
        job.strip_whitespace |= self.strip;
        job
    }
}

fn cmd_validate(
    input: &Path,
    config: Option<&Path>,
    overrides: Overrides,
    delimiter: Option<char>,
    output: Option<&Path>,
    errors_path: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Validating: {}", input.display());

    let job = match config {
        Some(path) => JobConfig::from_file(path)?,
        None => JobConfig::default(),
    };
    let job = overrides.apply(job);

    let dataset = read_csv_file(input, delimiter)?;
    eprintln!("   Encoding: {}", dataset.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(dataset.delimiter));
    eprintln!("   Columns: {}", dataset.headers.join(", "));

    let records = if job.strip_whitespace {
        strip_whitespace(&dataset.records)
    } else {
        dataset.records.clone()
    };

    let result = run_with_headers(&dataset.headers, &records, &job.validation)?;
    let accepted = derive_columns(&result.accepted, &job.derive)?;

    eprintln!("\n📊 {}", result.summary());
    let lines = render_error_lines(&result.errors);
    for line in lines.iter().take(SHOWN_ERRORS) {
        eprintln!("   - {}", line);
    }
    if lines.len() > SHOWN_ERRORS {
        eprintln!("   ... and {} more", lines.len() - SHOWN_ERRORS);
    }

    if let Some(path) = output {
        let mut headers = dataset.headers.clone();
        for column in &job.derive {
            if !headers.contains(&column.target) {
                headers.push(column.target.clone());
            }
        }
        write_csv(path, &headers, &accepted)?;
        eprintln!("💾 Accepted rows written to: {}", path.display());
    }

    if let Some(path) = errors_path {
        write_error_report(path, &result.errors)?;
        eprintln!("💾 Errors written to: {}", path.display());
    }

    if let Some(path) = report_path {
        let report = ValidationReport::from_result(&result, Some(input));
        write_report(path, &report)?;
        eprintln!("💾 Report written to: {} (run {})", path.display(), report.run_id);
    }

    Ok(())
}

fn cmd_clean(
    input: &Path,
    output: &Path,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🧹 Cleaning: {}", input.display());

    let dataset = read_csv_file(input, delimiter)?;
    let cleaned = strip_whitespace(&dataset.records);
    write_csv(output, &dataset.headers, &cleaned)?;

    eprintln!("✅ {} rows written to: {}", cleaned.len(), output.display());
    Ok(())
}

fn cmd_coerce(
    value: &str,
    default: Option<i64>,
    min: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = Value::String(value.to_string());
    let result = match min {
        Some(bound) => coerce(Some(&raw), default, Some(&clamp_min(bound)))?,
        None => coerce(Some(&raw), default, None)?,
    };

    match result {
        Some(n) => println!("{}", n),
        None => println!("none"),
    }
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let dataset = read_csv_file(input, delimiter)?;

    eprintln!("   Encoding: {}", dataset.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(dataset.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", dataset.headers.join(", "));
    eprintln!("✅ Parsed {} records", dataset.records.len());

    let json = serde_json::to_string_pretty(&dataset.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
