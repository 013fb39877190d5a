//! CLI entry point for the preprocessing toolkit.

use anyhow::{Context, Result, anyhow};
use autoeda_processing::{
    DataSource, DatasetOverview, OutlierTransform, PreprocessingConfig, Recipe, Session,
};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible outlier transform enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierTransform {
    /// Clamp flagged values to mean ± threshold * std
    Clamp,
    /// Replace flagged values with the median of the rest
    Median,
}

impl From<CliOutlierTransform> for OutlierTransform {
    fn from(cli: CliOutlierTransform) -> Self {
        match cli {
            CliOutlierTransform::Clamp => OutlierTransform::Clamp,
            CliOutlierTransform::Median => OutlierTransform::Median,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis and preprocessing",
    long_about = "Profile a CSV dataset and apply preprocessing operations to it.\n\n\
                  EXAMPLES:\n  \
                  # Overview of the bundled Titanic sample\n  \
                  autoeda-processing profile --example\n\n  \
                  # Rows whose Fare z-score exceeds 2.5\n  \
                  autoeda-processing outliers -i data.csv -c Fare --z-threshold 2.5\n\n  \
                  # Replay a recipe and write the result\n  \
                  autoeda-processing apply -i data.csv -r recipe.json -o processed.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout can be piped: `... --json | jq .rows`
    #[arg(long, global = true)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Path to the CSV file to load
    #[arg(short, long, required_unless_present = "example", conflicts_with = "example")]
    input: Option<PathBuf>,

    /// Use the bundled Titanic sample instead of a file
    #[arg(long)]
    example: bool,

    /// CSV field separator
    #[arg(long, default_value = ",")]
    separator: char,
}

impl InputArgs {
    fn source(&self) -> Result<DataSource> {
        if self.example {
            return Ok(DataSource::Example);
        }
        let path = self
            .input
            .clone()
            .ok_or_else(|| anyhow!("Either --input or --example is required"))?;
        if !path.exists() {
            return Err(anyhow!("Input file not found: {}", path.display()));
        }
        Ok(DataSource::Path(path))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an overview of the dataset
    Profile {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the rows flagged as outliers in one column
    Outliers {
        #[command(flatten)]
        input: InputArgs,

        /// Numeric column to inspect
        #[arg(short, long)]
        column: String,

        /// Absolute z-score above which a value is flagged
        #[arg(long, default_value = "3.0")]
        z_threshold: f64,
    },

    /// Replay a JSON recipe of operations and export the result
    Apply {
        #[command(flatten)]
        input: InputArgs,

        /// JSON array of operations
        #[arg(short, long)]
        recipe: PathBuf,

        /// Where to write the processed CSV
        #[arg(short, long, default_value = "processed.csv")]
        output: PathBuf,

        /// Absolute z-score used by outlier operations
        #[arg(long, default_value = "3.0")]
        z_threshold: f64,

        /// How transform_outliers rewrites flagged values
        #[arg(long, value_enum, default_value = "clamp")]
        outlier_transform: CliOutlierTransform,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let result = match &args.command {
        Command::Profile { input } => run_profile(input, args.json),
        Command::Outliers {
            input,
            column,
            z_threshold,
        } => run_outliers(input, column, *z_threshold, args.json),
        Command::Apply {
            input,
            recipe,
            output,
            z_threshold,
            outlier_transform,
        } => {
            let config = PreprocessingConfig::builder()
                .csv_separator(input.separator)
                .outlier_z_threshold(*z_threshold)
                .outlier_transform((*outlier_transform).into())
                .build()?;
            run_apply(input, config, recipe, output, args.json)
        }
    };

    if let Err(ref e) = result {
        error!("{:#}", e);
    }
    result
}

fn open_session(input: &InputArgs, config: PreprocessingConfig) -> Result<Session> {
    let source = input.source()?;
    Ok(Session::load(&source, config)?)
}

fn input_config(input: &InputArgs) -> Result<PreprocessingConfig> {
    Ok(PreprocessingConfig::builder()
        .csv_separator(input.separator)
        .build()?)
}

fn run_profile(input: &InputArgs, json: bool) -> Result<()> {
    let session = open_session(input, input_config(input)?)?;
    let overview = session.profile()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else {
        print_overview(&overview);
    }
    Ok(())
}

#[derive(Serialize)]
struct OutlierRow {
    row: usize,
    value: Option<f64>,
}

fn run_outliers(input: &InputArgs, column: &str, z_threshold: f64, json: bool) -> Result<()> {
    let config = PreprocessingConfig::builder()
        .csv_separator(input.separator)
        .outlier_z_threshold(z_threshold)
        .build()?;
    let session = open_session(input, config)?;
    let outliers = session.detect_outliers(column)?;

    let series = session.working().column(column)?.as_materialized_series();
    let values = autoeda_processing::utils::numeric_values(series)?;
    let rows: Vec<OutlierRow> = outliers
        .rows
        .iter()
        .map(|&row| OutlierRow {
            row,
            value: values.get(row).copied().flatten(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "\n{} outliers in '{}' (|z| > {})",
        rows.len(),
        column,
        outliers.threshold
    );
    println!("{}", "-".repeat(40));
    for entry in &rows {
        match entry.value {
            Some(v) => println!("  row {:<8} {}", entry.row, v),
            None => println!("  row {:<8} -", entry.row),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ApplyReport<'a> {
    output: String,
    original_shape: (usize, usize),
    final_shape: (usize, usize),
    history: &'a [autoeda_processing::AppliedOperation],
}

fn run_apply(
    input: &InputArgs,
    config: PreprocessingConfig,
    recipe_path: &Path,
    output: &Path,
    json: bool,
) -> Result<()> {
    let recipe = Recipe::from_path(recipe_path)?;
    let mut session = open_session(input, config)?;
    info!("Replaying {} operations", recipe.len());

    session
        .apply_all(&recipe.operations)
        .with_context(|| format!("Applying recipe {}", recipe_path.display()))?;

    let bytes = session.export()?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Writing {}", output.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), output.display());

    let report = ApplyReport {
        output: output.display().to_string(),
        original_shape: session.original().shape(),
        final_shape: session.working().shape(),
        history: session.history(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\nAPPLIED OPERATIONS");
    println!("{}", "-".repeat(40));
    for (i, entry) in report.history.iter().enumerate() {
        println!(
            "  {:>2}. {:<26} {:?} -> {:?}",
            i + 1,
            entry.operation.name(),
            entry.shape_before,
            entry.shape_after
        );
    }
    println!();
    println!(
        "  {:?} -> {:?}, written to {}",
        report.original_shape, report.final_shape, report.output
    );
    Ok(())
}

/// Human-readable overview.
///
/// Uses `println!` rather than logging: this is the command's output, not
/// progress information.
fn print_overview(overview: &DatasetOverview) {
    println!("\nDATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  Rows: {}", overview.rows);
    println!(
        "  Columns: {} ({} numerical, {} categorical)",
        overview.columns, overview.numerical_columns, overview.categorical_columns
    );
    println!("  Missing cells: {}", overview.missing_cells);
    println!("  Duplicate rows: {}", overview.duplicate_rows);
    println!();

    println!(
        "{:<20} {:<12} {:<10} {:<10}",
        "Column", "Type", "Missing %", "Unique"
    );
    println!("{}", "-".repeat(56));
    for col in &overview.column_summaries {
        println!(
            "{:<20} {:<12} {:<10.1} {:<10}",
            truncate_str(&col.name, 19),
            truncate_str(&col.dtype, 11),
            col.null_percentage,
            col.unique_count
        );
    }

    if !overview.numeric_summaries.is_empty() {
        println!("\nNUMERIC SUMMARY");
        println!("{}", "-".repeat(40));
        println!(
            "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Column", "Mean", "Std", "Min", "Median", "Max"
        );
        for s in &overview.numeric_summaries {
            println!(
                "{:<20} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                truncate_str(&s.name, 19),
                s.mean,
                s.std,
                s.min,
                s.median,
                s.max
            );
        }
    }

    if !overview.category_summaries.is_empty() {
        println!("\nTOP VALUES");
        println!("{}", "-".repeat(40));
        for c in &overview.category_summaries {
            let top: Vec<String> = c
                .top_values
                .iter()
                .map(|(value, count)| format!("{} ({})", truncate_str(value, 15), count))
                .collect();
            println!(
                "  {:<20} {} distinct: {}",
                truncate_str(&c.name, 19),
                c.distinct,
                top.join(", ")
            );
        }
    }
    println!();
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
