mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::adjustments::GeographicArgs;
use commands::benchmark::{AnalyzeArgs, EvaluateArgs};
use commands::statistics::RangeArgs;

/// Comparability adjustments and arm's length benchmarking
#[derive(Parser)]
#[command(
    name = "alb",
    version,
    about = "Comparability adjustments and arm's length range benchmarking",
    long_about = "A CLI for transfer pricing benchmarking with decimal precision. \
                  Applies working capital, risk, capacity, geographic and accounting \
                  adjustments to comparables, builds the interquartile range and tests \
                  the tested party's margin against it."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine events to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Adjust a comparable set and benchmark the tested party
    Analyze(AnalyzeArgs),
    /// Interquartile range statistics for a list of margins
    Range(RangeArgs),
    /// Test a margin against an arm's length range
    Evaluate(EvaluateArgs),
    /// Geographic adjustment between two regions
    Geographic(GeographicArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("armslength_core={default_level},alb={default_level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::benchmark::run_analyze(args),
        Commands::Range(args) => commands::statistics::run_range(args),
        Commands::Evaluate(args) => commands::benchmark::run_evaluate(args),
        Commands::Geographic(args) => commands::adjustments::run_geographic(args),
        Commands::Version => {
            println!("alb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
