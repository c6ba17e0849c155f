use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error};

use town_insight::insight::{
    aggregate_insight, list_towns, score_to_grade, validate_insight_config,
};
use town_insight::{FileProvider, InsightError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_UPSTREAM: i32 = 2;
const EXIT_NO_INSIGHT: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_OUTPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the fused report for one town
    Report {
        /// Town slug, e.g. "berkeley-heights"
        slug: String,

        /// Reporting date (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List towns with their grade and confidence (default if no subcommand)
    List {
        /// Reporting date (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Convert a 0-100 transparency score to its letter grade
    Grade { score: f64 },
}

#[derive(Parser, Debug)]
#[command(name = "town-insight")]
#[command(about = "Municipal transparency and fiscal-waste report CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/town-insight/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("town_insight={}", default_level).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::List { as_of: None });
    let start_time = Instant::now();

    // Grade conversion needs no config or data
    if let Commands::Grade { score } = command {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            eprintln!("Invalid score {}. Must be between 0 and 100.", score);
            std::process::exit(EXIT_CONFIG);
        }
        println!("{}", score_to_grade(score));
        std::process::exit(EXIT_SUCCESS);
    }

    let config_path = cli.config.map(PathBuf::from);
    let config = match town_insight::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate insight config at startup
    let insight_config = config.effective_insight();
    if let Err(errors) = validate_insight_config(&insight_config) {
        eprintln!("Insight config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_dir = match config.data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    debug!(data_dir = %data_dir.display(), "using file provider");
    let provider = FileProvider::new(data_dir);
    let today = Utc::now().date_naive();
    let use_colors = town_insight::output::should_use_colors();

    match command {
        Commands::Report {
            slug,
            as_of,
            json,
            output,
        } => {
            let as_of = as_of.unwrap_or(today);
            let view = match aggregate_insight(&provider, &slug, as_of, &insight_config).await {
                Ok(view) => view,
                Err(e) => {
                    let code = match &e {
                        InsightError::NotFound(_) => EXIT_NOT_FOUND,
                        InsightError::NoInsightYet(_) => EXIT_NO_INSIGHT,
                        InsightError::Upstream(failures) => {
                            for failure in failures {
                                error!(kind = %failure.kind, "{:#}", failure.error);
                            }
                            EXIT_UPSTREAM
                        }
                    };
                    eprintln!("{}", e);
                    std::process::exit(code);
                }
            };

            if let Some(path) = output {
                if let Err(e) = town_insight::output::write_json_atomic(&path, &view) {
                    eprintln!("Failed to write report: {:#}", e);
                    std::process::exit(EXIT_OUTPUT);
                }
                eprintln!("Wrote report for {} to {}", view.name, path.display());
            } else if json {
                match serde_json::to_string_pretty(&view) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Failed to serialize report: {}", e);
                        std::process::exit(EXIT_OUTPUT);
                    }
                }
            } else {
                println!("{}", town_insight::output::format_report(&view, use_colors));
            }
        }
        Commands::List { as_of } => {
            let as_of = as_of.unwrap_or(today);
            let listings = match list_towns(&provider, as_of, &insight_config).await {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_UPSTREAM);
                }
            };
            println!(
                "{}",
                town_insight::output::format_town_list(&listings, use_colors)
            );
        }
        Commands::Grade { .. } => unreachable!("handled before config load"),
    }

    debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}
