use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use offset_screener::config::Config;
use offset_screener::flags::{FlagCatalogue, FlagCode};
use offset_screener::output;
use offset_screener::{Screener, ScreeningReport};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score and flag a batch of projects, ranked by CQI
    Screen {
        /// Project batch (.json array or .csv with a header row)
        input: PathBuf,

        /// Reference date for age-based scores and flags (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,

        /// Only print the top N projects
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Print the bottom N projects by CQI (highest risk)
        #[arg(long, value_name = "N")]
        bottom: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also write scored_projects.csv and flag_summary.csv into this directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Show the score breakdown and flags for one project
    Show {
        /// Project batch (.json or .csv)
        input: PathBuf,

        /// Project id to show (blank ids are addressed as #N by rank)
        project_id: String,

        /// Reference date (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// List the red-flag catalogue, or describe one flag
    Catalogue {
        /// Flag code, e.g. ZERO_RETIREMENTS
        code: Option<String>,
    },
    /// Write the default config to ~/.config/offset-screener/config.yaml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "offset-screener")]
#[command(about = "Carbon-offset project quality screening CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/offset-screener/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load and validate config, exiting with EXIT_CONFIG on any problem.
fn load_config_or_exit(path: Option<String>) -> Config {
    let config = match offset_screener::config::load_config(path.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = offset_screener::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    config
}

fn build_screener_or_exit(config: &Config) -> Screener {
    match Screener::from_config(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn run_screen(screener: &Screener, input: &Path, as_of: Option<NaiveDate>) -> ScreeningReport {
    let records = match offset_screener::load::load_projects(input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    // Only the CLI reads the wall clock
    let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
    screener.screen(records, as_of)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();
    let use_colors = output::should_use_colors();

    match cli.command {
        Commands::Screen {
            input,
            as_of,
            top,
            bottom,
            format,
            output: output_dir,
        } => {
            let config = load_config_or_exit(cli.config);
            let screener = build_screener_or_exit(&config);
            let report = run_screen(&screener, &input, as_of);

            // TSV and JSON print one slice: --bottom alone selects the bottom
            let (first_rank, shown) = match (top, bottom) {
                (None, Some(n)) => report.bottom(n),
                (Some(n), _) => (0, report.top(n)),
                (None, None) => (0, &report.projects[..]),
            };

            match format {
                OutputFormat::Tsv => println!("{}", output::format_tsv(shown, first_rank)),
                OutputFormat::Json => match output::projects_to_json(shown, first_rank) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
                OutputFormat::Table => {
                    println!("{}", output::format_portfolio_summary(&report.portfolio));
                    println!();
                    if top.is_none() && bottom.is_none() {
                        let table = output::format_ranked_table(&report.projects, 0, use_colors);
                        println!("{}", table);
                        println!();
                    }
                    if let Some(n) = top {
                        println!("Top {} projects by CQI:", n);
                        println!("{}", output::format_ranked_table(report.top(n), 0, use_colors));
                        println!();
                    }
                    if let Some(n) = bottom {
                        let (start, slice) = report.bottom(n);
                        println!("Bottom {} projects by CQI (highest risk):", n);
                        println!("{}", output::format_ranked_table(slice, start, use_colors));
                        println!();
                    }
                    println!("Red flags:");
                    println!(
                        "{}",
                        output::format_flag_summary(&report.flag_summary, use_colors)
                    );
                    if cli.verbose {
                        println!();
                        println!("Score dimensions:");
                        println!("{}", output::format_dimension_stats(&report.dimensions));
                    }
                }
            }

            if let Some(dir) = output_dir {
                match output::export_reports(&dir, &report.projects, &report.flag_summary) {
                    Ok(paths) => {
                        for path in paths {
                            eprintln!("Saved {}", path.display());
                        }
                    }
                    Err(e) => {
                        eprintln!("Export error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                }
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} projects as of {} in {:?}",
                    report.projects.len(),
                    report.as_of,
                    start_time.elapsed()
                );
            }
        }
        Commands::Show {
            input,
            project_id,
            as_of,
        } => {
            let config = load_config_or_exit(cli.config);
            let screener = build_screener_or_exit(&config);
            let report = run_screen(&screener, &input, as_of);

            let Some((rank, project)) = report.find(&project_id) else {
                eprintln!(
                    "Project {} not found in {} ({} projects).",
                    project_id,
                    input.display(),
                    report.projects.len()
                );
                std::process::exit(EXIT_INPUT);
            };

            println!(
                "{}",
                output::format_project_detail(
                    project,
                    rank,
                    screener.scorer().weights(),
                    screener.detector().catalogue(),
                    use_colors
                )
            );
            println!("  Rank: {} of {}", rank + 1, report.projects.len());
        }
        Commands::Catalogue { code } => {
            let catalogue = FlagCatalogue::default();
            match code {
                None => println!("{}", output::format_catalogue(&catalogue, use_colors)),
                Some(code) => {
                    let Some(def) = FlagCode::parse(&code).and_then(|c| catalogue.get(c)) else {
                        let known: Vec<&str> = FlagCode::ALL.iter().map(|c| c.as_str()).collect();
                        eprintln!("Unknown flag code {}. Known codes: {}", code, known.join(", "));
                        std::process::exit(EXIT_INPUT);
                    };
                    println!("{}", output::format_flag_definition(def, use_colors));
                }
            }
        }
        Commands::Init { force } => {
            let path = match cli.config.map(PathBuf::from) {
                Some(p) => p,
                None => match offset_screener::config::get_config_path() {
                    Ok(p) => p,
                    Err(e) => {
                        eprintln!("Config error: {:#}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
            };

            if let Err(e) = offset_screener::config::write_default_config(&path, force) {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Wrote default config to {}", path.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
