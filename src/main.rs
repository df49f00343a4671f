use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use scout_terminal::config::AppConfig;
use scout_terminal::dashboard;
use scout_terminal::export::export_population;
use scout_terminal::logging::init_logging;
use scout_terminal::population::load_population_or_empty;
use scout_terminal::provider::{PlayerSource, http_provider};
use scout_terminal::query::{QueryContext, run_query};

#[derive(Parser)]
#[command(name = "scout_terminal")]
#[command(about = "Player scouting profiles from season statistics", long_about = None)]
struct Cli {
    /// Player statistics CSV (overrides PLAYERS_CSV)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal dashboard
    Dashboard,
    /// Write profiles for every player to an xlsx workbook
    Export {
        #[arg(long, default_value = "scout_report.xlsx")]
        out: PathBuf,
    },
    /// Query action: locate-player, build-complete-profile,
    /// build-activity-heatmap or remote-report, then <name> [team]
    #[command(external_subcommand)]
    Query(Vec<String>),
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(csv) = cli.csv {
        config.players_csv = csv;
    }

    if !matches!(cli.command, Commands::Dashboard)
        && let Err(err) = init_logging(cli.verbose, cli.quiet)
    {
        eprintln!("warning: {err:#}");
    }

    let result = match cli.command {
        Commands::Dashboard => run_dashboard(&config),
        Commands::Export { out } => run_export(&config, &out),
        Commands::Query(args) => Ok(run_query_command(&config, &args)),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_dashboard(config: &AppConfig) -> Result<bool> {
    let population = load_population_or_empty(&config.players_csv);
    dashboard::run(population)?;
    Ok(true)
}

fn run_export(config: &AppConfig, out: &Path) -> Result<bool> {
    let population = load_population_or_empty(&config.players_csv);
    let report = export_population(&population, out)?;
    println!(
        "exported {} players ({} percentile rows, {} without playing time) to {}",
        report.players,
        report.percentile_rows,
        report.insufficient_playing_time,
        out.display()
    );
    Ok(true)
}

fn run_query_command(config: &AppConfig, args: &[String]) -> bool {
    let population = load_population_or_empty(&config.players_csv);
    let provider = http_provider(&config.provider);
    let ctx = QueryContext {
        population: &population,
        provider: provider.as_ref().map(|p| p as &dyn PlayerSource),
    };

    let (action, rest) = match args.split_first() {
        Some((action, rest)) => (action.as_str(), rest),
        None => ("", args),
    };
    let outcome = run_query(ctx, action, rest);
    match serde_json::to_string_pretty(&outcome.body) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("error: failed to encode result: {err}");
            return false;
        }
    }
    outcome.success
}
