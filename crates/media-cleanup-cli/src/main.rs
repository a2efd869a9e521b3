mod commands;
mod logging;
mod progress;
mod prompt;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, CleanupArgs, Commands};
use dotenv::dotenv;
use media_cleanup_core::{
    AppConfig, AssumeYes, CleanupEngine, CleanupReport, Confirmer, Database, Mode, PhaseOutcome,
    PhaseReport, StoreSettings, UploadsResolver,
};
use progress::CliReporter;
use prompt::PromptConfirmer;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let guard = logging::init_logger();
    let code = run();
    // flush the file log before exiting
    drop(guard);
    process::exit(code);
}

fn run() -> i32 {
    let config = match media_cleanup_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return 1;
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Cleanup(cleanup)) => {
            let mode = match Mode::from_flags(cleanup.attachments_only, cleanup.files_only) {
                Ok(mode) => mode,
                Err(err) => {
                    error!("{}", err);
                    return 1;
                }
            };
            match run_cleanup(&config, &cleanup, mode) {
                Ok(code) => code,
                Err(err) => {
                    error!("Error: {:#}", err);
                    1
                }
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            0
        }
        None => {
            let _ = Cli::command().print_long_help();
            0
        }
    }
}

fn run_cleanup(config: &AppConfig, args: &CleanupArgs, mode: Mode) -> anyhow::Result<i32> {
    let database_path = args.database.as_deref().unwrap_or(&config.database_path);
    let upload_dir = PathBuf::from(args.uploads.as_deref().unwrap_or(&config.upload_dir));

    let db = Database::open(database_path, StoreSettings::from(config))
        .with_context(|| format!("opening metadata database {}", database_path))?;
    let resolver = UploadsResolver::new(&upload_dir);
    let confirmer: &dyn Confirmer = if args.yes { &AssumeYes } else { &PromptConfirmer };
    let reporter = CliReporter::new();

    if args.dry_run {
        info!("{}", "Dry run: nothing will be deleted.".yellow());
    }

    let engine = CleanupEngine::new(&db, &resolver, confirmer, &reporter, &upload_dir)
        .with_query_error_policy(config.query_error_policy);
    let report = engine.run(mode, args.dry_run)?;

    print_summary(&report);
    Ok(report.exit_code(args.strict))
}

fn print_summary(report: &CleanupReport) {
    println!();
    if let Some(phase) = &report.attachments {
        print_phase("attachments", phase);
    }
    if let Some(totals) = &report.file_totals {
        info!(
            "{} files scanned, {} valid, {} hidden",
            format!("{}", totals.total).cyan(),
            format!("{}", totals.valid).green(),
            format!("{}", totals.hidden).dimmed(),
        );
        if totals.skipped > 0 {
            warn!(
                "{} files skipped: names are not valid UTF-8",
                format!("{}", totals.skipped).yellow()
            );
        }
    }
    if let Some(phase) = &report.files {
        print_phase("files", phase);
    }
}

fn print_phase(noun: &str, phase: &PhaseReport) {
    match phase_summary(noun, phase) {
        Some(line) if phase.failed() > 0 => warn!("{}", line),
        Some(line) => info!("{}", line),
        None => {}
    }
}

/// Closing line for a phase. A completed delete only reports failures, the
/// deletion itself already logged how many records or files went.
fn phase_summary(noun: &str, phase: &PhaseReport) -> Option<String> {
    match &phase.outcome {
        PhaseOutcome::DryRun => Some(format!(
            "{} invalid {} would be deleted",
            format!("{}", phase.found).red(),
            noun
        )),
        PhaseOutcome::Declined => Some(format!(
            "{} invalid {} kept (not confirmed)",
            format!("{}", phase.found).yellow(),
            noun
        )),
        PhaseOutcome::Deleted(outcome) if !outcome.failures.is_empty() => Some(format!(
            "{} invalid {} could not be deleted",
            format!("{}", outcome.failures.len()).red(),
            noun
        )),
        PhaseOutcome::Deleted(_) => None,
    }
}
