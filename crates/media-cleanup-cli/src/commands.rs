use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "media-cleanup")]
#[command(about = "Reconcile media attachments with the files in the uploads folder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete files with no attachments and attachments with no file
    Cleanup(CleanupArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Only report how many entries would be deleted
    #[arg(long)]
    pub dry_run: bool,

    /// Clean files with no existing attachment
    #[arg(long)]
    pub files_only: bool,

    /// Clean attachments with no existing file
    #[arg(long)]
    pub attachments_only: bool,

    /// Answer yes to confirmation messages
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Exit with status 2 if any single deletion failed
    #[arg(long)]
    pub strict: bool,

    /// SQLite metadata database (overrides `database_path`)
    #[arg(long)]
    pub database: Option<String>,

    /// Upload root directory (overrides `upload_dir`)
    #[arg(long)]
    pub uploads: Option<String>,
}
