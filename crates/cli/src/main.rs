mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "daylinks",
    version,
    about = "Export recent daily notes and the notes they link to"
)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/daylinks/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile to use from the config file
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log more on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors on stderr
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export the last N days of daily notes and everything they link to
    Export(ExportArgs),

    /// Package every note under a directory into one XML document
    Package(PackageArgs),

    /// Validate configuration and print resolved settings
    Doctor,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Vault root directory
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Number of days, counting back from today, to look for daily notes
    #[arg(long)]
    pub days: Option<u32>,

    /// Base directory for export-<timestamp> directories
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Maximum number of link hops followed from each daily note
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Freeze the clock (YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or RFC 3339)
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Never use the external `tree` listing to index the vault
    #[arg(long)]
    pub no_tree: bool,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PackageArgs {
    /// Directory whose notes are packaged
    pub dir: PathBuf,

    /// File name of the document written inside DIR
    #[arg(long, default_value = daylinks_core::package::AGGREGATE_FILE_NAME)]
    pub output: String,
}

fn main() {
    let cli = Cli::parse();
    let verbosity = logging::Verbosity { verbose: cli.verbose, quiet: cli.quiet };

    match cli.command {
        Commands::Export(args) => {
            cmd::export::run(cli.config.as_deref(), cli.profile.as_deref(), args, verbosity)
        }
        Commands::Package(args) => cmd::package::run(args, verbosity),
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref(), cli.profile.as_deref()),
    }
}
