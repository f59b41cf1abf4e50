//! revtree CLI
//!
//! Command-line interface for diffing seeded document revisions

use clap::{Parser, Subcommand, ValueEnum};
use revtree_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "revtree")]
#[command(about = "revtree - diff revisions of versioned document trees", long_about = None)]
struct Cli {
    /// Log format on stderr; RUST_LOG overrides the level
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Diff two revisions of a seed
    Diff(commands::diff::DiffArgs),
    /// Print the digest and tree of one revision of a seed
    Show(commands::show::ShowArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging_facility::init(match cli.log {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args).await,
        Commands::Show(args) => commands::show::execute(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
