//! Show command
//!
//! Usage: revtree show <SEED> [--revision <REV>]

use clap::Args;
use revtree_core::diff::ObserverSet;
use revtree_core::model::RevisionNumber;
use revtree_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Revision to print (default: latest)
    #[arg(long)]
    pub revision: Option<RevisionNumber>,
}

/// Execute show command
pub async fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cmd = EngineCommand::Show {
        seed: args.seed,
        revision: args.revision,
    };

    let listing = match apply_engine_command(cmd, &ObserverSet::new()).await? {
        EngineCommandResult::Show(listing) => listing,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    println!("document: {}", listing.document);
    println!("digest:   {}", listing.seed_digest);
    println!("revision: {}", listing.revision);
    for line in &listing.lines {
        println!("{}", line);
    }

    Ok(())
}
