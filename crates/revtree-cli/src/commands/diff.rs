//! Diff command
//!
//! Usage: revtree diff <SEED> --old <REV> --new <REV> [--start <KEY>]
//!        [--mode normal|optimized] [--variant structural|full]
//!        [--format text|json]

use clap::{Args, ValueEnum};
use revtree_core::diff::{
    render_human_summary, DiffMode, DiffVariant, ObserverSet, TracingObserver,
};
use std::sync::Arc;
use revtree_core::model::{NodeKey, RevisionNumber, DOCUMENT_ROOT_KEY};
use revtree_engine::commands::diff::DiffOptions;
use revtree_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Older revision
    #[arg(long)]
    pub old: RevisionNumber,

    /// Newer revision; must be greater than --old
    #[arg(long)]
    pub new: RevisionNumber,

    /// Key of the node whose subtree is compared
    #[arg(long, default_value_t = DOCUMENT_ROOT_KEY)]
    pub start: NodeKey,

    /// normal or optimized
    #[arg(long, default_value = "normal")]
    pub mode: DiffMode,

    /// structural or full
    #[arg(long, default_value = DiffVariant::STRUCTURAL, value_parser = parse_variant)]
    pub variant: DiffVariant,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Indented summary with counts
    Text,
    /// One JSON event per line
    Json,
}

fn parse_variant(name: &str) -> Result<DiffVariant, String> {
    DiffVariant::from_name(name).ok_or_else(|| {
        format!(
            "unknown variant '{}', expected '{}' or '{}'",
            name,
            DiffVariant::STRUCTURAL,
            DiffVariant::FULL
        )
    })
}

/// Execute diff command
pub async fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = DiffOptions {
        old_revision: args.old,
        new_revision: args.new,
        start_key: args.start,
        mode: args.mode,
        variant: args.variant,
    };
    let mut observers = ObserverSet::new();
    observers.add(Arc::new(TracingObserver::new(args.seed.display().to_string())));
    let cmd = EngineCommand::Diff {
        seed: args.seed,
        options,
    };

    let report = match apply_engine_command(cmd, &observers).await? {
        EngineCommandResult::Diff(report) => report,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    match args.format {
        OutputFormat::Text => {
            println!(
                "{} r{} -> r{} ({}, {})",
                report.document,
                report.old_revision,
                report.new_revision,
                report.variant,
                if report.outcome.optimized {
                    DiffMode::Optimized
                } else {
                    DiffMode::Normal
                }
            );
            print!("{}", render_human_summary(&report.events));
        }
        OutputFormat::Json => {
            for event in &report.events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }

    Ok(())
}
