use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use visedit_common::visitor::{ElementCollector, Visitor};
use visedit_parser::parse_with_path;

use super::report_parse_error;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Markup file to check
    pub file: PathBuf,
}

pub fn check(args: CheckArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let doc = parse_with_path(&source, &args.file.to_string_lossy())
        .map_err(|err| report_parse_error(&args.file, &source, &err))?;

    let mut collector = ElementCollector { names: Vec::new() };
    collector.visit_document(&doc);

    println!(
        "{} {} ({} elements)",
        "✓".green(),
        args.file.display(),
        collector.names.len()
    );
    Ok(())
}
